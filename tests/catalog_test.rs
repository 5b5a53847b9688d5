use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    time::{Duration, Instant},
};

use bggcache::{
    bgg::BggError,
    catalog::{
        BatchProgress, BatchSettings, GameSource, advance_cursor, discover, fetch_in_batches,
        refresh, refresh_window, unknown_ids,
    },
    types::{GameRecord, GameTable},
};

/// In-memory stand-in for the API.
struct FakeSource {
    games: BTreeMap<u32, GameRecord>,
    /// Batches containing one of these ids fail as a whole.
    failing: HashSet<u32>,
    calls: RefCell<Vec<Vec<u32>>>,
}

impl FakeSource {
    fn new(games: Vec<GameRecord>) -> Self {
        Self {
            games: games.into_iter().map(|g| (g.id, g)).collect(),
            failing: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing_on(mut self, id: u32) -> Self {
        self.failing.insert(id);
        self
    }
}

impl GameSource for FakeSource {
    async fn fetch_games(&self, ids: &[u32]) -> Result<Vec<GameRecord>, BggError> {
        self.calls.borrow_mut().push(ids.to_vec());
        if ids.iter().any(|id| self.failing.contains(id)) {
            return Err(BggError::Upstream("Rate limit exceeded.".to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.games.get(id).cloned())
            .collect())
    }
}

// Helper function to create a game record
fn game(id: u32, name: &str) -> GameRecord {
    GameRecord {
        id,
        name: Some(name.to_string()),
        subtype: "boardgame".to_string(),
        description: None,
        yearpublished: None,
        minplayers: None,
        maxplayers: None,
        playingtime: None,
        minplaytime: None,
        maxplaytime: None,
        averating: None,
        bayesaverage: None,
        bggrank: None,
        averageweight: None,
        numratings: None,
        categories: Vec::new(),
        mechanics: Vec::new(),
        family: Vec::new(),
        designer: Vec::new(),
        artist: Vec::new(),
        publisher: Vec::new(),
        expansions: Vec::new(),
    }
}

fn table(ids: &[u32], name: &str) -> GameTable {
    ids.iter().map(|&id| (id, game(id, name))).collect()
}

fn settings(batch_size: usize, window: usize) -> BatchSettings {
    BatchSettings {
        batch_size,
        delay: Duration::ZERO,
        window,
        headroom: 10,
    }
}

#[test]
fn test_unknown_ids() {
    let known = table(&[1, 3], "old");
    assert_eq!(unknown_ids(&known, 6), vec![2, 4, 5]);
    assert!(unknown_ids(&known, 1).is_empty());
}

#[tokio::test]
async fn test_discover_skips_missing_ids() {
    // id 2 does not exist upstream
    let source = FakeSource::new(vec![game(1, "One"), game(3, "Three")]);
    let mut games = GameTable::new();

    let report = discover(&mut games, 4, &source, &settings(100, 10), |_| {}).await;

    assert_eq!(games.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(report.requested, 3);
    assert_eq!(report.found, 2);
    assert_eq!(report.unconfirmed, vec![2]);
    assert_eq!(report.new_guard, Some(13));
    assert_eq!(*source.calls.borrow(), vec![vec![1, 2, 3]]);
}

#[tokio::test]
async fn test_discover_only_requests_unknown_ids() {
    let source = FakeSource::new(vec![
        game(1, "new"),
        game(3, "Three"),
        game(5, "Five"),
    ]);
    let mut games = table(&[1], "old");
    let mut progress: Vec<BatchProgress> = Vec::new();

    let report = discover(&mut games, 6, &source, &settings(2, 10), |p| progress.push(p)).await;

    // known records are never requested or replaced
    assert_eq!(games[&1].name.as_deref(), Some("old"));
    assert_eq!(games.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    assert_eq!(*source.calls.borrow(), vec![vec![2, 3], vec![4, 5]]);
    assert_eq!(report.unconfirmed, vec![2, 4]);
    assert_eq!(report.new_guard, Some(15));
    assert_eq!(
        progress,
        vec![
            BatchProgress {
                batch: 1,
                batches: 2,
                records: 1
            },
            BatchProgress {
                batch: 2,
                batches: 2,
                records: 2
            },
        ]
    );
}

#[tokio::test]
async fn test_discover_twice_changes_nothing() {
    let source = FakeSource::new(vec![game(1, "One"), game(3, "Three")]);
    let mut games = GameTable::new();

    let first = discover(&mut games, 4, &source, &settings(100, 10), |_| {}).await;
    let guard = first.new_guard.unwrap();
    let after_first = games.clone();

    let second = discover(&mut games, guard, &source, &settings(100, 10), |_| {}).await;

    assert_eq!(games, after_first);
    assert_eq!(second.found, 0);
    assert_eq!(second.new_guard, None);
}

#[tokio::test]
async fn test_discover_tolerates_failed_batch() {
    let source = FakeSource::new(vec![game(1, "One"), game(3, "Three"), game(4, "Four")])
        .failing_on(2);
    let mut games = GameTable::new();

    let report = discover(&mut games, 5, &source, &settings(2, 10), |_| {}).await;

    // the batch [1, 2] failed, [3, 4] still made it
    assert_eq!(games.keys().copied().collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(report.unconfirmed, vec![1, 2]);
    assert_eq!(report.new_guard, Some(14));
}

#[tokio::test]
async fn test_fetch_in_batches_pauses_after_each_batch() {
    let source = FakeSource::new((1..=5).map(|id| game(id, "One")).collect());
    let paced = BatchSettings {
        delay: Duration::from_millis(30),
        ..settings(2, 10)
    };

    let started = Instant::now();
    let records = fetch_in_batches(&source, &[1, 2, 3, 4, 5], &paced, |_| {}).await;

    assert_eq!(records.len(), 5);
    assert_eq!(*source.calls.borrow(), vec![vec![1, 2], vec![3, 4], vec![5]]);
    // three batches, three pauses
    assert!(started.elapsed() >= Duration::from_millis(90));
}

#[test]
fn test_refresh_window() {
    let games = table(&[2, 4, 6, 8, 10], "old");
    assert_eq!(refresh_window(&games, 0, 3), vec![2, 4, 6]);
    assert_eq!(refresh_window(&games, 3, 3), vec![8, 10]);
    assert!(refresh_window(&games, 5, 3).is_empty());
}

#[test]
fn test_advance_cursor() {
    assert_eq!(advance_cursor(0, 3, 5), 3);
    assert_eq!(advance_cursor(3, 3, 5), 0);
    // reaching the end exactly starts the next pass from the beginning
    assert_eq!(advance_cursor(0, 5, 5), 0);
    assert_eq!(advance_cursor(2, 3, 5), 0);
    assert_eq!(advance_cursor(5, 5, 5), 0);
}

#[tokio::test]
async fn test_refresh_window_covering_whole_table() {
    let mut games = table(&[1, 2, 3, 4, 5], "old");
    let source = FakeSource::new((1..=5).map(|id| game(id, "new")).collect());

    let first = refresh(&mut games, 0, &source, &settings(100, 5), |_| {}).await;
    assert_eq!(first.updated, 5);
    assert_eq!(first.next_cursor, 0);

    // the second run covers the same ids again instead of an empty window
    let second = refresh(&mut games, first.next_cursor, &source, &settings(100, 5), |_| {}).await;
    assert_eq!(second.requested, 5);
    assert_eq!(second.updated, 5);
    assert_eq!(second.next_cursor, 0);
}

#[tokio::test]
async fn test_refresh_cursor_past_end_starts_over() {
    let mut games = table(&[1, 2, 3], "old");
    let source = FakeSource::new(vec![game(1, "new")]);

    let report = refresh(&mut games, 7, &source, &settings(100, 5), |_| {}).await;

    assert_eq!(report.requested, 0);
    assert_eq!(report.updated, 0);
    assert_eq!(report.next_cursor, 0);
    assert!(source.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_refresh_preserves_missing_records() {
    let mut games = table(&[1, 2, 3, 4, 5], "old");
    let untouched = games[&2].clone();
    // id 2 no longer comes back
    let source = FakeSource::new(vec![game(1, "new"), game(3, "new"), game(4, "new")]);

    let report = refresh(&mut games, 0, &source, &settings(2, 3), |_| {}).await;

    assert_eq!(games.len(), 5);
    assert_eq!(games[&1].name.as_deref(), Some("new"));
    assert_eq!(games[&2], untouched);
    assert_eq!(games[&3].name.as_deref(), Some("new"));
    // outside the window
    assert_eq!(games[&4].name.as_deref(), Some("old"));
    assert_eq!(report.requested, 3);
    assert_eq!(report.updated, 2);
    assert_eq!(report.preserved, vec![2]);
    assert_eq!(report.next_cursor, 3);
    assert_eq!(*source.calls.borrow(), vec![vec![1, 2], vec![3]]);
}

#[tokio::test]
async fn test_refresh_wraps_cursor() {
    let mut games = table(&[1, 2, 3, 4, 5], "old");
    let source = FakeSource::new(vec![game(4, "new"), game(5, "new")]);

    let report = refresh(&mut games, 3, &source, &settings(100, 3), |_| {}).await;

    assert_eq!(report.updated, 2);
    assert_eq!(report.next_cursor, 0);
    assert_eq!(games.len(), 5);
}

#[tokio::test]
async fn test_refresh_without_results_keeps_cursor() {
    let mut games = table(&[1, 2, 3, 4, 5], "old");
    let before = games.clone();
    let source = FakeSource::new(Vec::new());

    let report = refresh(&mut games, 3, &source, &settings(100, 3), |_| {}).await;

    assert_eq!(games, before);
    assert_eq!(report.updated, 0);
    assert_eq!(report.preserved, vec![4, 5]);
    assert_eq!(report.next_cursor, 3);
}

#[tokio::test]
async fn test_refresh_never_adds_records() {
    let mut games = table(&[1, 2], "old");
    // a source answering with an id outside the table
    let mut upstream = FakeSource::new(vec![game(1, "new")]);
    upstream.games.insert(2, game(99, "stray"));

    let report = refresh(&mut games, 0, &upstream, &settings(100, 10), |_| {}).await;

    assert_eq!(games.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(games[&2].name.as_deref(), Some("old"));
    assert_eq!(report.updated, 1);
}
