use chrono::TimeDelta;
use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use bggcache::{
    bgg::browse::ClassificationKind, cli, config, error, filter::CollectionFilter, types::Subtype,
    utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show a user's collection
    Collection(CollectionOptions),

    /// List a user's geekbuddies
    Buddies(BuddiesOptions),

    /// Fetch games by id (e.g. 13,822 or 1-20)
    Game(GameOptions),

    /// Maintain the master game table
    Games(GamesOptions),

    /// List the board game categories
    Categories(BrowseOptions),

    /// List the board game mechanisms
    Mechanisms(BrowseOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CollectionOptions {
    /// BGG username
    pub username: String,

    /// Reuse a cached collection younger than this many days (0 forces a fetch)
    #[clap(long)]
    pub cutoff_days: Option<i64>,

    /// Force a refresh of the cached collection
    #[clap(long)]
    pub refresh: bool,

    /// Only base games or only expansions (boardgame, boardgameexpansion)
    #[clap(long)]
    pub subtype: Option<Subtype>,

    #[clap(long)]
    pub own: Option<bool>,
    #[clap(long)]
    pub prevowned: Option<bool>,
    #[clap(long)]
    pub fortrade: Option<bool>,
    #[clap(long)]
    pub want: Option<bool>,
    #[clap(long)]
    pub wanttoplay: Option<bool>,
    #[clap(long)]
    pub wanttobuy: Option<bool>,
    #[clap(long)]
    pub wishlist: Option<bool>,
    #[clap(long)]
    pub preordered: Option<bool>,
    #[clap(long)]
    pub has_rating: Option<bool>,
    #[clap(long)]
    pub has_comment: Option<bool>,
    #[clap(long)]
    pub wishlist_priority: Option<i32>,

    /// Published in exactly this year
    #[clap(long)]
    pub year: Option<i32>,
    #[clap(long)]
    pub published_before: Option<i32>,
    #[clap(long)]
    pub published_after: Option<i32>,

    #[clap(long)]
    pub min_plays: Option<i32>,
    #[clap(long)]
    pub max_plays: Option<i32>,
}

impl CollectionOptions {
    fn filter(&self) -> CollectionFilter {
        CollectionFilter {
            subtype: self.subtype,
            own: self.own,
            prevowned: self.prevowned,
            fortrade: self.fortrade,
            want: self.want,
            wanttoplay: self.wanttoplay,
            wanttobuy: self.wanttobuy,
            wishlist: self.wishlist,
            preordered: self.preordered,
            has_rating: self.has_rating,
            has_comment: self.has_comment,
            wishlistpriority: self.wishlist_priority,
            yearpublished: self.year,
            published_before: self.published_before,
            published_after: self.published_after,
            min_numplays: self.min_plays,
            max_numplays: self.max_plays,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct BuddiesOptions {
    /// BGG username
    pub username: String,

    /// Reuse a cached list younger than this many days (0 forces a fetch)
    #[clap(long)]
    pub cutoff_days: Option<i64>,
}

#[derive(Parser, Debug, Clone)]
pub struct GameOptions {
    /// Comma-separated ids or ranges
    pub ids: String,
}

#[derive(Parser, Debug, Clone)]
pub struct GamesOptions {
    #[command(subcommand)]
    pub command: GamesSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GamesSubcommand {
    /// Add games with ids below the guard that are not in the table yet
    Discover,

    /// Re-fetch the next window of games already in the table
    Refresh,
}

#[derive(Parser, Debug, Clone)]
pub struct BrowseOptions {
    /// Save the list to the extra data directory
    #[clap(long)]
    save: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn cutoff(days: Option<i64>, default: TimeDelta) -> Option<TimeDelta> {
    match days.map(utils::cutoff_days) {
        None => Some(default),
        Some(Ok(cutoff)) => Some(cutoff),
        Some(Err(e)) => error!("Invalid --cutoff-days. Err: {}", e),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let config = match config::Config::from_env().await {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let cli = Cli::parse();

    match cli.command {
        Command::Collection(opt) => {
            let filter = opt.filter();
            cli::collection(
                &config,
                opt.username,
                cutoff(opt.cutoff_days, config.cutoff),
                opt.refresh,
                filter,
            )
            .await
        }
        Command::Buddies(opt) => {
            cli::buddies(&config, opt.username, cutoff(opt.cutoff_days, config.cutoff)).await
        }
        Command::Game(opt) => match utils::parse_id_list(&opt.ids) {
            Ok(ids) => cli::show_games(&config, ids).await,
            Err(e) => error!("{}", e),
        },
        Command::Games(opt) => match opt.command {
            GamesSubcommand::Discover => cli::discover_games(&config).await,
            GamesSubcommand::Refresh => cli::refresh_games(&config).await,
        },
        Command::Categories(opt) => {
            cli::classifications(&config, ClassificationKind::Category, opt.save).await
        }
        Command::Mechanisms(opt) => {
            cli::classifications(&config, ClassificationKind::Mechanism, opt.save).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
