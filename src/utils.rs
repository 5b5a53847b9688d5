use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime, TimeDelta};
use regex::Regex;

/// Timestamp embedded in snapshot file names.
pub const SNAPSHOT_STAMP_FORMAT: &str = "%Y%m%d-%H%M";
pub const SNAPSHOT_EXT: &str = "json";
const MASTER_PREFIX: &str = "all-to-";

static DESCRIPTION_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#10;|&mdash;|&ndash;").expect("invalid description regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

/// Removes newline and tab characters from a raw response.
pub fn strip_layout(raw: &str) -> String {
    raw.replace(['\n', '\t'], "")
}

/// Cleans a game description: line-break and dash entities become spaces,
/// whitespace runs collapse to one space, `&quot;` becomes `"`.
pub fn clean_description(raw: &str) -> String {
    let text = DESCRIPTION_BREAK_RE.replace_all(raw, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.replace("&quot;", "\"")
}

pub fn normalize_ws(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

pub fn unescape_html(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses `"13,822"` or `"1-5,42"` into a list of ids.
pub fn parse_id_list(raw: &str) -> Result<Vec<u32>, String> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((from, to)) => {
                let from: u32 = from
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid id range: {}", part))?;
                let to: u32 = to
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid id range: {}", part))?;
                if from > to {
                    return Err(format!("Invalid id range: {}", part));
                }
                ids.extend(from..=to);
            }
            None => ids.push(part.parse().map_err(|_| format!("Invalid id: {}", part))?),
        }
    }

    if ids.is_empty() {
        return Err("No ids given".to_string());
    }
    Ok(ids)
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `{key}-{YYYYMMDD-HHMM}.json`
pub fn snapshot_file_name(key: &str, taken_at: NaiveDateTime) -> String {
    format!(
        "{key}-{stamp}.{ext}",
        key = key,
        stamp = taken_at.format(SNAPSHOT_STAMP_FORMAT),
        ext = SNAPSHOT_EXT
    )
}

/// Timestamp of a snapshot file belonging to `key`, `None` for any other file.
///
/// `alice-bob-20240101-1200.json` belongs to `alice-bob`, not to `alice`.
pub fn parse_snapshot_file_name(file_name: &str, key: &str) -> Option<NaiveDateTime> {
    let stamp = file_name
        .strip_prefix(key)?
        .strip_prefix('-')?
        .strip_suffix(SNAPSHOT_EXT)?
        .strip_suffix('.')?;
    NaiveDateTime::parse_from_str(stamp, SNAPSHOT_STAMP_FORMAT).ok()
}

/// `all-to-{max_id}.json`
pub fn master_file_name(max_id: u32) -> String {
    format!("{}{}.{}", MASTER_PREFIX, max_id, SNAPSHOT_EXT)
}

pub fn parse_master_file_name(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(MASTER_PREFIX)?
        .strip_suffix(SNAPSHOT_EXT)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

/// A cutoff of `days` days; `Err` when it does not fit into a duration.
pub fn cutoff_days(days: i64) -> Result<TimeDelta, String> {
    TimeDelta::try_days(days).ok_or_else(|| format!("Cutoff of {} days is out of range", days))
}

pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds();
    format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
