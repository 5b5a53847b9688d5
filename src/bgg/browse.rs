use std::{path::PathBuf, sync::LazyLock};

use regex::Regex;

use crate::{
    bgg::{BggClient, BggError},
    config::Config,
    management::StoreError,
    types::Classification,
    utils,
};

static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("invalid cell regex"));
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
        .expect("invalid anchor regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("invalid tag regex"));

/// The classification lists published on the browse pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationKind {
    Category,
    Mechanism,
}

impl ClassificationKind {
    fn page(&self) -> &'static str {
        match self {
            ClassificationKind::Category => "boardgamecategory",
            ClassificationKind::Mechanism => "boardgamemechanic",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            ClassificationKind::Category => "boardgame_categories.json",
            ClassificationKind::Mechanism => "boardgame_mechanisms.json",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClassificationKind::Category => "categories",
            ClassificationKind::Mechanism => "mechanisms",
        }
    }
}

/// Collects `(id, label)` pairs from every table cell holding a link.
///
/// The id is the third segment of the link target, e.g. `1021` for
/// `/boardgamecategory/1021/economic`. Cells without a link are skipped.
pub fn parse_browse_page(html: &str) -> Vec<Classification> {
    CELL_RE
        .captures_iter(html)
        .filter_map(|cell| {
            let anchor = ANCHOR_RE.captures(cell.get(1)?.as_str())?;
            let id = anchor.get(1)?.as_str().split('/').nth(2)?.to_string();
            let label = TAG_RE.replace_all(anchor.get(2)?.as_str(), "");
            Some(Classification {
                id,
                label: utils::normalize_ws(&utils::unescape_html(&label)),
            })
        })
        .collect()
}

impl BggClient {
    /// Retrieves every category or mechanism used for classification.
    pub async fn classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<Vec<Classification>, BggError> {
        let html = self.get_browse_page(kind.page()).await?;
        Ok(parse_browse_page(&html))
    }
}

/// Writes the list to the extra data directory and returns its path.
pub async fn save_classifications(
    config: &Config,
    kind: ClassificationKind,
    rows: &[Classification],
) -> Result<PathBuf, BggError> {
    let dir = config.extra_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(StoreError::IoError)?;

    let path = dir.join(kind.file_name());
    let json = serde_json::to_string_pretty(rows).map_err(StoreError::SerdeError)?;
    async_fs::write(&path, json)
        .await
        .map_err(StoreError::IoError)?;
    Ok(path)
}
