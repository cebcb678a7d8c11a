use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::hackernews::{self, Feed, HN_SITE_URL};

/// A single ranked story as shown on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub headline: String,
    pub score: u64,
    #[serde(alias = "link")]
    pub target: String,
}

pub trait ItemProvider: Send + Sync {
    fn fetch(&self) -> Result<Vec<DisplayItem>>;
}

pub struct HackerNewsProvider {
    client: Arc<hackernews::Client>,
    feed: Feed,
    limit: usize,
}

impl HackerNewsProvider {
    pub fn new(client: Arc<hackernews::Client>, feed: Feed, limit: usize) -> Self {
        Self {
            client,
            feed,
            limit,
        }
    }
}

impl ItemProvider for HackerNewsProvider {
    fn fetch(&self) -> Result<Vec<DisplayItem>> {
        self.client
            .stories(self.feed, self.limit)
            .with_context(|| format!("fetch {} stories", self.feed.display_name()))
    }
}

/// Reads items from a JSON array on disk instead of the network.
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ItemProvider for FileProvider {
    fn fetch(&self) -> Result<Vec<DisplayItem>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("read items from {}", self.path.display()))?;
        let raw: Vec<DisplayItem> = serde_json::from_str(&data)
            .with_context(|| format!("parse items from {}", self.path.display()))?;
        Ok(raw
            .into_iter()
            .filter_map(|item| {
                let target = resolve_target(&item.target)?;
                Some(DisplayItem { target, ..item })
            })
            .collect())
    }
}

#[derive(Default)]
pub struct StaticProvider {
    items: Vec<DisplayItem>,
}

impl StaticProvider {
    pub fn new(items: Vec<DisplayItem>) -> Self {
        Self { items }
    }
}

impl ItemProvider for StaticProvider {
    fn fetch(&self) -> Result<Vec<DisplayItem>> {
        Ok(self.items.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub min_score: u64,
    pub limit: usize,
}

/// Fetches from `provider` and shapes the result for display: low scores are
/// dropped, the rest ordered best first and cut to `selection.limit`.
pub fn load_items(provider: &dyn ItemProvider, selection: Selection) -> Result<Vec<DisplayItem>> {
    let fetched = provider.fetch()?;
    let fetched_count = fetched.len();
    let items = select(fetched, selection);
    debug!(fetched = fetched_count, kept = items.len(), "items selected");
    Ok(items)
}

pub fn select(mut items: Vec<DisplayItem>, selection: Selection) -> Vec<DisplayItem> {
    items.retain(|item| item.score >= selection.min_score);
    // stable, so equal scores keep the provider's ranking
    items.sort_by(|a, b| b.score.cmp(&a.score));
    items.truncate(selection.limit);
    items
}

/// Turns a story link into an absolute http(s) URL. Links relative to the
/// site (`item?id=1`) are resolved against the Hacker News front page.
pub fn resolve_target(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(HN_SITE_URL).ok()?;
    let resolved = base.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.into())
}

/// Plain listing used by `--print`. The best story is written last so it
/// ends up right above the prompt.
pub fn write_plain<W: Write>(out: &mut W, items: &[DisplayItem]) -> io::Result<()> {
    for (rank, item) in items.iter().enumerate().rev() {
        write!(
            out,
            "\n\n{}. {}\nScore: {}\nLink: {}",
            rank + 1,
            item.headline,
            item.score,
            item.target
        )?;
    }
    if !items.is_empty() {
        writeln!(out)?;
    }
    out.flush()
}

pub fn print_items(items: &[DisplayItem]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_plain(&mut handle, items).context("write stories to stdout")
}
