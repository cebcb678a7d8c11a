use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::DisplayItem;

pub const HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
pub const HN_SITE_URL: &str = "https://news.ycombinator.com/";
pub const HN_ITEM_URL: &str = "https://news.ycombinator.com/item";

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    #[default]
    Best,
    Top,
    New,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Best => "beststories",
            Feed::Top => "topstories",
            Feed::New => "newstories",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Feed::Best => "best",
            Feed::Top => "top",
            Feed::New => "new",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "best" => Some(Feed::Best),
            "top" => Some(Feed::Top),
            "new" => Some(Feed::New),
            _ => None,
        }
    }
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    base_url: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("hackernews client user agent required");
        }

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout.unwrap_or(Duration::from_secs(20)))
                .build()
                .context("build hackernews HTTP client")?,
        };

        Ok(Client {
            http,
            user_agent: config.user_agent,
            base_url: HN_API_BASE.to_string(),
        })
    }

    /// Fetches up to `limit` stories of `feed`, in the feed's own ranking.
    /// Items that fail to load or are not stories are skipped.
    pub fn stories(&self, feed: Feed, limit: usize) -> Result<Vec<DisplayItem>> {
        let url = format!("{}/{}.json", self.base_url, feed.as_str());
        let ids: Vec<i64> = self
            .http
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("request {url}"))?
            .json()
            .context("decode story id list")?;
        debug!(feed = feed.display_name(), count = ids.len(), "story ids fetched");

        let mut stories = Vec::with_capacity(limit.min(ids.len()));
        for &id in ids.iter().take(limit) {
            match self.get_item(id) {
                Ok(item) => {
                    if let Some(story) = item.into_display_item() {
                        stories.push(story);
                    }
                }
                Err(err) => warn!(id, "skipping story: {err:#}"),
            }
        }
        Ok(stories)
    }

    fn get_item(&self, id: i64) -> Result<Item> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        let item: Item = self
            .http
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(item)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Item {
    pub fn into_display_item(self) -> Option<DisplayItem> {
        if self.item_type != "story" && self.item_type != "job" {
            return None;
        }
        if self.dead || self.deleted {
            return None;
        }

        let headline = self.title?.trim().to_string();
        if headline.is_empty() {
            return None;
        }

        // text posts (Ask HN and friends) link to their discussion page
        let discussion = format!("{}?id={}", HN_ITEM_URL, self.id);
        let target = self
            .url
            .as_deref()
            .and_then(crate::data::resolve_target)
            .unwrap_or(discussion);

        Some(DisplayItem {
            headline,
            score: self.score.unwrap_or(0).max(0) as u64,
            target,
        })
    }
}
