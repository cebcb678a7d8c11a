use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::info;

use crate::config::{self, Config};
use crate::data::{self, DisplayItem, FileProvider, HackerNewsProvider, ItemProvider, Selection};
use crate::hackernews;
use crate::logging::{self, LogTarget};
use crate::shortcuts::BrowserSink;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print the stories as plain text instead of starting the interface.
    pub print: bool,
    /// Browser command overriding `ui.browser_command`, e.g. `firefox`.
    pub browser: Option<String>,
    pub config_file: Option<PathBuf>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;

    init_logging(&cfg, options.print);

    let alphabet = cfg.shortcut_alphabet()?;
    let provider = build_provider(&cfg)?;
    let selection = Selection {
        min_score: cfg.source.min_score,
        limit: cfg.source.limit,
    };
    let items = fetch_with_progress(provider.as_ref(), selection, &cfg)?;
    info!(count = items.len(), "stories loaded");

    if options.print {
        return data::print_items(&items);
    }

    let browser_command = match options.browser {
        Some(browser) => browser.split_whitespace().map(str::to_string).collect(),
        None => cfg.ui.browser_command.clone(),
    };

    let mut model = ui::Model::new(ui::Options {
        items,
        title: cfg.ui.title.clone(),
        alphabet,
        sink: Box::new(BrowserSink::new(browser_command)),
    });
    model.run()
}

// The interface owns the terminal, so logs only go to stderr in print mode.
fn init_logging(cfg: &Config, print: bool) {
    let target = if print {
        Some(LogTarget::Stderr)
    } else {
        cfg.log
            .file
            .clone()
            .or_else(logging::default_log_path)
            .map(LogTarget::File)
    };
    if let Some(target) = target {
        if let Err(err) = logging::init(&target) {
            eprintln!("warning: logging disabled: {err:#}");
        }
    }
}

fn build_provider(cfg: &Config) -> Result<Box<dyn ItemProvider>> {
    if let Some(path) = cfg.source.file.clone() {
        return Ok(Box::new(FileProvider::new(path)));
    }

    let client = hackernews::Client::new(hackernews::ClientConfig {
        user_agent: cfg.source.user_agent.clone(),
        timeout: Some(cfg.source.timeout),
        http_client: None,
    })
    .context("initialise Hacker News client")?;

    Ok(Box::new(HackerNewsProvider::new(
        Arc::new(client),
        cfg.source.feed,
        cfg.source.limit,
    )))
}

fn fetch_with_progress(
    provider: &dyn ItemProvider,
    selection: Selection,
    cfg: &Config,
) -> Result<Vec<DisplayItem>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!(
        "Fetching {} stories…",
        cfg.source.feed.display_name()
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = data::load_items(provider, selection);
    spinner.finish_and_clear();
    result
}
