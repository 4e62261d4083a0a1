//! Crawl driver: listing page → calendar → detail pages.
//!
//! Meetings are sent through a [`tokio::sync::mpsc`] channel as soon as
//! each detail page is parsed, so the consumer can write them out while
//! the crawl is still running.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use clayton_meetings_meeting_models::Meeting;
use clayton_meetings_scraper::Fetcher;
use tokio::sync::mpsc;

use crate::progress::ProgressCallback;
use crate::{Spider, SpiderError, agenda, calendar, event, pipeline};

/// Per-run crawl options.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Stop after this many detail pages.
    pub limit: Option<usize>,
    /// Clock used for meeting status.
    pub now: NaiveDateTime,
}

impl CrawlOptions {
    /// Options with no limit, evaluated at `now`.
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self { limit: None, now }
    }

    /// Limits the number of detail pages visited.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Crawls the spider's site and sends one meeting per detail page.
///
/// Returns the number of meetings sent. A detail page that fails to load is
/// logged and skipped.
///
/// # Errors
///
/// Returns [`SpiderError`] if the start or calendar page cannot be fetched,
/// or if the receiver is dropped.
pub async fn crawl(
    spider: &Spider,
    fetcher: &dyn Fetcher,
    options: &CrawlOptions,
    tx: &mpsc::Sender<Meeting>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<u64, SpiderError> {
    let def = spider.definition();
    log::info!("{}: starting crawl from {}", def.name, def.start_url);

    let start_page = fetcher.fetch(&def.start_url).await?;

    let calendar_page = fetcher.fetch(&def.calendar_url).await?;
    let mut urls = calendar::event_urls(spider, &calendar_page);
    if let Some(limit) = options.limit {
        urls.truncate(limit);
    }
    log::info!("{}: {} event page(s) to visit", def.name, urls.len());
    progress.set_total(urls.len() as u64);

    let listing = if def.agenda_url() == def.start_url {
        Some(start_page)
    } else {
        agenda::fetch_listing(spider, fetcher).await
    };

    let delay = Duration::from_millis(def.request_delay_ms);
    let mut sent: u64 = 0;

    for (i, url) in urls.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        progress.set_message(format!("{}: {url}", def.name));

        let page = match fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("{}: failed to fetch {url}: {e}", def.name);
                progress.inc(1);
                continue;
            }
        };

        let meeting = event::parse_event(spider, &page, listing.as_ref());
        let meeting = pipeline::process(&def.name, meeting, options.now);
        log::debug!(
            "{}: {} ({:?}) from {}",
            def.name,
            meeting.title,
            meeting.start,
            meeting.source
        );

        tx.send(meeting)
            .await
            .map_err(|e| SpiderError::Channel(e.to_string()))?;
        sent += 1;
        progress.inc(1);
    }

    log::info!("{}: crawl complete — {sent} meeting(s)", def.name);
    progress.finish(format!("{}: {sent} meeting(s)", def.name));
    Ok(sent)
}
