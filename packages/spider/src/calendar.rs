//! Calendar page: pick the event tiles worth following.
//!
//! Each tile on the calendar page carries a description heading and a link
//! to the event detail page. Description and link are read from the same
//! tile element, so a tile missing either one is skipped on its own instead
//! of shifting every later pairing.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use clayton_meetings_scraper::Page;
use regex::Regex;

use crate::Spider;

/// Leading `.../<4 digits>` segment of an event URL. CivicPlus event URLs
/// look like `/Home/Components/Calendar/Event/4588/1502?seldept=8`; the
/// trailing query string and anything after the last 4-digit segment is
/// dropped.
static EVENT_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<link>.*/\d{4})").unwrap_or_else(|_| unreachable!()));

/// A calendar tile: its visible description and its link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTile {
    /// Visible description text.
    pub description: String,
    /// Raw `href` of the tile link.
    pub href: String,
}

/// Reads every tile that has both a description and a link.
#[must_use]
pub fn calendar_tiles(spider: &Spider, page: &Page) -> Vec<CalendarTile> {
    let selectors = spider.selectors();
    let document = page.document();

    document
        .select(&selectors.calendar_tile)
        .filter_map(|tile| {
            let description = tile
                .select(&selectors.calendar_tile_title)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())?;
            let href = tile
                .select(&selectors.calendar_tile_link)
                .next()
                .and_then(|el| el.value().attr("href"))?
                .to_string();
            Some(CalendarTile { description, href })
        })
        .collect()
}

/// Trims an event URL to its leading `.../<year>` prefix, or returns it
/// unchanged when there is no 4-digit path segment.
#[must_use]
pub fn trim_event_url(url: &str) -> String {
    EVENT_URL_PREFIX
        .captures(url)
        .and_then(|caps| caps.name("link"))
        .map_or_else(|| url.to_string(), |m| m.as_str().to_string())
}

/// Returns the detail-page URLs for every tile accepted by the spider's
/// filter, in calendar order with duplicates removed.
#[must_use]
pub fn event_urls(spider: &Spider, page: &Page) -> Vec<String> {
    let filter = &spider.definition().filter;
    let mut seen = BTreeSet::new();
    let mut urls = Vec::new();

    for tile in calendar_tiles(spider, page) {
        if !filter.matches(&tile.description) {
            log::trace!("skipping calendar tile '{}'", tile.description);
            continue;
        }
        let Some(absolute) = page.urljoin(&tile.href) else {
            log::warn!(
                "calendar tile '{}' has unresolvable link '{}'",
                tile.description,
                tile.href
            );
            continue;
        };
        let url = trim_event_url(&absolute);
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }

    log::debug!("{} event URL(s) on {}", urls.len(), page.url());
    urls
}
