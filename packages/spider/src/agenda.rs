//! Agenda links from the commission listing page.
//!
//! Resolving agenda links is a two-step operation: [`fetch_listing`] gets
//! the listing page once, then [`match_agenda`] looks for the entry dated
//! on the meeting day and returns its document link. [`resolve`] combines
//! both for callers that handle a single event, such as `parse --agenda`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use clayton_meetings_meeting_models::Link;
use clayton_meetings_scraper::{Fetcher, Page};
use regex::Regex;

use crate::Spider;

/// `M/D/YY` or `M/D/YYYY`.
static ENTRY_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4}|\d{2})\b")
        .unwrap_or_else(|_| unreachable!())
});

/// Title used when the agenda anchor has no text.
const DEFAULT_LINK_TITLE: &str = "Agenda";

/// Fetches the agenda listing page.
///
/// A failure only costs the meeting its links, so it is logged and mapped
/// to `None`.
pub async fn fetch_listing(spider: &Spider, fetcher: &dyn Fetcher) -> Option<Page> {
    let url = spider.definition().agenda_url();
    match fetcher.fetch(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            log::warn!("agenda listing {url} unavailable, meetings get no links: {e}");
            None
        }
    }
}

/// Every date mentioned in `text`. Two-digit years are taken as 20YY.
fn dates_in(text: &str) -> impl Iterator<Item = NaiveDate> + '_ {
    ENTRY_DATE.captures_iter(text).filter_map(|caps| {
        let month: u32 = caps["month"].parse().ok()?;
        let day: u32 = caps["day"].parse().ok()?;
        let year_str = &caps["year"];
        let mut year: i32 = year_str.parse().ok()?;
        if year_str.len() == 2 {
            year += 2000;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Returns the agenda link of the first listing entry dated `date`.
///
/// Entries that mention the date but carry no link are skipped. Returns an
/// empty list when nothing matches.
#[must_use]
pub fn match_agenda(spider: &Spider, listing: &Page, date: NaiveDate) -> Vec<Link> {
    let selectors = spider.selectors();
    let document = listing.document();

    for entry in document.select(&selectors.agenda_entry) {
        let text = entry.text().collect::<Vec<_>>().join(" ");
        if !dates_in(&text).any(|d| d == date) {
            continue;
        }

        let Some(anchor) = entry.select(&selectors.agenda_link).next() else {
            continue;
        };
        let Some(href) = anchor
            .value()
            .attr("href")
            .and_then(|href| listing.urljoin(href))
        else {
            continue;
        };

        let anchor_text = anchor
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let title = if anchor_text.is_empty() {
            DEFAULT_LINK_TITLE.to_string()
        } else {
            anchor_text
        };

        return vec![Link { href, title }];
    }

    log::debug!("no agenda listed for {date}");
    Vec::new()
}

/// Fetches the listing page and matches `date` against it.
pub async fn resolve(spider: &Spider, fetcher: &dyn Fetcher, date: NaiveDate) -> Vec<Link> {
    match fetch_listing(spider, fetcher).await {
        Some(listing) => match_agenda(spider, &listing, date),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use clayton_meetings_scraper::ScrapeError;

    use super::*;
    use crate::test_support::{LISTING_HTML, spider};

    struct StaticFetcher(Option<&'static str>);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Page, ScrapeError> {
            match self.0 {
                Some(body) => Page::new(url, body),
                None => Err(ScrapeError::Status {
                    url: url.to_string(),
                    status: 503,
                }),
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn listing() -> Page {
        Page::new(&spider().definition().start_url, LISTING_HTML).unwrap()
    }

    #[test]
    fn reads_short_and_long_years() {
        let found: Vec<NaiveDate> = dates_in("12/21/20 and 1/4/2021, not 99/99/20").collect();
        assert_eq!(found, vec![date(2020, 12, 21), date(2021, 1, 4)]);
    }

    #[test]
    fn matches_entry_by_date() {
        let links = match_agenda(&spider(), &listing(), date(2020, 11, 16));
        assert_eq!(
            links,
            vec![Link {
                href: "https://www.claytonmo.gov/AgendaCenter/ViewFile/Agenda/_11162020-1490"
                    .to_string(),
                title: "Agenda".to_string(),
            }]
        );
    }

    #[test]
    fn skips_dated_entry_without_link() {
        // 01/04/21 is listed twice: first without a document, then with one.
        let links = match_agenda(&spider(), &listing(), date(2021, 1, 4));
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].href,
            "https://www.claytonmo.gov/AgendaCenter/ViewFile/Agenda/_01042021-1511"
        );
        assert_eq!(links[0].title, "Revised Agenda");
    }

    #[test]
    fn no_match_is_empty() {
        assert!(match_agenda(&spider(), &listing(), date(2019, 3, 1)).is_empty());
    }

    #[tokio::test]
    async fn resolve_fetches_then_matches() {
        let fetcher = StaticFetcher(Some(LISTING_HTML));
        let links = resolve(&spider(), &fetcher, date(2020, 12, 21)).await;
        assert_eq!(links.len(), 1);
        assert!(links[0].href.ends_with("_12212020-1502"));
    }

    #[tokio::test]
    async fn resolve_survives_fetch_failure() {
        let fetcher = StaticFetcher(None);
        assert!(resolve(&spider(), &fetcher, date(2020, 12, 21))
            .await
            .is_empty());
    }
}
