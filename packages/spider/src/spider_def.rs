//! Config-driven spider definition.
//!
//! [`SpiderDefinition`] captures the URLs, CSS selectors and tile filter of
//! the spider in a serializable struct, loaded from TOML. The embedded
//! definitions live in `packages/spider/spiders/` (see
//! [`crate::registry`]); `--config` on the CLI loads an external file of
//! the same shape.

use clayton_meetings_meeting_models::Classification;
use serde::Deserialize;

use crate::SpiderError;

/// A complete spider definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SpiderDefinition {
    /// Spider name, used as the first segment of meeting ids
    /// (e.g. `"clay_plan_arb"`).
    pub name: String,
    /// Human-readable name of the public body.
    pub agency: String,
    /// IANA timezone the site's naive timestamps are expressed in.
    pub timezone: String,
    /// Classification stamped on every meeting.
    pub classification: Classification,
    /// Commission listing page the crawl starts from.
    pub start_url: String,
    /// Calendar page enumerating event tiles.
    pub calendar_url: String,
    /// Page scanned for agenda documents. Defaults to `start_url`.
    #[serde(default)]
    pub agenda_url: Option<String>,
    /// Delay between detail-page fetches, in milliseconds.
    #[serde(default)]
    pub request_delay_ms: u64,
    /// Apply the AM/PM marker when building timestamps. When `false` the
    /// printed clock hour is used as-is.
    #[serde(default)]
    pub honor_meridiem: bool,
    /// Which calendar tiles to follow.
    pub filter: TileFilter,
    /// CSS selectors for every extracted field.
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl SpiderDefinition {
    /// The page scanned for agenda documents.
    #[must_use]
    pub fn agenda_url(&self) -> &str {
        self.agenda_url.as_deref().unwrap_or(&self.start_url)
    }
}

/// Keyword filter applied to calendar tile descriptions.
///
/// A tile is followed when its description matches any keyword of either
/// list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileFilter {
    /// Matched against the lowercased description. Keywords must be
    /// lowercase.
    #[serde(default)]
    pub contains_ignore_case: Vec<String>,
    /// Matched case-sensitively.
    #[serde(default)]
    pub contains: Vec<String>,
}

impl TileFilter {
    /// Returns `true` if `description` should be followed.
    #[must_use]
    pub fn matches(&self, description: &str) -> bool {
        let lower = description.to_lowercase();
        self.contains_ignore_case
            .iter()
            .any(|k| lower.contains(k.as_str()))
            || self.contains.iter().any(|k| description.contains(k.as_str()))
    }
}

/// CSS selectors for the calendar, detail and listing pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One calendar tile.
    pub calendar_tile: String,
    /// Description heading inside a tile.
    pub calendar_tile_title: String,
    /// Event link inside a tile.
    pub calendar_tile_link: String,
    /// Detail page title.
    pub title: String,
    /// Detail page label holding `MM/DD/YYYY H:MM AM - H:MM PM`.
    pub start_label: String,
    /// Detail page label holding `MM/DD/YYYY, H:MM AM - H:MM PM`.
    pub end_label: String,
    /// Venue name micro-format span.
    pub location_name: String,
    /// Street address micro-format span.
    pub location_address: String,
    /// One dated entry on the agenda listing page.
    pub agenda_entry: String,
    /// Agenda document link inside an entry.
    pub agenda_link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            calendar_tile: "li.vi-events-tiles-item".to_string(),
            calendar_tile_title: "h2.vi-events-tiles-title".to_string(),
            calendar_tile_link: "a[href]".to_string(),
            title: "h2.detail-title span".to_string(),
            start_label: "span.detail-list-value".to_string(),
            end_label: "span[itemprop='endDate']".to_string(),
            location_name: "span[itemprop='location'] span[itemprop='name']".to_string(),
            location_address: "span[itemprop='location'] span[itemprop='street-address']"
                .to_string(),
            agenda_entry: "span.detail-list-value".to_string(),
            agenda_link: "a[href]".to_string(),
        }
    }
}

/// Parses a spider definition from TOML.
///
/// # Errors
///
/// Returns [`SpiderError::Config`] if the TOML is malformed or missing
/// required fields.
pub fn parse_spider_toml(toml_str: &str) -> Result<SpiderDefinition, SpiderError> {
    Ok(toml::from_str(toml_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        name = "test_spider"
        agency = "Test Agency"
        timezone = "America/Chicago"
        classification = "Commission"
        start_url = "https://example.org/start"
        calendar_url = "https://example.org/calendar"

        [filter]
        contains = ["ARB"]
    "#;

    #[test]
    fn applies_defaults() {
        let def = parse_spider_toml(MINIMAL).unwrap();
        assert_eq!(def.classification, Classification::Commission);
        assert_eq!(def.request_delay_ms, 0);
        assert!(!def.honor_meridiem);
        assert_eq!(def.agenda_url(), "https://example.org/start");
        assert_eq!(def.selectors.title, "h2.detail-title span");
        assert!(def.filter.contains_ignore_case.is_empty());
    }

    #[test]
    fn agenda_url_override() {
        let toml_str = format!("agenda_url = \"https://example.org/agendas\"\n{MINIMAL}");
        let def = parse_spider_toml(&toml_str).unwrap();
        assert_eq!(def.agenda_url(), "https://example.org/agendas");
    }

    #[test]
    fn rejects_missing_urls() {
        let err = parse_spider_toml("name = \"x\"").unwrap_err();
        assert!(matches!(err, SpiderError::Config(_)));
    }

    #[test]
    fn filter_matches_either_list() {
        let filter = TileFilter {
            contains_ignore_case: vec!["plan commission/arb".to_string()],
            contains: vec!["ARB".to_string()],
        };
        assert!(filter.matches("PLAN COMMISSION/ARB Regular Meeting"));
        assert!(filter.matches("Plan Commission/arb"));
        assert!(filter.matches("ARB Special Meeting"));
        assert!(!filter.matches("Board of Aldermen"));
        assert!(!filter.matches("Harbor walk"));
    }
}
