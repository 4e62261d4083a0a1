#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Meeting spider for the Clayton Plan Commission and Architectural Review
//! Board.
//!
//! The crawl runs listing page → calendar page → one detail page per
//! matching calendar tile:
//!
//! 1. [`calendar`] picks the event URLs worth following
//! 2. [`event`] turns each detail page into a [`Meeting`]
//! 3. [`agenda`] matches the event date against the commission listing to
//!    attach agenda links
//! 4. [`pipeline`] assigns the meeting id and status
//!
//! [`crawl::crawl`] drives the whole flow and streams meetings through a
//! channel.
//!
//! [`Meeting`]: clayton_meetings_meeting_models::Meeting

pub mod agenda;
pub mod calendar;
pub mod crawl;
pub mod event;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod spider_def;

use std::path::Path;

use clayton_meetings_scraper::ScrapeError;
use scraper::Selector;

use crate::spider_def::{SpiderDefinition, parse_spider_toml};

/// Errors that can occur while running a spider.
#[derive(Debug, thiserror::Error)]
pub enum SpiderError {
    /// Fetching a page failed.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// The spider definition could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A CSS selector in the spider definition is invalid.
    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector as written in the config.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// I/O error (config file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The meeting receiver went away mid-crawl.
    #[error("Channel closed: {0}")]
    Channel(String),
}

/// Compiled CSS selectors, one per [`spider_def::SelectorConfig`] entry.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub(crate) calendar_tile: Selector,
    pub(crate) calendar_tile_title: Selector,
    pub(crate) calendar_tile_link: Selector,
    pub(crate) title: Selector,
    pub(crate) start_label: Selector,
    pub(crate) end_label: Selector,
    pub(crate) location_name: Selector,
    pub(crate) location_address: Selector,
    pub(crate) agenda_entry: Selector,
    pub(crate) agenda_link: Selector,
}

fn parse_selector(selector: &str) -> Result<Selector, SpiderError> {
    Selector::parse(selector).map_err(|e| SpiderError::InvalidSelector {
        selector: selector.to_owned(),
        message: e.to_string(),
    })
}

/// A spider definition with its selectors compiled, ready to crawl.
#[derive(Debug, Clone)]
pub struct Spider {
    definition: SpiderDefinition,
    selectors: Selectors,
}

impl Spider {
    /// Compiles a spider definition.
    ///
    /// # Errors
    ///
    /// Returns [`SpiderError::InvalidSelector`] if any selector fails to
    /// parse.
    pub fn new(definition: SpiderDefinition) -> Result<Self, SpiderError> {
        let s = &definition.selectors;
        let selectors = Selectors {
            calendar_tile: parse_selector(&s.calendar_tile)?,
            calendar_tile_title: parse_selector(&s.calendar_tile_title)?,
            calendar_tile_link: parse_selector(&s.calendar_tile_link)?,
            title: parse_selector(&s.title)?,
            start_label: parse_selector(&s.start_label)?,
            end_label: parse_selector(&s.end_label)?,
            location_name: parse_selector(&s.location_name)?,
            location_address: parse_selector(&s.location_address)?,
            agenda_entry: parse_selector(&s.agenda_entry)?,
            agenda_link: parse_selector(&s.agenda_link)?,
        };
        Ok(Self {
            definition,
            selectors,
        })
    }

    /// Parses and compiles a spider from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SpiderError`] if the TOML or a selector is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SpiderError> {
        Self::new(parse_spider_toml(toml_str)?)
    }

    /// Loads and compiles a spider from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SpiderError`] if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self, SpiderError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The spider definition this spider was compiled from.
    #[must_use]
    pub const fn definition(&self) -> &SpiderDefinition {
        &self.definition
    }

    /// Spider name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Switches AM/PM handling on or off.
    #[must_use]
    pub const fn with_honor_meridiem(mut self, honor: bool) -> Self {
        self.definition.honor_meridiem = honor;
        self
    }

    pub(crate) const fn selectors(&self) -> &Selectors {
        &self.selectors
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DEFAULT_SPIDER, find_spider};

    #[test]
    fn compiles_embedded_spider() {
        let spider = Spider::new(find_spider(DEFAULT_SPIDER).unwrap()).unwrap();
        assert_eq!(spider.name(), "clay_plan_arb");
    }

    #[test]
    fn reports_invalid_selector() {
        let mut def = find_spider(DEFAULT_SPIDER).unwrap();
        def.selectors.title = "h2[".to_string();
        let err = Spider::new(def).unwrap_err();
        assert!(matches!(
            err,
            SpiderError::InvalidSelector { ref selector, .. } if selector == "h2["
        ));
    }

    #[test]
    fn meridiem_override() {
        let spider = test_support::spider().with_honor_meridiem(true);
        assert!(spider.definition().honor_meridiem);
    }
}
