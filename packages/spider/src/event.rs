//! Event detail page: extract one [`Meeting`].
//!
//! Every field is extracted independently and degrades to an empty or
//! absent value, so a detail page always yields a record even when the
//! markup has drifted.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clayton_meetings_meeting_models::{Location, Meeting};
use clayton_meetings_scraper::Page;
use regex::Regex;
use scraper::{Html, Selector};

use crate::{Spider, agenda};

/// `12/21/2020 5:30 PM - 7:00 PM`
static START_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<day>\d{2}/\d{2}/\d{4}) (?P<time>\d{1,2}:\d{2}) (?P<meridiem>PM|AM) - \d{1,2}:\d{2} (?:PM|AM)",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// `12/21/2020, 5:30 PM - 7:00 PM`
static END_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<day>\d{2}/\d{2}/\d{4}), \d{1,2}:\d{2} (?:PM|AM) - (?P<time>\d{1,2}:\d{2}) (?P<meridiem>PM|AM)",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// How printed clock times become timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Use the printed hour as-is, ignoring AM/PM (`5:30 PM` → 05:30).
    AsPrinted,
    /// Apply the AM/PM marker (`5:30 PM` → 17:30, `12:00 AM` → 00:00).
    Meridiem,
}

impl ClockMode {
    #[must_use]
    pub const fn for_spider(spider: &Spider) -> Self {
        if spider.definition().honor_meridiem {
            Self::Meridiem
        } else {
            Self::AsPrinted
        }
    }
}

/// Parses a detail page into a meeting.
///
/// `listing` is the commission listing page used to resolve agenda links;
/// pass `None` to skip agenda matching. `id` and `status` are left unset for
/// [`crate::pipeline`].
#[must_use]
pub fn parse_event(spider: &Spider, page: &Page, listing: Option<&Page>) -> Meeting {
    let selectors = spider.selectors();
    let clock = ClockMode::for_spider(spider);

    let (title, start, end, location) = {
        let document = page.document();
        (
            parse_title(&document, &selectors.title),
            parse_start(&document, &selectors.start_label, clock),
            parse_end(&document, &selectors.end_label, clock),
            parse_location(
                &document,
                &selectors.location_name,
                &selectors.location_address,
            ),
        )
    };

    let links = match (listing, start) {
        (Some(listing), Some(start)) => agenda::match_agenda(spider, listing, start.date()),
        _ => Vec::new(),
    };

    if start.is_none() {
        log::warn!("{}: no parseable start time", page.url());
    }

    Meeting {
        id: None,
        title,
        description: String::new(),
        classification: spider.definition().classification,
        start,
        end,
        all_day: false,
        time_notes: String::new(),
        location,
        links,
        source: page.url().to_string(),
        status: None,
    }
}

/// Text of the first element matching `selector`, whitespace-collapsed.
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    let el = document.select(selector).next()?;
    let text = el.text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Meeting title, or an empty string when the heading is missing.
#[must_use]
pub fn parse_title(document: &Html, selector: &Selector) -> String {
    first_text(document, selector).unwrap_or_default()
}

/// Start time from the `MM/DD/YYYY H:MM AM - H:MM PM` label.
#[must_use]
pub fn parse_start(document: &Html, selector: &Selector, clock: ClockMode) -> Option<NaiveDateTime> {
    let label = first_text(document, selector)?;
    parse_label(&START_LABEL, &label, clock)
}

/// End time from the `MM/DD/YYYY, H:MM AM - H:MM PM` label.
///
/// Uses the second time of the range.
#[must_use]
pub fn parse_end(document: &Html, selector: &Selector, clock: ClockMode) -> Option<NaiveDateTime> {
    let label = first_text(document, selector)?;
    parse_label(&END_LABEL, &label, clock)
}

fn parse_label(pattern: &Regex, label: &str, clock: ClockMode) -> Option<NaiveDateTime> {
    let caps = pattern.captures(label)?;
    naive_timestamp(&caps["day"], &caps["time"], &caps["meridiem"], clock)
}

/// Builds a timestamp from `MM/DD/YYYY`, `H:MM` and `AM`/`PM`.
#[must_use]
pub fn naive_timestamp(
    day: &str,
    time: &str,
    meridiem: &str,
    clock: ClockMode,
) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(day, "%m/%d/%Y").ok()?;

    let (hour, minute) = time.split_once(':')?;
    let mut hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    if clock == ClockMode::Meridiem {
        if hour == 0 || hour > 12 {
            return None;
        }
        hour %= 12;
        if meridiem.eq_ignore_ascii_case("PM") {
            hour += 12;
        }
    }

    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(date.and_time(time))
}

/// Venue name and street address from the location micro-format spans.
#[must_use]
pub fn parse_location(document: &Html, name: &Selector, address: &Selector) -> Location {
    Location {
        name: first_text(document, name),
        address: first_text(document, address),
    }
}
