#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Meeting record schema.
//!
//! Every scraped event page is normalized into a [`Meeting`], the record
//! format consumed by the downstream meeting aggregator. Enumerated values
//! ([`Classification`], [`MeetingStatus`]) serialize to the aggregator's
//! display strings.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category of the public body holding a meeting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Classification {
    /// Advisory committee
    #[serde(rename = "Advisory Committee")]
    #[strum(serialize = "Advisory Committee")]
    AdvisoryCommittee,
    /// Board (e.g. architectural review board)
    #[serde(rename = "Board")]
    #[strum(serialize = "Board")]
    Board,
    /// City council
    #[serde(rename = "City Council")]
    #[strum(serialize = "City Council")]
    CityCouncil,
    /// Commission
    #[serde(rename = "Commission")]
    #[strum(serialize = "Commission")]
    Commission,
    /// Committee
    #[serde(rename = "Committee")]
    #[strum(serialize = "Committee")]
    Committee,
    /// Public forum
    #[serde(rename = "Forum")]
    #[strum(serialize = "Forum")]
    Forum,
    /// Police beat meeting
    #[serde(rename = "Police Beat")]
    #[strum(serialize = "Police Beat")]
    PoliceBeat,
    /// Anything else
    #[serde(rename = "Not classified")]
    #[strum(serialize = "Not classified")]
    NotClassified,
}

/// Lifecycle status of a meeting relative to the time it was scraped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MeetingStatus {
    /// The meeting was cancelled, postponed or rescheduled.
    Cancelled,
    /// Upcoming, but not yet confirmed by an agenda.
    Tentative,
    /// Upcoming and confirmed.
    Confirmed,
    /// Already took place.
    Passed,
}

/// Where a meeting is held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Venue name (e.g. "City Hall").
    pub name: Option<String>,
    /// Street address of the venue.
    pub address: Option<String>,
}

/// A supporting document (agenda, minutes, ...) attached to a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL of the document.
    pub href: String,
    /// Human-readable label.
    pub title: String,
}

/// A public meeting normalized to the aggregator schema.
///
/// `id` and `status` are left empty by extraction and assigned by the
/// pipeline stage once the rest of the record is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Stable identifier (`<spider>/<start>/x/<title slug>`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    /// Meeting title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category of the body holding the meeting.
    pub classification: Classification,
    /// Naive local start time. `None` when the page had no parseable start.
    pub start: Option<NaiveDateTime>,
    /// Naive local end time.
    pub end: Option<NaiveDateTime>,
    /// Whether the meeting lasts all day.
    pub all_day: bool,
    /// Notes qualifying the start/end times.
    pub time_notes: String,
    /// Venue.
    pub location: Location,
    /// Supporting documents.
    pub links: Vec<Link>,
    /// URL of the page this record was derived from.
    pub source: String,
    /// Lifecycle status.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<MeetingStatus>,
}
