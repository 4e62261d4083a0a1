//! Post-extraction pipeline: meeting id and status.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use clayton_meetings_meeting_models::{Meeting, MeetingStatus};
use regex::Regex;

/// Runs of anything that is not an ASCII letter or digit.
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap_or_else(|_| unreachable!()));

/// Words that mark a meeting as not happening as scheduled.
const CANCELLED_MARKERS: &[&str] = &["cancel", "rescheduled", "postpone"];

/// Lowercase, `_`-separated slug of a title.
#[must_use]
pub fn title_slug(title: &str) -> String {
    NON_ALNUM
        .replace_all(title, "_")
        .trim_matches('_')
        .to_lowercase()
}

/// `<spider>/<start %Y%m%d%H%M>/x/<title slug>`, or `None` without a start.
#[must_use]
pub fn meeting_id(spider_name: &str, meeting: &Meeting) -> Option<String> {
    let start = meeting.start?;
    Some(format!(
        "{spider_name}/{}/x/{}",
        start.format("%Y%m%d%H%M"),
        title_slug(&meeting.title)
    ))
}

/// Status of `meeting` as seen at `now`.
///
/// A meeting without a start can only be classified as cancelled or
/// tentative.
#[must_use]
pub fn meeting_status(meeting: &Meeting, now: NaiveDateTime) -> MeetingStatus {
    let text = format!("{} {}", meeting.title, meeting.description).to_lowercase();
    if CANCELLED_MARKERS.iter().any(|m| text.contains(m)) {
        return MeetingStatus::Cancelled;
    }
    match meeting.start {
        Some(start) if start < now => MeetingStatus::Passed,
        _ => MeetingStatus::Tentative,
    }
}

/// Assigns id and status.
#[must_use]
pub fn process(spider_name: &str, mut meeting: Meeting, now: NaiveDateTime) -> Meeting {
    meeting.status = Some(meeting_status(&meeting, now));
    meeting.id = meeting_id(spider_name, &meeting);
    meeting
}
