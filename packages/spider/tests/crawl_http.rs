use chrono::NaiveDate;
use clayton_meetings_meeting_models::{Classification, Location, MeetingStatus};
use clayton_meetings_scraper::HttpFetcher;
use clayton_meetings_scraper::retry::RetryPolicy;
use clayton_meetings_spider::Spider;
use clayton_meetings_spider::crawl::{CrawlOptions, crawl};
use clayton_meetings_spider::progress::null_progress;
use tokio::sync::mpsc;

const DETAIL_HTML: &str = include_str!("files/clay_plan_arb.html");
const CALENDAR_HTML: &str = include_str!("files/clay_plan_arb_calendar.html");
const LISTING_HTML: &str = include_str!("files/clay_plan_arb_listing.html");

const LISTING_PATH: &str =
    "/government/boards-and-commissions/plan-commission-and-architectural-review-board";
const CALENDAR_PATH: &str = "/calendar/meetings/-seldept-8/-toggle-all";

fn spider_for(base: &str) -> Spider {
    Spider::from_toml_str(&format!(
        r#"
        name = "clay_plan_arb"
        agency = "Clayton Plan Commission and Architectural Review Board"
        timezone = "America/Chicago"
        classification = "Board"
        start_url = "{base}{LISTING_PATH}"
        calendar_url = "{base}{CALENDAR_PATH}"

        [filter]
        contains_ignore_case = ["plan commission/arb"]
        contains = ["ARB"]
        "#
    ))
    .unwrap()
}

#[tokio::test]
async fn crawls_site_over_http() {
    let mut server = mockito::Server::new_async().await;
    let listing = server
        .mock("GET", LISTING_PATH)
        .with_status(200)
        .with_body(LISTING_HTML)
        .expect(1)
        .create_async()
        .await;
    let calendar = server
        .mock("GET", CALENDAR_PATH)
        .with_status(200)
        .with_body(CALENDAR_HTML)
        .expect(1)
        .create_async()
        .await;
    let event = server
        .mock("GET", "/Home/Components/Calendar/Event/4588/1502")
        .with_status(200)
        .with_body(DETAIL_HTML)
        .expect(1)
        .create_async()
        .await;
    let special = server
        .mock("GET", "/Home/Components/Calendar/Event/4601/1502")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let aldermen = server
        .mock("GET", "/Home/Components/Calendar/Event/4590/1502")
        .expect(0)
        .create_async()
        .await;

    let spider = spider_for(&server.url());
    let fetcher = HttpFetcher::new()
        .unwrap()
        .with_retry_policy(RetryPolicy::none());
    let now = NaiveDate::from_ymd_opt(2020, 8, 19)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    let sent = crawl(
        &spider,
        &fetcher,
        &CrawlOptions::new(now),
        &tx,
        &null_progress(),
    )
    .await
    .unwrap();
    drop(tx);

    assert_eq!(sent, 1);
    let meeting = rx.recv().await.unwrap();
    assert!(rx.recv().await.is_none());

    assert_eq!(
        meeting.title,
        "Planning Commission/Architectural Review Board"
    );
    assert_eq!(meeting.classification, Classification::Board);
    assert_eq!(
        meeting.start,
        NaiveDate::from_ymd_opt(2020, 12, 21).and_then(|d| d.and_hms_opt(5, 30, 0))
    );
    assert_eq!(
        meeting.location,
        Location {
            name: Some("City Hall".to_string()),
            address: Some("10 N. Bemiston Ave Clayton, Missouri 63105".to_string()),
        }
    );
    assert_eq!(
        meeting.source,
        format!("{}/Home/Components/Calendar/Event/4588/1502", server.url())
    );
    assert_eq!(meeting.status, Some(MeetingStatus::Tentative));
    assert_eq!(meeting.links.len(), 1);
    assert_eq!(
        meeting.links[0].href,
        format!("{}/AgendaCenter/ViewFile/Agenda/_12212020-1502", server.url())
    );

    listing.assert_async().await;
    calendar.assert_async().await;
    event.assert_async().await;
    special.assert_async().await;
    aldermen.assert_async().await;
}

#[tokio::test]
async fn calendar_outage_aborts_crawl() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", LISTING_PATH)
        .with_status(200)
        .with_body(LISTING_HTML)
        .create_async()
        .await;
    server
        .mock("GET", CALENDAR_PATH)
        .with_status(500)
        .create_async()
        .await;

    let spider = spider_for(&server.url());
    let fetcher = HttpFetcher::new()
        .unwrap()
        .with_retry_policy(RetryPolicy::none());
    let now = NaiveDate::from_ymd_opt(2020, 8, 19)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();

    let (tx, _rx) = mpsc::channel(8);
    let result = crawl(
        &spider,
        &fetcher,
        &CrawlOptions::new(now),
        &tx,
        &null_progress(),
    )
    .await;

    assert!(result.is_err());
}
