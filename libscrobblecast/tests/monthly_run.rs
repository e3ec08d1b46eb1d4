//! Integration tests for the monthly run
//!
//! Drives MonthlyRun end to end with the mock source and platform.

use chrono::NaiveDate;
use libscrobblecast::platforms::mock::MockPlatform;
use libscrobblecast::scrobbles::mock::MockScrobbleSource;
use libscrobblecast::{MonthlyRun, RunOutcome, Tag, TopAlbum};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_first_of_month_posts_composed_message() {
    let mut run = MonthlyRun::new(
        MockScrobbleSource::with_album(MockScrobbleSource::sample_album()),
        MockPlatform::success("mastodon"),
    );

    let outcome = run.run(date(2024, 2, 1)).await;

    let expected =
        "In January, I thought the album X by Y was 🔥 I've scrobbled songs from it 10 times. http://u\n#b #c #d #e ";
    match &outcome {
        RunOutcome::Posted {
            month,
            post_id,
            message,
        } => {
            assert_eq!(month.number, 1);
            assert_eq!(post_id, "mastodon:mock-1");
            assert_eq!(message, expected);
        }
        other => panic!("Expected Posted, got {:?}", other),
    }

    assert_eq!(run.platform().posted_content(), vec![expected.to_string()]);
    assert_eq!(run.platform().prepare_call_count(), 1);
    assert_eq!(outcome.exit_code(false), 0);
}

#[tokio::test]
async fn test_other_days_do_nothing() {
    let mut run = MonthlyRun::new(
        MockScrobbleSource::with_album(MockScrobbleSource::sample_album()),
        MockPlatform::success("mastodon"),
    );

    let outcome = run.run(date(2024, 2, 2)).await;

    assert!(matches!(outcome, RunOutcome::Skipped { day: 2 }));
    assert_eq!(run.source().auth_call_count(), 0);
    assert_eq!(run.source().fetch_call_count(), 0);
    assert_eq!(run.platform().post_call_count(), 0);
    assert_eq!(outcome.exit_code(true), 0);
}

#[tokio::test]
async fn test_no_album_skips_posting() {
    let mut run = MonthlyRun::new(MockScrobbleSource::empty(), MockPlatform::success("mastodon"));

    let outcome = run.run(date(2024, 2, 1)).await;

    match &outcome {
        RunOutcome::NoData { month } => assert_eq!(month.name, "January"),
        other => panic!("Expected NoData, got {:?}", other),
    }
    assert_eq!(run.source().fetch_call_count(), 1);
    assert_eq!(run.platform().post_call_count(), 0);
    assert_eq!(outcome.exit_code(true), 0);
}

#[tokio::test]
async fn test_publisher_failure_is_contained() {
    let mut run = MonthlyRun::new(
        MockScrobbleSource::with_album(MockScrobbleSource::sample_album()),
        MockPlatform::post_failure("mastodon", "HTTP 502 Bad Gateway"),
    );

    let outcome = run.run(date(2024, 2, 1)).await;

    match &outcome {
        RunOutcome::Failed { error } => assert!(error.to_string().contains("502")),
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert_eq!(run.platform().post_call_count(), 1);
    assert_eq!(outcome.exit_code(false), 0);
    assert_eq!(outcome.exit_code(true), 1);
}

#[tokio::test]
async fn test_fetch_failure_never_reaches_publisher() {
    let mut run = MonthlyRun::new(
        MockScrobbleSource::fetch_failure("connection reset by peer"),
        MockPlatform::success("mastodon"),
    );

    let outcome = run.run(date(2024, 2, 1)).await;

    assert!(outcome.is_failure());
    assert_eq!(run.platform().post_call_count(), 0);
}

#[tokio::test]
async fn test_january_reports_december() {
    let album = TopAlbum {
        title: "Blue".to_string(),
        artist: "Joni Mitchell".to_string(),
        url: "https://www.last.fm/music/Joni+Mitchell/Blue".to_string(),
        playcount: 42,
        tags: vec![Tag::new("folk")],
    };
    let mut run = MonthlyRun::new(
        MockScrobbleSource::with_album(album),
        MockPlatform::success("mastodon"),
    );

    let outcome = run.run(date(2025, 1, 1)).await;

    match outcome {
        RunOutcome::Posted { month, message, .. } => {
            assert_eq!(month.number, 12);
            assert_eq!(month.year, 2024);
            assert_eq!(
                message,
                "In December, I thought the album Blue by Joni Mitchell was 🔥 I've scrobbled songs from it 42 times. https://www.last.fm/music/Joni+Mitchell/Blue\n"
            );
        }
        other => panic!("Expected Posted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_overlong_message_fails_validation() {
    let album = TopAlbum {
        title: "T".repeat(600),
        ..MockScrobbleSource::sample_album()
    };
    let mut run = MonthlyRun::new(
        MockScrobbleSource::with_album(album),
        MockPlatform::with_limit("mastodon", 500),
    );

    let outcome = run.run(date(2024, 2, 1)).await;

    match outcome {
        RunOutcome::Failed { error } => assert!(error.to_string().contains("character limit")),
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert!(run.platform().posted_content().is_empty());
}
