mod common;

use common::{listing, network_error, FakeBoard};
use jobsift::{Config, JobBoard, JobBoardApi, Notice, NOTICE_CAPACITY};
use std::sync::Arc;

fn board(fake: &Arc<FakeBoard>) -> JobBoard {
    let config = Config {
        debounce_ms: 0,
        ..Config::default()
    };
    JobBoard::new(&config, Arc::clone(fake) as Arc<dyn JobBoardApi>)
}

#[tokio::test(start_paused = true)]
async fn open_joins_results_with_server_bookmarks() {
    let fake = FakeBoard::new();
    fake.set_favorites(&["b"]);
    fake.search_ok(10, vec![listing("a"), listing("b")]);
    let board = board(&fake);

    board.open().await;
    let rows = board.present();
    let flags: Vec<_> = rows.iter().map(|r| (r.id().to_string(), r.is_favorite)).collect();
    assert_eq!(flags, vec![("a".to_string(), false), ("b".to_string(), true)]);
}

#[tokio::test(start_paused = true)]
async fn presentation_is_stable_until_an_input_changes() {
    let fake = FakeBoard::new();
    fake.search_ok(10, vec![listing("a")]);
    let board = board(&fake);
    board.open().await;

    let first = board.present();
    let second = board.present();
    assert!(Arc::ptr_eq(&first, &second));

    board.toggle_bookmark("a").await;
    let third = board.present();
    assert!(!Arc::ptr_eq(&second, &third));
    assert!(third[0].is_favorite);
    assert!(!first[0].is_favorite, "earlier views are never mutated");
}

#[tokio::test(start_paused = true)]
async fn query_highlights_follow_the_applied_search() {
    let fake = FakeBoard::new();
    fake.search_ok(10, vec![listing("a")]);
    let board = board(&fake);

    board.search().submit_query("job");
    board.search().settled().await;
    assert_eq!(board.present()[0].highlight_ranges, vec![(0, 3)]);
}

#[tokio::test(start_paused = true)]
async fn failures_arrive_as_notices() {
    let fake = FakeBoard::new();
    fake.search_err(10, network_error());
    fake.bookmark("a", 10, Err(network_error()));
    let mut board = board(&fake);
    let mut notices = board.take_notices().unwrap();
    assert!(board.take_notices().is_none());

    board.open().await;
    assert!(!board.toggle_bookmark("a").await);

    assert!(matches!(notices.recv().await, Some(Notice::SearchFailed { .. })));
    assert!(matches!(notices.recv().await, Some(Notice::BookmarkRolledBack { .. })));
}

#[tokio::test(start_paused = true)]
async fn undrained_notices_stay_bounded() {
    let fake = FakeBoard::new();
    let failures = NOTICE_CAPACITY * 2;
    for n in 0..failures {
        fake.bookmark(&format!("job-{n}"), 0, Err(network_error()));
    }
    let mut board = board(&fake);

    for n in 0..failures {
        assert!(!board.toggle_bookmark(&format!("job-{n}")).await);
    }
    assert!(board.bookmarks().snapshot().is_empty());

    let mut notices = board.take_notices().unwrap();
    let mut queued = 0;
    while notices.try_recv().is_ok() {
        queued += 1;
    }
    assert_eq!(queued, NOTICE_CAPACITY);
}

#[tokio::test(start_paused = true)]
async fn dispose_stops_every_component() {
    let fake = FakeBoard::new();
    let board = board(&fake);
    board.dispose();

    board.search().set_query_text("rust");
    assert!(!board.toggle_bookmark("a").await);
    assert!(board.cancel_application("app-1").await.is_err());
    assert!(fake.search_calls().is_empty());
    assert!(fake.bookmark_calls().is_empty());
    assert!(fake.cancel_calls().is_empty());
}
