mod common;

use std::io;
use std::time::Duration;

use common::{created, form, page, replies, FakeBoard, TIMEOUT, TRIPCODE};
use messageboard_frontend::api::{FRONT_PAGE_ENDPOINT, NEW_POST_ENDPOINT, REPLIES_ENDPOINT};
use messageboard_frontend::{BoardApp, ErrorKind, ListChange, Post, SyncState, ViewId};
use pretty_assertions::assert_eq;

fn loaded_front_page(board: &std::sync::Arc<FakeBoard>, ids: &[i64]) -> BoardApp {
    board.respond(FRONT_PAGE_ENDPOINT, &page(ids));
    let mut app = BoardApp::new(board.client());
    app.refresh_front_page();
    assert!(app.wait_until_idle(TIMEOUT));
    app.view_mut(ViewId::FrontPage)
        .unwrap()
        .posts_mut()
        .drain_changes();
    app
}

fn front_ids(app: &BoardApp) -> Vec<i64> {
    app.front_page().posts().ids()
}

#[test]
fn refresh_clears_first_then_fills_in_server_order() {
    let board = FakeBoard::new();
    let mut app = loaded_front_page(&board, &[3, 4]);

    board.respond(FRONT_PAGE_ENDPOINT, &page(&[1, 2]));
    app.refresh_front_page();
    assert_eq!(app.front_page().state(), SyncState::Loading);
    assert!(app.front_page().posts().is_empty());

    assert!(app.wait_until_idle(TIMEOUT));
    assert_eq!(front_ids(&app), vec![1, 2]);
    assert_eq!(app.front_page().state(), SyncState::Idle);
    assert_eq!(
        app.view_mut(ViewId::FrontPage)
            .unwrap()
            .posts_mut()
            .drain_changes(),
        vec![ListChange::Reset, ListChange::Grew { len: 2 }]
    );
}

#[test]
fn failed_refresh_leaves_the_list_empty() {
    let board = FakeBoard::new();
    let mut app = loaded_front_page(&board, &[1, 2]);

    board.respond(FRONT_PAGE_ENDPOINT, r#"{"error":"database is down"}"#);
    app.refresh_front_page();
    assert!(app.wait_until_idle(TIMEOUT));

    assert!(app.front_page().posts().is_empty());
    assert_eq!(
        app.front_page().last_error().map(|e| e.kind()),
        Some(ErrorKind::Server)
    );
    assert_eq!(app.take_notices(), vec!["Error: database is down".to_string()]);
    assert!(app.take_notices().is_empty());
}

#[test]
fn network_failure_is_reported_with_its_kind() {
    let board = FakeBoard::new();
    board.fail(FRONT_PAGE_ENDPOINT, io::ErrorKind::ConnectionRefused);
    let mut app = BoardApp::new(board.client());

    app.refresh_front_page();
    assert!(app.wait_until_idle(TIMEOUT));

    assert_eq!(
        app.front_page().last_error().map(|e| e.kind()),
        Some(ErrorKind::Network)
    );
    assert_eq!(
        app.take_notices(),
        vec!["Error: Something is wrong with the server/network".to_string()]
    );
}

#[test]
fn successful_submit_reloads_the_view() {
    let board = FakeBoard::new();
    let mut app = loaded_front_page(&board, &[1, 2]);
    let generation = app.front_page().generation();

    board.respond(NEW_POST_ENDPOINT, &created(9));
    board.respond(FRONT_PAGE_ENDPOINT, &page(&[9, 1, 2]));
    app.submit_top_level("hello board");
    assert_eq!(app.front_page().state(), SyncState::Submitting);

    assert!(app.wait_until_idle(TIMEOUT));
    assert_eq!(front_ids(&app), vec![9, 1, 2]);
    assert!(app.front_page().generation() > generation);
    assert_eq!(
        app.view_mut(ViewId::FrontPage)
            .unwrap()
            .posts_mut()
            .drain_changes(),
        vec![ListChange::Reset, ListChange::Grew { len: 3 }]
    );

    let requests = board.requests();
    let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, vec!["GET", "POST", "GET"]);
    assert_eq!(
        requests[1].form,
        form(&[("content", "hello board"), ("reply", "-1"), ("tripcode", TRIPCODE)])
    );
    assert!(app.take_notices().is_empty());
}

#[test]
fn rejected_submit_keeps_the_list_and_skips_the_reload() {
    let board = FakeBoard::new();
    let mut app = loaded_front_page(&board, &[1, 2]);
    let generation = app.front_page().generation();

    board.respond(NEW_POST_ENDPOINT, r#"{"error":"rate limited"}"#);
    app.submit_top_level("spam");
    assert!(app.wait_until_idle(TIMEOUT));

    assert_eq!(front_ids(&app), vec![1, 2]);
    assert_eq!(app.front_page().generation(), generation);
    assert_eq!(app.front_page().state(), SyncState::Idle);
    assert_eq!(
        app.front_page().last_error().map(|e| e.kind()),
        Some(ErrorKind::Server)
    );
    assert_eq!(app.take_notices(), vec!["Error: rate limited".to_string()]);
    assert!(app
        .view_mut(ViewId::FrontPage)
        .unwrap()
        .posts_mut()
        .drain_changes()
        .is_empty());
    assert_eq!(board.requests().len(), 2);
}

#[test]
fn blank_content_is_rejected_locally() {
    let board = FakeBoard::new();
    let mut app = loaded_front_page(&board, &[1]);

    app.submit_top_level("   \n");
    assert_eq!(app.front_page().state(), SyncState::Idle);
    assert_eq!(
        app.front_page().last_error().map(|e| e.kind()),
        Some(ErrorKind::Validation)
    );
    assert_eq!(front_ids(&app), vec![1]);
    assert_eq!(board.requests().len(), 1);
}

#[test]
fn rapid_refreshes_do_not_duplicate_posts() {
    let board = FakeBoard::new();
    board.respond(FRONT_PAGE_ENDPOINT, &page(&[1, 2]));
    board.hold();
    let mut app = BoardApp::new(board.client());

    // All three workers are still inside the board when the later refreshes
    // cancel the earlier ones.
    app.refresh_front_page();
    app.refresh_front_page();
    app.refresh_front_page();
    assert!(app.front_page().posts().is_empty());
    assert_eq!(app.front_page().state(), SyncState::Loading);

    board.release();
    assert!(app.wait_until_idle(TIMEOUT));
    assert_eq!(front_ids(&app), vec![1, 2]);

    // Cancelled workers never send, so nothing else arrives.
    assert_eq!(app.wait_for_messages(Duration::from_millis(200)), 0);
    assert_eq!(front_ids(&app), vec![1, 2]);
}

#[test]
fn thread_view_loads_replies_and_replies_to_its_post() {
    let board = FakeBoard::new();
    let mut app = loaded_front_page(&board, &[4]);
    let op: Post = app.front_page().posts().get(0).cloned().unwrap();

    board.respond(REPLIES_ENDPOINT, &replies(&[10, 11], 4));
    app.open_thread(op.clone());
    assert!(app.wait_until_idle(TIMEOUT));

    let thread = app.thread().unwrap();
    assert_eq!(thread.id(), ViewId::Thread(4));
    assert_eq!(thread.original_post(), Some(&op));
    assert_eq!(thread.posts().ids(), vec![10, 11]);

    board.respond(NEW_POST_ENDPOINT, &created(12));
    board.respond(REPLIES_ENDPOINT, &replies(&[10, 11, 12], 4));
    app.submit_reply("me too");
    assert!(app.wait_until_idle(TIMEOUT));

    assert_eq!(app.thread().unwrap().posts().ids(), vec![10, 11, 12]);
    assert_eq!(front_ids(&app), vec![4]);
    let post = board
        .requests()
        .into_iter()
        .find(|r| r.method == "POST")
        .unwrap();
    assert_eq!(
        post.form,
        form(&[("content", "me too"), ("reply", "4"), ("tripcode", TRIPCODE)])
    );
}

#[test]
fn reply_without_open_thread_is_rejected() {
    let board = FakeBoard::new();
    let mut app = BoardApp::new(board.client());

    app.submit_reply("orphan");
    assert_eq!(app.take_notices(), vec!["Error: no thread is open".to_string()]);
    assert!(board.requests().is_empty());
}

#[test]
fn closing_a_thread_discards_its_pending_load() {
    let board = FakeBoard::new();
    let mut app = loaded_front_page(&board, &[4]);
    let op = app.front_page().posts().get(0).cloned().unwrap();

    board.respond(REPLIES_ENDPOINT, &replies(&[10], 4));
    app.open_thread(op);
    app.close_thread();
    app.wait_for_messages(Duration::from_millis(200));

    assert!(app.thread().is_none());
    assert!(!app.is_busy());
    assert_eq!(front_ids(&app), vec![4]);
}
