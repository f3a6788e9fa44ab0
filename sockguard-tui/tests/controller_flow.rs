//! End-to-end controller flows against the in-memory backend.
//!
//! Requests produced by the controllers are executed through the worker (or
//! its `execute` helper when a test needs to control delivery order), and
//! the responses are folded back in exactly as the binary does.

use std::collections::HashSet;
use std::sync::Arc;

use sockguard_client::mock::sample_sock;
use sockguard_client::{ApiError, MockCall, MockOp, MockSockApi};
use sockguard_core::{Priority, Sock, SockId};
use sockguard_tui::add_form::{AddSockForm, FormPhase};
use sockguard_tui::controller::{Phase, SockListController};
use sockguard_tui::modal::{Modal, ModalKind};
use sockguard_tui::notify::NotificationService;
use sockguard_tui::worker::{execute, spawn_worker, Request, Response};
use tokio::sync::mpsc;

// ============================================================================
// Fixtures
// ============================================================================

/// 25 socks; even ids are clean, odd ids dirty, newer ids created later.
fn inventory() -> Vec<Sock> {
    (0..25)
        .map(|i| {
            let created = format!("2024-01-{:02} 10:00:00", i + 1);
            let color = if i % 3 == 0 { "Черный" } else { "Белый" };
            sample_sock(&format!("s{i:02}"), color, i % 2 == 0, i as u64, &created)
        })
        .collect()
}

fn controller() -> SockListController {
    SockListController::new(10, NotificationService::default())
}

/// Execute `request` immediately and apply its response.
async fn run(api: &MockSockApi, ctl: &mut SockListController, request: Request) {
    let response = execute(api, request).await.expect("not a shutdown request");
    ctl.apply(response);
}

/// Let `f` drive the controller and run whatever request it produces.
async fn step<F>(api: &MockSockApi, ctl: &mut SockListController, f: F)
where
    F: FnOnce(&mut SockListController) -> Option<Request>,
{
    if let Some(request) = f(ctl) {
        run(api, ctl, request).await;
    }
}

fn ids(ctl: &SockListController) -> Vec<String> {
    ctl.list()
        .socks()
        .iter()
        .map(|s| s.id.as_str().to_string())
        .collect()
}

fn load_offsets(api: &MockSockApi) -> Vec<(usize, usize, Priority)> {
    api.calls()
        .into_iter()
        .filter_map(|call| match call {
            MockCall::Load {
                offset,
                limit,
                priority,
                ..
            } => Some((offset, limit, priority)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Pagination and filters
// ============================================================================

#[tokio::test]
async fn test_pages_concatenate_without_duplicates() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();

    step(&api, &mut ctl, |c| c.init()).await;
    assert_eq!(ctl.list().len(), 10);

    step(&api, &mut ctl, |c| c.load_more()).await;
    step(&api, &mut ctl, |c| c.load_more()).await;
    assert_eq!(ctl.list().len(), 25);
    assert!(ctl.is_exhausted());

    let unique: HashSet<String> = ids(&ctl).into_iter().collect();
    assert_eq!(unique.len(), 25);

    // Clean socks come first under the default priority.
    let first_dirty = ctl.list().socks().iter().position(|s| !s.clean).unwrap();
    assert!(ctl.list().socks()[first_dirty..].iter().all(|s| !s.clean));

    // Past the end: an empty page changes nothing.
    step(&api, &mut ctl, |c| c.load_more()).await;
    assert_eq!(ctl.list().len(), 25);
    assert_eq!(ctl.phase(), Phase::Loaded);
}

#[tokio::test]
async fn test_priority_change_restarts_from_zero() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();

    step(&api, &mut ctl, |c| c.init()).await;
    step(&api, &mut ctl, |c| c.load_more()).await;
    let request = ctl.set_priority(Priority::Dirty);
    run(&api, &mut ctl, request).await;

    assert_eq!(
        load_offsets(&api),
        vec![
            (0, 10, Priority::Clean),
            (10, 10, Priority::Clean),
            (0, 10, Priority::Dirty),
        ]
    );
    assert_eq!(ctl.list().len(), 10);
    assert!(!ctl.list().socks()[0].clean);
    assert_eq!(ctl.list().priority(), Priority::Dirty);
}

#[tokio::test]
async fn test_search_resets_and_same_query_is_noop() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    step(&api, &mut ctl, |c| c.search(" черный ")).await;
    assert_eq!(ctl.list().query(), "черный");
    assert_eq!(ctl.list().len(), 9);
    assert!(ctl.list().socks().iter().all(|s| s.color == "Черный"));

    let before = api.load_calls();
    assert!(ctl.search("черный").is_none());
    assert_eq!(api.load_calls(), before);

    let request = ctl.clear_search();
    run(&api, &mut ctl, request).await;
    assert_eq!(ctl.list().query(), "");
    assert_eq!(ctl.list().len(), 10);
}

#[tokio::test]
async fn test_no_matches_gives_empty_list() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();

    step(&api, &mut ctl, |c| c.search("пурпурный")).await;
    assert!(ctl.list().is_empty());
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert!(ctl.notifications().current().is_none());
}

#[tokio::test]
async fn test_late_page_from_old_filter_is_discarded() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();

    // Issue a page under "clean", switch to "dirty" before it is answered.
    let stale = ctl.init().unwrap();
    let fresh = ctl.set_priority(Priority::Dirty);

    // Deliver the fresh answer first, then the stale one.
    let fresh_response = execute(&api, fresh).await.unwrap();
    let stale_response = execute(&api, stale).await.unwrap();
    ctl.apply(fresh_response);
    let after_fresh = ids(&ctl);
    ctl.apply(stale_response);

    assert_eq!(ids(&ctl), after_fresh);
    assert!(ctl.list().socks().iter().take(10).all(|s| !s.clean));
}

#[tokio::test]
async fn test_load_more_ignored_while_in_flight() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();

    let first = ctl.init().unwrap();
    assert!(ctl.load_more().is_none());
    assert!(ctl.load_more().is_none());
    run(&api, &mut ctl, first).await;

    assert_eq!(api.load_calls(), 1);
    assert_eq!(ctl.list().len(), 10);
}

#[tokio::test]
async fn test_failed_page_keeps_list_and_allows_retry() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    api.fail_next(MockOp::Load, ApiError::Network("connection reset".to_string()));
    step(&api, &mut ctl, |c| c.load_more()).await;
    assert_eq!(ctl.phase(), Phase::Error);
    assert_eq!(ctl.list().len(), 10);
    assert!(ctl.notifications().current().is_some());

    step(&api, &mut ctl, |c| c.load_more()).await;
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(ctl.list().len(), 20);
}

// ============================================================================
// Item actions
// ============================================================================

#[tokio::test]
async fn test_toggle_flips_exactly_one_item() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    let before: Vec<bool> = ctl.list().socks().iter().map(|s| s.clean).collect();
    let target = ctl.sock_at(3).unwrap().id.clone();

    step(&api, &mut ctl, |c| c.toggle_clean(&target)).await;

    let after: Vec<bool> = ctl.list().socks().iter().map(|s| s.clean).collect();
    let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
    assert_eq!(changed, vec![3]);
    assert_eq!(ids(&ctl)[3], target.as_str());

    let server = api.socks().into_iter().find(|s| s.id == target).unwrap();
    assert_eq!(server.clean, after[3]);
}

#[tokio::test]
async fn test_toggle_acked_after_reload_is_not_applied_twice() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    let request = ctl.set_priority(Priority::Frequent);
    run(&api, &mut ctl, request).await;

    let target = ctl.sock_at(0).unwrap().id.clone();
    assert!(ctl.list().get(&target).unwrap().clean);

    // The toggle reaches the server before the reload does, but its ack
    // arrives after the reloaded page.
    let toggle = ctl.toggle_clean(&target).unwrap();
    let reload = ctl.reload();
    let toggle_response = execute(&api, toggle).await.unwrap();
    let page_response = execute(&api, reload).await.unwrap();
    ctl.apply(page_response);
    ctl.apply(toggle_response);

    let server = api.socks();
    for sock in ctl.list().socks() {
        let on_server = server.iter().find(|s| s.id == sock.id).unwrap();
        assert_eq!(sock.clean, on_server.clean, "sock {}", sock.id);
    }
    assert!(!ctl.list().get(&target).unwrap().clean);
    assert_eq!(
        ctl.notifications().current().unwrap().message,
        "Marked as dirty"
    );
}

#[tokio::test]
async fn test_toggle_failure_leaves_list() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    let before = ctl.list().clone();
    let target = ctl.sock_at(0).unwrap().id.clone();
    api.fail_next(MockOp::Toggle, ApiError::Http { status: 500 });
    step(&api, &mut ctl, |c| c.toggle_clean(&target)).await;

    assert_eq!(ctl.list(), &before);
    assert_eq!(
        ctl.notifications().current().unwrap().message,
        "Failed to change status"
    );
}

#[tokio::test]
async fn test_delete_confirmed_removes_item() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    let target = ctl.sock_at(2).unwrap().id.clone();
    assert!(ctl.request_delete(&target));
    assert!(matches!(
        ctl.modals().get(ModalKind::ConfirmDelete),
        Some(Modal::ConfirmDelete { id, .. }) if id == &target
    ));

    step(&api, &mut ctl, |c| c.confirm_delete()).await;

    assert_eq!(ctl.list().len(), 9);
    assert!(ctl.list().get(&target).is_none());
    assert!(!ctl.modals().is_open(ModalKind::ConfirmDelete));
    assert!(api.socks().iter().all(|s| s.id != target));
    assert!(ctl.notifications().current().is_some());
}

#[tokio::test]
async fn test_delete_failure_keeps_item() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    let target = ctl.sock_at(0).unwrap().id.clone();
    api.fail_next(
        MockOp::Delete,
        ApiError::Application {
            message: Some("Носок не найден".to_string()),
        },
    );
    ctl.request_delete(&target);
    step(&api, &mut ctl, |c| c.confirm_delete()).await;

    assert_eq!(ctl.list().len(), 10);
    assert_eq!(
        ctl.notifications().current().unwrap().message,
        "Носок не найден"
    );
}

#[tokio::test]
async fn test_cancelled_delete_sends_nothing() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    let target = ctl.sock_at(0).unwrap().id.clone();
    ctl.request_delete(&target);
    ctl.cancel_delete();
    assert!(ctl.confirm_delete().is_none());
    assert!(!api.calls().iter().any(|c| matches!(c, MockCall::Delete(_))));
}

#[tokio::test]
async fn test_wash_history_is_fetched_every_time() {
    let id = SockId::new("s24");
    let api = MockSockApi::with_socks(inventory())
        .with_wash(&id, "2024-02-01 09:00:00")
        .with_wash(&id, "2024-02-03 09:00:00");
    let mut ctl = controller();
    step(&api, &mut ctl, |c| c.init()).await;

    step(&api, &mut ctl, |c| Some(c.show_wash_history(&id))).await;
    match ctl.modals().top() {
        Some(Modal::WashHistory { records, .. }) => {
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].wash_date, "2024-02-03 09:00:00");
        }
        other => panic!("unexpected modal: {other:?}"),
    }

    // A wash in between shows up on the next open.
    step(&api, &mut ctl, |c| c.toggle_clean(&id)).await;
    step(&api, &mut ctl, |c| c.toggle_clean(&id)).await;
    step(&api, &mut ctl, |c| Some(c.show_wash_history(&id))).await;
    match ctl.modals().top() {
        Some(Modal::WashHistory { records, .. }) => assert_eq!(records.len(), 3),
        other => panic!("unexpected modal: {other:?}"),
    }

    let history_calls = api
        .calls()
        .iter()
        .filter(|c| matches!(c, MockCall::History(_)))
        .count();
    assert_eq!(history_calls, 2);
}

#[tokio::test]
async fn test_stats_modal() {
    let api = MockSockApi::with_socks(inventory());
    let mut ctl = controller();

    step(&api, &mut ctl, |c| Some(c.show_stats())).await;
    match ctl.modals().top() {
        Some(Modal::Stats(report)) => {
            assert_eq!(report.stats.total, 25);
            assert_eq!(report.stats.clean, 13);
            assert_eq!(report.stats.dirty, 12);
        }
        other => panic!("unexpected modal: {other:?}"),
    }
}

// ============================================================================
// Worker
// ============================================================================

#[tokio::test]
async fn test_worker_drives_list_and_form() {
    let api = Arc::new(MockSockApi::with_socks(inventory()));
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
    let handle = spawn_worker(Arc::clone(&api), req_rx, resp_tx);

    let mut ctl = controller();
    let mut form = AddSockForm::new(NotificationService::default());

    req_tx.send(ctl.init().unwrap()).unwrap();
    ctl.apply(resp_rx.recv().await.unwrap());
    assert_eq!(ctl.list().len(), 10);

    form.select_color("Зеленый").unwrap();
    for (field, value) in [
        ("style", "Спортивные"),
        ("pattern", "Полоска"),
        ("material", "Бамбук"),
        ("size", "S"),
        ("brand", "Puma"),
    ] {
        form.set(field, value).unwrap();
    }
    req_tx.send(form.submit().unwrap()).unwrap();

    match resp_rx.recv().await.unwrap() {
        Response::SockAdded(result) => form.apply(result),
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(form.phase(), FormPhase::Submitted);
    assert_eq!(api.socks().len(), 26);
    assert_eq!(form.recent().next().unwrap().color, "Зеленый");

    req_tx.send(Request::Shutdown).unwrap();
    handle.await.unwrap();
}
