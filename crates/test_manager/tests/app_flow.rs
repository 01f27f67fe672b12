use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use test_manager::app::{
    App, BulkAction, CreateKind, EditorCommand, HostOps, ListPane, NavTarget, Pane,
};
use test_manager::model::{mock_catalog, TestStatus};
use time::OffsetDateTime;

const NOTIFY_AFTER: Duration = Duration::from_millis(3000);

#[derive(Default)]
struct HostSpy {
    render_requests: usize,
    deadlines: Vec<Instant>,
    stop_requests: usize,
}

impl HostOps for HostSpy {
    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn request_render_at(&mut self, deadline: Instant) {
        self.deadlines.push(deadline);
    }

    fn request_stop(&mut self) {
        self.stop_requests += 1;
    }
}

fn app() -> App {
    App::with_test_sets(mock_catalog(OffsetDateTime::UNIX_EPOCH), NOTIFY_AFTER)
}

fn message(app: &App, pane: Pane) -> Option<&str> {
    app.notification(pane).map(|note| note.message())
}

#[test]
fn bulk_actions_without_checked_rows_ask_for_a_selection() {
    let mut app = app();
    let mut host = HostSpy::default();
    let now = Instant::now();

    app.run_bulk_action(ListPane::TestSets, BulkAction::Delete, now, &mut host);
    assert_eq!(message(&app, Pane::Sidebar), Some("Please select a test set"));

    app.select_test_set(1, &mut host);
    app.run_bulk_action(ListPane::TestCases, BulkAction::Execute, now, &mut host);
    assert_eq!(message(&app, Pane::Cases), Some("Please select a test case"));
    assert_eq!(host.deadlines, vec![now + NOTIFY_AFTER, now + NOTIFY_AFTER]);
}

#[test]
fn bulk_action_messages_describe_checked_rows() {
    let mut app = app();
    let mut host = HostSpy::default();
    let now = Instant::now();
    app.toggle_checked(ListPane::TestSets, 1, &mut host);
    app.toggle_checked(ListPane::TestSets, 2, &mut host);

    let cases = [
        (BulkAction::Execute, "This will run the selected test set(s)"),
        (BulkAction::Stop, "This will stop execution of the selected test set(s)"),
        (BulkAction::Delete, "Deleting 2 test set(s)"),
        (BulkAction::Lock, "This will lock the selected test set(s) from editing"),
    ];
    for (action, expected) in cases {
        app.run_bulk_action(ListPane::TestSets, action, now, &mut host);
        assert_eq!(message(&app, Pane::Sidebar), Some(expected));
    }
    assert_eq!(app.test_sets.len(), 2);

    app.toggle_checked(ListPane::TestSets, 2, &mut host);
    assert!(!app.is_checked(ListPane::TestSets, 2));
    app.run_bulk_action(ListPane::TestSets, BulkAction::Delete, now, &mut host);
    assert_eq!(message(&app, Pane::Sidebar), Some("Deleting 1 test set(s)"));
}

#[test]
fn case_actions_need_a_selected_set() {
    let mut app = app();
    let mut host = HostSpy::default();
    let now = Instant::now();

    app.toggle_checked(ListPane::TestCases, 1, &mut host);
    app.run_bulk_action(ListPane::TestCases, BulkAction::Lock, now, &mut host);
    assert!(!app.is_checked(ListPane::TestCases, 1));
    assert_eq!(app.notification(Pane::Cases), None);

    app.select_test_set(1, &mut host);
    app.toggle_checked(ListPane::TestCases, 2, &mut host);
    app.run_bulk_action(ListPane::TestCases, BulkAction::Lock, now, &mut host);
    assert_eq!(
        message(&app, Pane::Cases),
        Some("This will lock the selected test case(s) from editing")
    );

    // Switching sets starts a fresh case selection.
    app.select_test_set(2, &mut host);
    assert!(!app.is_checked(ListPane::TestCases, 2));
}

#[test]
fn notifications_expire_per_pane() {
    let mut app = app();
    let mut host = HostSpy::default();
    let now = Instant::now();

    app.open_nav(NavTarget::CommitToGit, now, &mut host);
    app.run_editor_command(
        EditorCommand::Save,
        now + Duration::from_millis(1000),
        &mut host,
    );
    assert_eq!(message(&app, Pane::Sidebar), Some("Commit to Git is not available yet"));
    assert_eq!(message(&app, Pane::Editor), Some("Save is not available yet"));

    assert!(!app.expire_notifications(now + Duration::from_millis(2999)));
    assert!(app.expire_notifications(now + NOTIFY_AFTER));
    assert_eq!(app.notification(Pane::Sidebar), None);
    assert_eq!(message(&app, Pane::Editor), Some("Save is not available yet"));

    assert!(app.expire_notifications(now + Duration::from_millis(4000)));
    assert_eq!(app.notification(Pane::Editor), None);
}

#[test]
fn next_expiry_tracks_the_earliest_live_notification() {
    let mut app = app();
    let mut host = HostSpy::default();
    let now = Instant::now();
    assert_eq!(app.next_expiry(), None);

    app.open_nav(NavTarget::Settings, now, &mut host);
    app.run_editor_command(EditorCommand::RunTests, now + Duration::from_millis(500), &mut host);
    assert_eq!(app.next_expiry(), Some(now + NOTIFY_AFTER));

    // A replacement moves that pane's deadline later.
    app.open_nav(NavTarget::TestRunner, now + Duration::from_millis(1000), &mut host);
    assert_eq!(app.next_expiry(), Some(now + Duration::from_millis(3500)));

    app.expire_notifications(now + Duration::from_millis(3500));
    assert_eq!(app.next_expiry(), Some(now + Duration::from_millis(4000)));
}

#[test]
fn creating_a_test_set_uses_default_name_and_selects_it() {
    let mut app = app();
    let mut host = HostSpy::default();
    let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);

    app.open_create_dialog(CreateKind::TestSet, &mut host);
    assert_eq!(app.dialog.as_ref().map(|dialog| dialog.kind), Some(CreateKind::TestSet));
    assert_eq!(app.confirm_dialog(now, &mut host), Some(3));

    let created = app.selected_test_set().expect("new set selected");
    assert_eq!(created.name, "New Test Set 3");
    assert_eq!(created.description, "Description of the new test set");
    assert!(created.test_cases.is_empty());
    assert_eq!(created.created_at, now);
    assert!(app.dialog.is_none());

    app.open_create_dialog(CreateKind::TestSet, &mut host);
    app.set_dialog_name("Checkout");
    assert_eq!(app.confirm_dialog(now, &mut host), Some(4));
    assert_eq!(app.test_sets[3].name, "Checkout");
}

#[test]
fn creating_a_test_case_requires_a_selected_set() {
    let mut app = app();
    let mut host = HostSpy::default();
    let now = OffsetDateTime::UNIX_EPOCH;

    app.open_create_dialog(CreateKind::TestCase, &mut host);
    assert!(app.dialog.is_none());
    assert_eq!(app.confirm_dialog(now, &mut host), None);

    app.select_test_set(1, &mut host);
    app.open_create_dialog(CreateKind::TestCase, &mut host);
    assert_eq!(app.confirm_dialog(now, &mut host), Some(3));

    let case = app.selected_test_case().expect("new case selected");
    assert_eq!(case.name, "New Test Case 3");
    assert_eq!(case.description, "Description of the new test case");
    assert_eq!(case.status, TestStatus::Draft);
    assert!(case.steps.is_empty());
    assert!(case.tags.is_empty());
    assert_eq!(app.test_sets[0].test_cases.len(), 3);
}

#[test]
fn cancel_discards_the_dialog() {
    let mut app = app();
    let mut host = HostSpy::default();

    app.open_create_dialog(CreateKind::TestSet, &mut host);
    app.set_dialog_name("Draft name");
    app.cancel_dialog(&mut host);
    assert!(app.dialog.is_none());
    assert_eq!(app.test_sets.len(), 2);
}

#[test]
fn selecting_unknown_items_is_ignored() {
    let mut app = app();
    let mut host = HostSpy::default();

    app.select_test_set(9, &mut host);
    assert_eq!(app.selected_set, None);
    app.select_test_case(1, &mut host);
    assert_eq!(app.selected_case, None);

    app.select_test_set(1, &mut host);
    app.select_test_case(2, &mut host);
    assert_eq!(
        app.selected_test_case().map(|case| case.name.as_str()),
        Some("Invalid Password")
    );
    assert_eq!(host.render_requests, 2);
}

#[test]
fn quit_requests_stop() {
    let mut app = app();
    let mut host = HostSpy::default();
    app.on_quit(&mut host);
    assert!(app.should_exit);
    assert_eq!(host.stop_requests, 1);
}
