use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use casebook::Notification;
use time::OffsetDateTime;
use tracing::info;

use crate::model::{mock_catalog, ItemId, TestCase, TestSet};

/// Pane that owns keyboard focus and a notification slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Sidebar,
    Cases,
    Editor,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Sidebar, Pane::Cases, Pane::Editor];

    pub fn next(self) -> Self {
        match self {
            Self::Sidebar => Self::Cases,
            Self::Cases => Self::Editor,
            Self::Editor => Self::Sidebar,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Sidebar => Self::Editor,
            Self::Cases => Self::Sidebar,
            Self::Editor => Self::Cases,
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Sidebar => 0,
            Self::Cases => 1,
            Self::Editor => 2,
        }
    }
}

/// The two checkbox lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPane {
    TestSets,
    TestCases,
}

impl ListPane {
    fn noun(self) -> &'static str {
        match self {
            Self::TestSets => "test set",
            Self::TestCases => "test case",
        }
    }
}

impl From<ListPane> for Pane {
    fn from(pane: ListPane) -> Self {
        match pane {
            ListPane::TestSets => Pane::Sidebar,
            ListPane::TestCases => Pane::Cases,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Execute,
    Stop,
    Delete,
    Lock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    TestSet,
    TestCase,
}

impl CreateKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::TestSet => "Create New Test Set",
            Self::TestCase => "Create New Test Case",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::TestSet => "Enter test set name",
            Self::TestCase => "Enter test case name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: CreateKind,
    pub name: String,
}

/// Sidebar navigation entries without a backing feature yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    TestRunner,
    CommitToGit,
    RunJenkinsBuild,
    Settings,
}

impl NavTarget {
    pub const ALL: [NavTarget; 4] = [
        NavTarget::TestRunner,
        NavTarget::CommitToGit,
        NavTarget::RunJenkinsBuild,
        NavTarget::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TestRunner => "Test Runner",
            Self::CommitToGit => "Commit to Git",
            Self::RunJenkinsBuild => "Run Jenkins Build",
            Self::Settings => "Settings",
        }
    }
}

/// Editor toolbar commands without a backing feature yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    RunTests,
    Save,
}

impl EditorCommand {
    pub fn label(self) -> &'static str {
        match self {
            Self::RunTests => "Run Tests",
            Self::Save => "Save",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub test_sets: Vec<TestSet>,
    pub selected_set: Option<ItemId>,
    pub selected_case: Option<ItemId>,
    pub dialog: Option<Dialog>,
    pub should_exit: bool,
    checked_sets: BTreeSet<ItemId>,
    checked_cases: BTreeSet<ItemId>,
    notifications: [Option<Notification>; 3],
    notify_after: Duration,
}

pub trait HostOps {
    fn request_render(&mut self);
    fn request_render_at(&mut self, deadline: Instant);
    fn request_stop(&mut self);
}

impl App {
    /// Session seeded with the built-in catalog.
    pub fn new(notify_after: Duration) -> Self {
        Self::with_test_sets(mock_catalog(OffsetDateTime::now_utc()), notify_after)
    }

    pub fn with_test_sets(test_sets: Vec<TestSet>, notify_after: Duration) -> Self {
        Self {
            test_sets,
            selected_set: None,
            selected_case: None,
            dialog: None,
            should_exit: false,
            checked_sets: BTreeSet::new(),
            checked_cases: BTreeSet::new(),
            notifications: [None, None, None],
            notify_after,
        }
    }

    pub fn selected_test_set(&self) -> Option<&TestSet> {
        let id = self.selected_set?;
        self.test_sets.iter().find(|set| set.id == id)
    }

    pub fn selected_test_case(&self) -> Option<&TestCase> {
        let id = self.selected_case?;
        self.selected_test_set()?.case(id)
    }

    pub fn is_checked(&self, pane: ListPane, id: ItemId) -> bool {
        self.checked(pane).contains(&id)
    }

    pub fn notification(&self, pane: Pane) -> Option<&Notification> {
        self.notifications[pane.slot()].as_ref()
    }

    pub fn select_test_set(&mut self, id: ItemId, host: &mut dyn HostOps) {
        if !self.test_sets.iter().any(|set| set.id == id) {
            return;
        }
        if self.selected_set != Some(id) {
            // Case ids are only unique within a set.
            self.selected_case = None;
            self.checked_cases.clear();
        }
        self.selected_set = Some(id);
        host.request_render();
    }

    pub fn select_test_case(&mut self, id: ItemId, host: &mut dyn HostOps) {
        let exists = self
            .selected_test_set()
            .is_some_and(|set| set.case(id).is_some());
        if !exists {
            return;
        }
        self.selected_case = Some(id);
        host.request_render();
    }

    pub fn toggle_checked(&mut self, pane: ListPane, id: ItemId, host: &mut dyn HostOps) {
        if pane == ListPane::TestCases && self.selected_set.is_none() {
            return;
        }
        let checked = self.checked_mut(pane);
        if !checked.remove(&id) {
            checked.insert(id);
        }
        host.request_render();
    }

    /// Report what a toolbar action would do to the checked rows.
    ///
    /// No data changes; the pane's notification slot carries the message.
    pub fn run_bulk_action(
        &mut self,
        pane: ListPane,
        action: BulkAction,
        now: Instant,
        host: &mut dyn HostOps,
    ) {
        if pane == ListPane::TestCases && self.selected_set.is_none() {
            return;
        }
        let count = self.checked(pane).len();
        let noun = pane.noun();
        let message = if count == 0 {
            format!("Please select a {noun}")
        } else {
            match action {
                BulkAction::Execute => format!("This will run the selected {noun}(s)"),
                BulkAction::Stop => format!("This will stop execution of the selected {noun}(s)"),
                BulkAction::Delete => format!("Deleting {count} {noun}(s)"),
                BulkAction::Lock => format!("This will lock the selected {noun}(s) from editing"),
            }
        };
        info!(?pane, ?action, count, "bulk action");
        self.notify(pane.into(), message, now, host);
    }

    pub fn open_create_dialog(&mut self, kind: CreateKind, host: &mut dyn HostOps) {
        if kind == CreateKind::TestCase && self.selected_set.is_none() {
            return;
        }
        self.dialog = Some(Dialog {
            kind,
            name: String::new(),
        });
        host.request_render();
    }

    pub fn set_dialog_name(&mut self, name: impl Into<String>) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.name = name.into();
        }
    }

    pub fn cancel_dialog(&mut self, host: &mut dyn HostOps) {
        if self.dialog.take().is_some() {
            host.request_render();
        }
    }

    /// Create the item described by the open dialog and select it.
    ///
    /// Returns the new item's id. A test case dialog without a selected set
    /// stays open and creates nothing.
    pub fn confirm_dialog(
        &mut self,
        now: OffsetDateTime,
        host: &mut dyn HostOps,
    ) -> Option<ItemId> {
        let kind = self.dialog.as_ref()?.kind;
        let created = match kind {
            CreateKind::TestSet => Some(self.create_test_set(now)),
            CreateKind::TestCase => self.create_test_case(now),
        }?;
        self.dialog = None;
        host.request_render();
        Some(created)
    }

    pub fn open_nav(&mut self, target: NavTarget, now: Instant, host: &mut dyn HostOps) {
        let message = format!("{} is not available yet", target.label());
        self.notify(Pane::Sidebar, message, now, host);
    }

    pub fn run_editor_command(
        &mut self,
        command: EditorCommand,
        now: Instant,
        host: &mut dyn HostOps,
    ) {
        let message = format!("{} is not available yet", command.label());
        self.notify(Pane::Editor, message, now, host);
    }

    /// Show `message` in `pane`, replacing what was there.
    pub fn notify(
        &mut self,
        pane: Pane,
        message: impl Into<String>,
        now: Instant,
        host: &mut dyn HostOps,
    ) {
        let notification = Notification::new(message, now, self.notify_after);
        let deadline = notification.expires_at();
        self.notifications[pane.slot()] = Some(notification);
        host.request_render();
        host.request_render_at(deadline);
    }

    /// Earliest deadline among the notifications still showing.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.notifications
            .iter()
            .flatten()
            .map(Notification::expires_at)
            .min()
    }

    /// Drop notifications whose deadline has passed. Returns whether any were
    /// removed.
    pub fn expire_notifications(&mut self, now: Instant) -> bool {
        let mut removed = false;
        for slot in &mut self.notifications {
            if slot.as_ref().is_some_and(|note| note.is_expired(now)) {
                *slot = None;
                removed = true;
            }
        }
        removed
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        self.should_exit = true;
        host.request_stop();
    }

    fn create_test_set(&mut self, now: OffsetDateTime) -> ItemId {
        let id = self.test_sets.len() + 1;
        let name = self
            .dialog_name()
            .unwrap_or_else(|| format!("New Test Set {id}"));
        info!(id, name = %name, "test set created");
        self.test_sets
            .push(TestSet::new(id, name, "Description of the new test set", now));
        self.selected_set = Some(id);
        self.selected_case = None;
        self.checked_cases.clear();
        id
    }

    fn create_test_case(&mut self, now: OffsetDateTime) -> Option<ItemId> {
        let set_id = self.selected_set?;
        let name = self.dialog_name();
        let set = self.test_sets.iter_mut().find(|set| set.id == set_id)?;
        let id = set.test_cases.len() + 1;
        let name = name.unwrap_or_else(|| format!("New Test Case {id}"));
        info!(set_id, id, name = %name, "test case created");
        set.test_cases
            .push(TestCase::new(id, name, "Description of the new test case", now));
        set.updated_at = now;
        self.selected_case = Some(id);
        Some(id)
    }

    fn dialog_name(&self) -> Option<String> {
        self.dialog
            .as_ref()
            .map(|dialog| dialog.name.clone())
            .filter(|name| !name.is_empty())
    }

    fn checked(&self, pane: ListPane) -> &BTreeSet<ItemId> {
        match pane {
            ListPane::TestSets => &self.checked_sets,
            ListPane::TestCases => &self.checked_cases,
        }
    }

    fn checked_mut(&mut self, pane: ListPane) -> &mut BTreeSet<ItemId> {
        match pane {
            ListPane::TestSets => &mut self.checked_sets,
            ListPane::TestCases => &mut self.checked_cases,
        }
    }
}
