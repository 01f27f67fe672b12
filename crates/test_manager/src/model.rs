//! Test catalog data model and seed content.

use std::collections::BTreeMap;

use casebook::{SuggestionCatalog, SuggestionSet};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub type ItemId = usize;

pub const KEYWORDS: [&str; 9] = [
    "click",
    "type",
    "assert",
    "waitFor",
    "navigate",
    "select",
    "hover",
    "scroll",
    "dragAndDrop",
];

pub const OBJECTS: [&str; 7] = [
    "loginButton",
    "emailInput",
    "passwordInput",
    "submitButton",
    "errorMessage",
    "userMenu",
    "logoutButton",
];

pub const INITIAL_SCRIPT: &str = r##"# Test Case: User Login

Description:
Verify that users can successfully log in with valid credentials

Steps:
1. Navigate to "/login"
2. Type "test@example.com" into "#email"
3. Type "password123" into "#password"
4. Click "Sign In" button
5. Assert URL is "/dashboard"
6. Assert text "Welcome back" is visible

Tags: authentication, smoke-test
Expected Result: User should be logged in and redirected to dashboard"##;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Keyword,
    Function,
    Assertion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Draft,
    Ready,
    Running,
    Passed,
    Failed,
}

impl TestStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStep {
    pub id: ItemId,
    pub kind: StepKind,
    pub action: String,
    pub parameters: BTreeMap<String, String>,
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub steps: Vec<TestStep>,
    pub tags: Vec<String>,
    pub status: TestStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TestCase {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        description: impl Into<String>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
            tags: Vec::new(),
            status: TestStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    fn with_status(mut self, status: TestStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSet {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub test_cases: Vec<TestCase>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TestSet {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        description: impl Into<String>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            test_cases: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn case(&self, id: ItemId) -> Option<&TestCase> {
        self.test_cases.iter().find(|case| case.id == id)
    }
}

/// RFC 3339 rendering used for every stored timestamp.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, time::error::Format> {
    timestamp.format(&Rfc3339)
}

/// The catalog a fresh session starts with.
pub fn mock_catalog(now: OffsetDateTime) -> Vec<TestSet> {
    let mut login = TestSet::new(1, "Login Flow Tests", "Test cases for user authentication", now);
    login.test_cases = vec![
        TestCase::new(1, "Valid Login", "Test successful login with valid credentials", now)
            .with_tags(&["authentication", "smoke-test"])
            .with_status(TestStatus::Ready),
        TestCase::new(2, "Invalid Password", "Test login failure with invalid password", now)
            .with_tags(&["authentication", "negative-test"])
            .with_status(TestStatus::Ready),
    ];
    let registration = TestSet::new(
        2,
        "User Registration",
        "Test cases for new user registration",
        now,
    );
    vec![login, registration]
}

/// Keyword and object candidates offered by the script editor.
pub fn suggestion_catalog() -> SuggestionCatalog {
    SuggestionCatalog::new(SuggestionSet::new(KEYWORDS), SuggestionSet::new(OBJECTS))
}
