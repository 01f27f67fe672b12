//! Transient notification line.

use std::time::{Duration, Instant};

use crate::core::component::Component;
use crate::core::text::utils::{truncate_to_width, yellow};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    message: String,
    expires_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: now + ttl,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl Component for Notification {
    fn render(&mut self, width: usize) -> Vec<String> {
        let text = truncate_to_width(&format!("● {}", self.message), width, "…", false);
        vec![yellow(&text)]
    }
}

#[cfg(test)]
mod tests {
    use super::Notification;
    use crate::core::component::Component;
    use crate::core::text::width::strip_ansi;
    use std::time::{Duration, Instant};

    #[test]
    fn expires_at_deadline() {
        let now = Instant::now();
        let note = Notification::new("Saved", now, Duration::from_millis(3000));
        assert!(!note.is_expired(now + Duration::from_millis(2999)));
        assert!(note.is_expired(now + Duration::from_millis(3000)));
    }

    #[test]
    fn renders_single_truncated_line() {
        let mut note =
            Notification::new("Please select a test set", Instant::now(), Duration::ZERO);
        let lines = note.render(10);
        assert_eq!(lines.len(), 1);
        assert_eq!(strip_ansi(&lines[0]), "● Please …");
    }
}
