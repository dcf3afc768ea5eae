use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

const TOAST_LIFETIME_MS: i64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub variant: Variant,
    pub message: String,
    pub details: Option<String>,
    pub code: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Dismissible notifications; each one disappears on its own after five
/// seconds.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    items: Vec<Toast>,
}

impl Toasts {
    pub fn error(&mut self, message: impl Into<String>, details: Option<String>) -> u64 {
        self.push_at(Utc::now(), Variant::Error, message.into(), details, None)
    }

    pub fn success(&mut self, message: impl Into<String>, details: Option<String>) -> u64 {
        self.push_at(Utc::now(), Variant::Success, message.into(), details, None)
    }

    pub fn push_at(
        &mut self,
        now: DateTime<Utc>,
        variant: Variant,
        message: String,
        details: Option<String>,
        code: Option<String>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Toast {
            id,
            variant,
            message,
            details,
            code,
            expires_at: now + Duration::milliseconds(TOAST_LIFETIME_MS),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|toast| toast.id != id);
        self.items.len() != before
    }

    pub fn active(&mut self) -> Vec<Toast> {
        self.active_at(Utc::now())
    }

    /// Drops expired toasts and returns the rest, oldest first.
    pub fn active_at(&mut self, now: DateTime<Utc>) -> Vec<Toast> {
        self.items.retain(|toast| toast.expires_at > now);
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn toasts_expire_after_five_seconds() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut toasts = Toasts::default();
        toasts.push_at(start, Variant::Error, "boom".to_string(), None, None);
        toasts.push_at(
            start + Duration::seconds(3),
            Variant::Success,
            "saved".to_string(),
            Some("Welcome".to_string()),
            None,
        );

        assert_eq!(toasts.active_at(start + Duration::milliseconds(4999)).len(), 2);
        let remaining = toasts.active_at(start + Duration::seconds(5));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "saved");
        assert!(toasts.active_at(start + Duration::seconds(8)).is_empty());
    }

    #[test]
    fn dismiss_removes_only_that_toast() {
        let mut toasts = Toasts::default();
        let first = toasts.error("one", None);
        let second = toasts.error("two", None);
        assert_ne!(first, second);
        assert!(toasts.dismiss(first));
        assert!(!toasts.dismiss(first));
        let active = toasts.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second);
    }
}
