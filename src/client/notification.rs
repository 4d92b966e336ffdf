use std::collections::VecDeque;

pub const SIGN_IN_FAILED: &str = "Sign in failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
}

/// Transient, dismissable messages shown to the user.
#[derive(Debug, Default)]
pub struct Notifications {
    next_id: u64,
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.queue.push_back(Notification {
            id: self.next_id,
            level,
            message: message.into(),
        });
        self.next_id
    }

    /// Remove a notification. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.id != id);
        self.queue.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_dismiss() {
        let mut notifications = Notifications::new();
        let first = notifications.push(Level::Error, "Invalid credentials");
        let second = notifications.push(Level::Info, "Signed out");

        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications.latest().map(|n| n.id), Some(second));

        assert!(notifications.dismiss(first));
        assert!(!notifications.dismiss(first));
        assert_eq!(
            notifications.iter().map(|n| n.message.as_str()).collect::<Vec<_>>(),
            vec!["Signed out"]
        );
    }
}
