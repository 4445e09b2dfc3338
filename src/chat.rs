//! Chat transcript: an append-only log plus one replaceable status slot.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Transient "thinking" line mirrored from the server.
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub citations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Transcript {
    log: Vec<ChatMessage>,
    status: Option<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> u64 {
        self.push(Role::User, content.into(), vec![])
    }

    pub fn push_assistant(&mut self, content: impl Into<String>, citations: Vec<String>) -> u64 {
        self.push(Role::Assistant, content.into(), citations)
    }

    /// Show `content` in the status slot, replacing whatever was there.
    pub fn set_status(&mut self, content: impl Into<String>) {
        let content = content.into();
        match self.status.as_mut() {
            Some(status) => {
                status.content = content;
                status.timestamp = Utc::now();
            }
            None => {
                let id = self.allocate_id();
                self.status = Some(ChatMessage {
                    id,
                    role: Role::Status,
                    content,
                    citations: vec![],
                    timestamp: Utc::now(),
                });
            }
        }
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn status(&self) -> Option<&ChatMessage> {
        self.status.as_ref()
    }

    /// Messages in display order, the status line (if any) last.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.log.iter().chain(self.status())
    }

    pub fn len(&self) -> usize {
        self.log.len() + usize::from(self.status.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, role: Role, content: String, citations: Vec<String>) -> u64 {
        let id = self.allocate_id();
        self.log.push(ChatMessage {
            id,
            role,
            content,
            citations,
            timestamp: Utc::now(),
        });
        id
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(transcript: &Transcript) -> Vec<&str> {
        transcript.messages().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn test_status_is_replaced_in_place() {
        let mut transcript = Transcript::new();
        transcript.push_user("create a customer");
        transcript.set_status("Thinking...");
        let status_id = transcript.status().unwrap().id;

        transcript.set_status("Looking up Stripe docs");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.status().unwrap().id, status_id);
        assert_eq!(contents(&transcript), vec!["create a customer", "Looking up Stripe docs"]);
    }

    #[test]
    fn test_status_stays_last() {
        let mut transcript = Transcript::new();
        transcript.set_status("Thinking...");
        transcript.push_user("hello");
        let roles: Vec<Role> = transcript.messages().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Status]);
    }

    #[test]
    fn test_clear_status() {
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        transcript.set_status("Thinking...");
        transcript.clear_status();
        transcript.push_assistant("done", vec!["https://docs".to_string()]);
        assert_eq!(contents(&transcript), vec!["hi", "done"]);
        assert!(transcript.status().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut transcript = Transcript::new();
        let a = transcript.push_user("a");
        transcript.set_status("s");
        let b = transcript.push_assistant("b", vec![]);
        let status = transcript.status().unwrap().id;
        assert!(a != b && b != status && a != status);
        assert!(!transcript.is_empty());
    }
}
