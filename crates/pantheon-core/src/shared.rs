//! Shared types: cycle history records, conversation messages, and caller-owned sessions.
//!
//! The core never persists any of these. Callers load them from their own store, hand them
//! to the engine per turn, and persist whatever comes back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::orchestrator::{Emotion, PersonaId};

fn default_cycle_length() -> u32 {
    28
}

fn default_period_length() -> u32 {
    5
}

/// One logged period start. History is append-only and ordered oldest → newest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    #[serde(default)]
    pub id: String,
    pub start_date: NaiveDate,
    #[serde(default = "default_cycle_length", alias = "cycle_length")]
    pub cycle_length_days: u32,
    #[serde(default = "default_period_length", alias = "period_length")]
    pub period_length_days: u32,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CycleRecord {
    /// New record with a fresh id and default 28/5 lengths.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            id: format!("cycle_{}", uuid::Uuid::new_v4()),
            start_date,
            cycle_length_days: default_cycle_length(),
            period_length_days: default_period_length(),
            symptoms: Vec::new(),
            notes: None,
        }
    }

    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lengths(mut self, cycle_length_days: u32, period_length_days: u32) -> Self {
        self.cycle_length_days = cycle_length_days;
        self.period_length_days = period_length_days;
        self
    }
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single conversation turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "goddessId")]
    pub persona_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_emotion: Option<Emotion>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            role: Role::User,
            content: content.into(),
            persona_id: None,
            detected_emotion: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, persona: PersonaId, emotion: Emotion) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            role: Role::Assistant,
            content: content.into(),
            persona_id: Some(persona.as_str().to_string()),
            detected_emotion: Some(emotion),
            timestamp: Utc::now(),
        }
    }
}

/// Caller-owned conversation. The engine only reads its trailing messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("session_{}", uuid::Uuid::new_v4()),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a turn. Turns are never reordered or edited.
    pub fn append(&mut self, message: Message) {
        self.updated_at = message.timestamp.max(self.updated_at);
        self.messages.push(message);
    }

    /// The last `n` messages in conversation order.
    pub fn trailing(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_returns_most_recent_in_order() {
        let mut session = Session::new("Evening check-in");
        for i in 0..8 {
            session.append(Message::user(format!("turn {}", i)));
        }
        let tail = session.trailing(6);
        assert_eq!(tail.len(), 6);
        assert_eq!(tail[0].content, "turn 2");
        assert_eq!(tail[5].content, "turn 7");
        assert_eq!(session.trailing(20).len(), 8);
    }

    #[test]
    fn cycle_record_deserializes_with_defaults() {
        let json = r#"{"startDate":"2026-03-01","symptoms":["Cramps"]}"#;
        let record: CycleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.cycle_length_days, 28);
        assert_eq!(record.period_length_days, 5);
        assert_eq!(record.symptoms, vec!["Cramps"]);
        assert!(record.notes.is_none());
    }

    #[test]
    fn message_accepts_legacy_goddess_id() {
        let json = r#"{"role":"assistant","content":"hi","goddessId":"nurturing"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.persona_id.as_deref(), Some("nurturing"));
    }
}
