//! UI-agnostic chat message types
//!
//! Shared by every front-end; nothing here depends on a UI framework.

use serde::{Deserialize, Serialize};

use crate::resolver::{MessageBody, MessageKind, QuickReply, ResponseDescriptor};

/// A message in the visa-assistant conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub body: MessageBody,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<QuickReply>,
}

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            body: MessageBody::Text(text.into()),
            replies: Vec::new(),
        }
    }

    pub fn bot(response: ResponseDescriptor) -> Self {
        Self {
            sender: Sender::Bot,
            body: response.body,
            replies: response.replies,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }
}
