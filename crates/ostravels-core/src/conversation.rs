//! Conversation orchestration: user input in, paced bot replies out.
//!
//! Bot replies are revealed after a delay to look like typing. Each turn
//! (user echo, delay, bot reply) runs to completion before the next turn
//! starts, so replies are always appended in submission order. Time is
//! passed in explicitly; the caller drives reveals with [`Conversation::poll`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::resolver::{QuickReply, Resolver, ResponseDescriptor};
use crate::state::{ChatMessage, Sender};

pub const DEFAULT_GREETING_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1200);

/// Text resolved to produce the opening greeting
pub const GREETING_TRIGGER: &str = "hello";

/// How long the bot "types" before each reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub greeting_delay: Duration,
    pub reply_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            greeting_delay: DEFAULT_GREETING_DELAY,
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }
}

impl Pacing {
    pub fn instant() -> Self {
        Self {
            greeting_delay: Duration::ZERO,
            reply_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug)]
struct PendingTurn {
    // Taken when the turn starts
    echo: Option<String>,
    reply: ResponseDescriptor,
    delay: Duration,
    // Set when the turn starts
    due: Option<Instant>,
}

#[derive(Debug)]
pub struct Conversation {
    resolver: Resolver,
    pacing: Pacing,
    messages: Vec<ChatMessage>,
    pending: VecDeque<PendingTurn>,
}

impl Conversation {
    pub fn new(resolver: Resolver, pacing: Pacing) -> Self {
        Self {
            resolver,
            pacing,
            messages: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a bot reply is scheduled but not yet revealed
    pub fn is_composing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.pending.is_empty()
    }

    /// When the next pending reply becomes visible
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().and_then(|turn| turn.due)
    }

    /// Quick replies of the latest message, if the bot sent it
    pub fn quick_replies(&self) -> &[QuickReply] {
        match self.messages.last() {
            Some(msg) if msg.sender == Sender::Bot => &msg.replies,
            _ => &[],
        }
    }

    /// Schedule the greeting if the conversation has not started yet.
    pub fn open(&mut self, now: Instant) -> bool {
        if !self.is_empty() {
            return false;
        }

        let reply = self.resolver.resolve(GREETING_TRIGGER);
        debug!("Opening conversation with greeting");
        self.enqueue(
            PendingTurn {
                echo: None,
                reply,
                delay: self.pacing.greeting_delay,
                due: None,
            },
            now,
        );
        true
    }

    /// Submit typed text. Blank input is ignored.
    pub fn submit(&mut self, raw_text: &str, now: Instant) -> bool {
        if raw_text.trim().is_empty() {
            return false;
        }

        let reply = self.resolver.resolve(raw_text);
        self.queue_turn(raw_text.to_string(), reply, now);
        true
    }

    /// Submit a quick reply: `label` is echoed, `value` is resolved.
    pub fn select_quick_reply(&mut self, label: &str, value: &str, now: Instant) -> bool {
        let echo = if label.is_empty() { value } else { label };
        let key = if value.is_empty() { label } else { value };
        if echo.trim().is_empty() {
            return false;
        }

        let reply = self.resolver.resolve(key);
        self.queue_turn(echo.to_string(), reply, now);
        true
    }

    /// Reveal every reply that is due. Returns how many were appended.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut revealed = 0;

        while let Some(due) = self.next_due() {
            if due > now {
                break;
            }
            let Some(turn) = self.pending.pop_front() else {
                break;
            };
            debug!(reply = %turn.reply.body.summary(), "Revealed bot reply");
            self.messages.push(ChatMessage::bot(turn.reply));
            revealed += 1;

            // The next turn starts the moment this reply appeared
            self.start_next(due);
        }

        revealed
    }

    /// Reveal all pending turns immediately, in order.
    pub fn flush(&mut self) -> usize {
        let mut revealed = 0;

        while let Some(turn) = self.pending.pop_front() {
            if let Some(echo) = turn.echo {
                self.messages.push(ChatMessage::user(echo));
            }
            self.messages.push(ChatMessage::bot(turn.reply));
            revealed += 1;
        }

        revealed
    }

    /// Clear the log and cancel anything still pending.
    pub fn reset(&mut self) {
        debug!(
            messages = self.messages.len(),
            cancelled = self.pending.len(),
            "Resetting conversation"
        );
        self.messages.clear();
        self.pending.clear();
    }

    fn queue_turn(&mut self, echo: String, reply: ResponseDescriptor, now: Instant) {
        debug!(
            kind = ?reply.kind(),
            queued_behind = self.pending.len(),
            "Queued bot reply"
        );
        self.enqueue(
            PendingTurn {
                echo: Some(echo),
                reply,
                delay: self.pacing.reply_delay,
                due: None,
            },
            now,
        );
    }

    fn enqueue(&mut self, turn: PendingTurn, now: Instant) {
        let idle = self.pending.is_empty();
        self.pending.push_back(turn);
        if idle {
            self.start_next(now);
        }
    }

    fn start_next(&mut self, at: Instant) {
        if let Some(turn) = self.pending.front_mut() {
            if let Some(echo) = turn.echo.take() {
                self.messages.push(ChatMessage::user(echo));
            }
            turn.due = Some(at.checked_add(turn.delay).unwrap_or_else(|| {
                warn!(delay = ?turn.delay, "Reply delay out of range, revealing now");
                at
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MessageBody;
    use crate::visa::VisaDb;
    use std::sync::Arc;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(VisaDb::embedded().unwrap()))
    }

    fn conversation() -> Conversation {
        Conversation::new(resolver(), Pacing::default())
    }

    fn user_text(msg: &ChatMessage) -> &str {
        assert_eq!(msg.sender, Sender::User);
        match &msg.body {
            MessageBody::Text(text) => text,
            _ => panic!("user messages are text"),
        }
    }

    #[test]
    fn test_open_reveals_greeting_after_delay() {
        let mut conv = conversation();
        let start = Instant::now();

        assert!(conv.open(start));
        assert!(conv.is_composing());
        assert!(conv.messages().is_empty());

        assert_eq!(conv.poll(start + Duration::from_millis(999)), 0);
        assert_eq!(conv.poll(start + DEFAULT_GREETING_DELAY), 1);

        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0], ChatMessage::bot(resolver().resolve("hello")));
        assert!(!conv.is_composing());
        assert_eq!(conv.quick_replies().len(), 3);
    }

    #[test]
    fn test_open_only_greets_once() {
        let mut conv = conversation();
        let start = Instant::now();
        assert!(conv.open(start));
        assert!(!conv.open(start));
        conv.poll(start + Duration::from_secs(5));
        assert!(!conv.open(start + Duration::from_secs(5)));
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut conv = conversation();
        let now = Instant::now();
        assert!(!conv.submit("   ", now));
        assert!(!conv.submit("", now));
        assert!(conv.is_empty());
        assert!(!conv.is_composing());
    }

    #[test]
    fn test_submit_echoes_then_replies() {
        let mut conv = conversation();
        let now = Instant::now();

        assert!(conv.submit("  Thailand ", now));
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(user_text(&conv.messages()[0]), "  Thailand ");
        assert!(conv.quick_replies().is_empty());

        conv.poll(now + DEFAULT_REPLY_DELAY);
        assert_eq!(conv.messages()[1], ChatMessage::bot(resolver().resolve("Thailand")));
        assert_eq!(conv.quick_replies()[0].value, "price");
    }

    #[test]
    fn test_quick_reply_echoes_label_and_resolves_value() {
        let mut conv = conversation();
        let now = Instant::now();

        assert!(conv.select_quick_reply("Contact Us", "contact", now));
        conv.poll(now + DEFAULT_REPLY_DELAY);

        assert_eq!(user_text(&conv.messages()[0]), "Contact Us");
        assert_eq!(conv.messages()[1], ChatMessage::bot(resolver().resolve("contact")));
    }

    #[test]
    fn test_quick_reply_falls_back_between_label_and_value() {
        let mut conv = Conversation::new(resolver(), Pacing::instant());
        let now = Instant::now();

        conv.select_quick_reply("", "asia", now);
        conv.select_quick_reply("Flights", "", now);
        conv.flush();

        assert_eq!(user_text(&conv.messages()[0]), "asia");
        assert_eq!(user_text(&conv.messages()[2]), "Flights");
        assert_eq!(conv.messages()[3], ChatMessage::bot(resolver().resolve("flights")));
    }

    #[test]
    fn test_rapid_submissions_are_serialized() {
        let mut conv = conversation();
        let now = Instant::now();

        conv.submit("asia", now);
        conv.submit("contact", now + Duration::from_millis(10));

        // Second turn waits for the first reply
        assert_eq!(conv.messages().len(), 1);

        assert_eq!(conv.poll(now + DEFAULT_REPLY_DELAY), 1);
        assert_eq!(conv.messages().len(), 3);
        assert_eq!(user_text(&conv.messages()[2]), "contact");
        assert!(conv.is_composing());

        assert_eq!(conv.poll(now + DEFAULT_REPLY_DELAY * 2), 1);
        let senders: Vec<Sender> = conv.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::User, Sender::Bot, Sender::User, Sender::Bot]
        );
        assert_eq!(conv.messages()[3], ChatMessage::bot(resolver().resolve("contact")));
    }

    #[test]
    fn test_late_poll_reveals_backlog_in_order() {
        let mut conv = conversation();
        let now = Instant::now();

        conv.open(now);
        conv.submit("flights", now);
        conv.submit("xyzzy", now);

        assert_eq!(conv.poll(now + Duration::from_secs(60)), 3);
        let r = resolver();
        let expected = vec![
            ChatMessage::bot(r.resolve("hello")),
            ChatMessage::user("flights"),
            ChatMessage::bot(r.resolve("flights")),
            ChatMessage::user("xyzzy"),
            ChatMessage::bot(r.resolve("xyzzy")),
        ];
        assert_eq!(conv.messages(), expected.as_slice());
    }

    #[test]
    fn test_reset_cancels_pending_reply() {
        let mut conv = conversation();
        let now = Instant::now();

        conv.submit("visa", now);
        conv.reset();

        assert!(conv.is_empty());
        assert!(!conv.is_composing());
        assert_eq!(conv.poll(now + Duration::from_secs(60)), 0);
        assert!(conv.open(now));
    }

    #[test]
    fn test_unrepresentable_delay_reveals_immediately() {
        let pacing = Pacing {
            greeting_delay: Duration::MAX,
            reply_delay: Duration::MAX,
        };
        let mut conv = Conversation::new(resolver(), pacing);
        let now = Instant::now();

        conv.open(now);
        conv.submit("asia", now);
        assert_eq!(conv.poll(now), 2);
        assert_eq!(conv.messages().len(), 3);
    }

    #[test]
    fn test_flush_reveals_everything() {
        let mut conv = conversation();
        let now = Instant::now();

        conv.open(now);
        conv.submit("europe", now);
        assert_eq!(conv.flush(), 2);
        assert_eq!(conv.messages().len(), 3);
        assert!(conv.next_due().is_none());
    }
}
