//! Messages and the append-only conversation log.
//!
//! A [`Conversation`] is the shared transcript of one group chat session:
//! an ordered, append-only sequence of role-tagged [`ChatMessage`]s. It is
//! consumed in two shapes: [`Conversation::history_lines`] (one
//! `"speaker: content"` string per message, the view speaker policies
//! operate on) and [`Conversation::render`] (the whole transcript as a
//! single string, the value a run returns).

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current Unix timestamp in seconds.
pub(crate) fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time should be after UNIX_EPOCH")
        .as_secs()
}

/// Represents who produced a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Speaker {
    /// Session-generated framing (name, description, rules, roster).
    System,

    /// The caller's task prompt.
    User,

    /// A participating agent.
    Agent {
        /// Name of the agent.
        name: String,
    },
}

impl Speaker {
    /// Creates an agent speaker.
    pub fn agent(name: impl Into<String>) -> Self {
        Self::Agent { name: name.into() }
    }

    /// Returns the prefix this speaker carries in transcript lines.
    pub fn label(&self) -> &str {
        match self {
            Speaker::System => "System",
            Speaker::User => "User",
            Speaker::Agent { name } => name,
        }
    }

    /// Returns true if this message came from an agent.
    pub fn is_agent(&self) -> bool {
        matches!(self, Speaker::Agent { .. })
    }
}

/// A single message in a group chat transcript.
///
/// Messages are immutable once appended. Besides speaker and content,
/// each message records when it was created, which turn produced it, and
/// a snapshot of the transcript lines that preceded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced this message.
    pub speaker: Speaker,

    /// What was said.
    pub content: String,

    /// Creation timestamp (Unix seconds).
    pub timestamp: u64,

    /// The conversation turn this message belongs to.
    ///
    /// Monotonically non-decreasing across the transcript, including
    /// across repeated runs of the same session.
    pub turn: usize,

    /// Snapshot of the transcript lines at the moment this message was
    /// appended.
    pub preceding_context: Vec<String>,
}

impl ChatMessage {
    /// Returns this message as a `"speaker: content"` transcript line.
    pub fn as_line(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.content)
    }
}

/// The ordered, append-only message log of a group chat session.
///
/// No operation removes or mutates a past message; the transcript only
/// grows. The conversation owns the turn counter stamped onto messages,
/// which only ever advances, so the turn index is monotone even when a
/// session is run multiple times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    turn: usize,
}

impl Conversation {
    /// Creates a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message under the given speaker.
    ///
    /// The message captures the current timestamp, the current turn
    /// counter, and a snapshot of the transcript lines so far.
    pub fn add(&mut self, speaker: Speaker, content: impl Into<String>) {
        let preceding_context = self.history_lines();
        self.messages.push(ChatMessage {
            speaker,
            content: content.into(),
            timestamp: current_unix_timestamp(),
            turn: self.turn,
            preceding_context,
        });
    }

    /// Advances the turn counter stamped onto subsequent messages.
    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Returns the current turn counter.
    pub fn current_turn(&self) -> usize {
        self.turn
    }

    /// Returns all messages in insertion order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the transcript as one `"speaker: content"` line per
    /// message, oldest first. This is the view speaker policies receive.
    pub fn history_lines(&self) -> Vec<String> {
        self.messages.iter().map(ChatMessage::as_line).collect()
    }

    /// Renders the full transcript as a single string.
    pub fn render(&self) -> String {
        self.history_lines().join("\n")
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no message has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.add(Speaker::System, "First");
        conversation.add(Speaker::User, "Second");
        conversation.add(Speaker::agent("Alice"), "Third");

        let lines = conversation.history_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "System: First");
        assert_eq!(lines[1], "User: Second");
        assert_eq!(lines[2], "Alice: Third");
    }

    #[test]
    fn test_append_only_length_is_non_decreasing() {
        let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        let mut previous_len = 0;
        for i in 0..5 {
            conversation.add(Speaker::agent("A"), format!("msg {}", i));
            assert!(conversation.len() > previous_len);
            previous_len = conversation.len();
        }
        assert_eq!(conversation.len(), 5);
    }

    #[test]
    fn test_render_is_idempotent_without_append() {
        let mut conversation = Conversation::new();
        conversation.add(Speaker::User, "hello");
        conversation.add(Speaker::agent("Bob"), "hi there");

        let first = conversation.render();
        let second = conversation.render();
        assert_eq!(first, second);
        assert_eq!(first, "User: hello\nBob: hi there");
    }

    #[test]
    fn test_turn_index_is_monotone_across_advances() {
        let mut conversation = Conversation::new();
        conversation.add(Speaker::System, "framing");
        conversation.advance_turn();
        conversation.add(Speaker::agent("A"), "turn one");
        conversation.advance_turn();
        conversation.add(Speaker::agent("B"), "turn two");

        let turns: Vec<usize> = conversation.messages().iter().map(|m| m.turn).collect();
        assert_eq!(turns, vec![0, 1, 2]);
        assert!(turns.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_preceding_context_snapshots_prior_lines() {
        let mut conversation = Conversation::new();
        conversation.add(Speaker::User, "first");
        conversation.add(Speaker::agent("A"), "second");

        let messages = conversation.messages();
        assert!(messages[0].preceding_context.is_empty());
        assert_eq!(messages[1].preceding_context, vec!["User: first".to_string()]);

        // The snapshot is frozen at append time.
        conversation.add(Speaker::agent("B"), "third");
        assert_eq!(
            conversation.messages()[1].preceding_context,
            vec!["User: first".to_string()]
        );
    }

    #[test]
    fn test_speaker_labels() {
        assert_eq!(Speaker::System.label(), "System");
        assert_eq!(Speaker::User.label(), "User");
        assert_eq!(Speaker::agent("Carol").label(), "Carol");
        assert!(Speaker::agent("Carol").is_agent());
        assert!(!Speaker::System.is_agent());
    }

    #[test]
    fn test_message_serde_round_trip() {
        let mut conversation = Conversation::new();
        conversation.add(Speaker::agent("Alice"), "structured output");

        let json = serde_json::to_string(&conversation.messages()[0]).unwrap();
        let parsed: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.speaker, Speaker::agent("Alice"));
        assert_eq!(parsed.content, "structured output");
    }
}
