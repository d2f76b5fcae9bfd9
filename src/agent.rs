//! The agent contract consumed by a group chat.
//!
//! An agent is an opaque conversational responder: the chat hands it a
//! fully assembled prompt and receives generated text back, or an error.
//! How the agent produces that text (CLI spawn, HTTP API, local model) is
//! out of scope here; implementations wrap whatever backend they like.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during an agent's respond call.
///
/// All of these are recovered by the session: a failing agent is skipped
/// for the current turn and the conversation continues with the others.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent execution failed with a specific error message.
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    /// The agent's backing process or transport failed.
    #[error("Process error: {0}")]
    ProcessError(String),

    /// I/O error occurred during agent execution.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A generic error for other cases.
    #[error("Agent error: {0}")]
    Other(String),
}

/// The core trait for a group chat participant.
///
/// A participant is identified by its name (unique within a session;
/// assumed by the speaker policies, not enforced) and
/// carries a free-text description that several built-in policies match
/// against (expertise keywords, "positive", "detailed", topic words).
///
/// # Contract
///
/// - `respond` must return generated text or fail with an [`AgentError`].
/// - An empty (or whitespace-only) return is valid and means the agent
///   declined to respond; the session skips it without treating it as an
///   error.
/// - The session awaits `respond` to completion before moving to the next
///   eligible participant; agents never speak concurrently within a turn.
///
/// # Example
///
/// ```rust,ignore
/// use llm_groupchat::{Agent, AgentError};
///
/// struct EchoAgent;
///
/// #[async_trait::async_trait]
/// impl Agent for EchoAgent {
///     fn name(&self) -> &str {
///         "Echo"
///     }
///
///     fn description(&self) -> &str {
///         "Repeats whatever it is asked"
///     }
///
///     async fn respond(&self, prompt: &str, _image: Option<&str>) -> Result<String, AgentError> {
///         Ok(prompt.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent's identity within the chat.
    fn name(&self) -> &str;

    /// Returns a natural language description of what this agent can do.
    ///
    /// Speaker policies use this text for keyword matching, so it should
    /// name the agent's areas of expertise.
    fn description(&self) -> &str;

    /// Generates a response to the given prompt.
    ///
    /// `image` is an optional reference (path or URL) forwarded unchanged
    /// from the run that produced this prompt; backends without multimodal
    /// support may ignore it.
    async fn respond(&self, prompt: &str, image: Option<&str>) -> Result<String, AgentError>;
}
