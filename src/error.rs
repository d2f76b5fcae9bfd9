//! Error types for group chat sessions and batch execution.

use thiserror::Error;

/// Errors that can occur when configuring or running a group chat.
///
/// Failures local to a single participant (a respond call or a policy
/// evaluation going wrong) are never surfaced through this type; the
/// session recovers from them in place and only logs them. This enum
/// covers the failures that end a call or a batch.
#[derive(Debug, Error)]
pub enum GroupChatError {
    /// The session configuration is invalid (too few agents, missing
    /// policy, zero turn budget, malformed agent). Raised at build time,
    /// before a run is ever possible.
    #[error("Invalid group chat configuration: {0}")]
    Configuration(String),

    /// The task handed to a run was empty or a batch was given no tasks.
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A session run failed in a way that is not attributable to a single
    /// participant, such as a panicked worker in a concurrent batch.
    #[error("Session failed: {0}")]
    Session(String),

    /// A concurrent batch member failed. The batch is all-or-nothing, so
    /// this aborts the whole batch.
    #[error("Concurrent batch execution failed: {0}")]
    Batch(String),
}
