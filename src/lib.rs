//! `llm-groupchat` - Turn-based group chat coordination for multiple LLM agents.
//!
//! This library coordinates a fixed set of autonomous conversational agents
//! inside shared turns. Per turn, a speaker policy decides which agents may
//! respond; each eligible agent is prompted with the task and the transcript
//! so far, and non-empty responses are appended to a shared, append-only
//! conversation log. Runs end on turn budget exhaustion, sustained silence,
//! or a detected natural conclusion.
//!
//! What an agent is internally (which model, which transport) is none of
//! this crate's business: a participant is anything implementing the
//! [`Agent`] trait, and a single failing participant never ends the
//! conversation for everyone else.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_groupchat::{BuiltinPolicy, GroupChat};
//!
//! let mut chat = GroupChat::builder()
//!     .name("Investment Advisory")
//!     .description("Financial and tax analysis group")
//!     .speaker_policy(BuiltinPolicy::ExpertiseBased)
//!     .max_turns(5)
//!     .add_agent(financial_analyst)
//!     .add_agent(tax_adviser)
//!     .build()?;
//!
//! let transcript = chat.run("How to optimize tax strategy for investments?").await?;
//! println!("{transcript}");
//! ```

pub mod agent;
pub mod batch;
pub mod chat;
pub mod error;
pub mod message;
pub mod speaker;

pub use agent::{Agent, AgentError};
pub use batch::concurrent_run;
pub use chat::{GroupChat, GroupChatBuilder};
pub use error::GroupChatError;
pub use message::{ChatMessage, Conversation, Speaker};
pub use speaker::{BuiltinPolicy, PolicyError, SpeakerPolicy};
