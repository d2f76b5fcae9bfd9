//! Speaker policies for turn-taking.
//!
//! A speaker policy decides, per turn, which participants may speak. It
//! is a pure predicate over the conversation history (as transcript
//! lines, oldest first) and the candidate agent; it must not block or
//! mutate anything. An empty history means no prior turns, and by
//! convention every built-in policy answers true then, so the first turn
//! always bootstraps the conversation.
//!
//! Built-ins live in the [`BuiltinPolicy`] enum. Custom policies are
//! either plain closures (infallible, via a blanket impl) or manual
//! [`SpeakerPolicy`] implementations when they need to report failure.
//! A failed evaluation excludes that agent for the current turn only and
//! never aborts the conversation.

use crate::agent::Agent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by a fallible speaker policy evaluation.
///
/// The session recovers from this locally: the agent is excluded for the
/// current turn, the failure is logged, and the turn proceeds.
#[derive(Debug, Error)]
#[error("Speaker policy failed: {0}")]
pub struct PolicyError(pub String);

/// Decides whether an agent may speak in the current turn.
pub trait SpeakerPolicy: Send + Sync {
    /// Evaluates eligibility of `agent` given the history so far.
    ///
    /// `history` holds one `"speaker: content"` line per prior message,
    /// oldest first. Implementations should only inspect the tail of the
    /// history and the agent's name/description.
    fn evaluate(&self, history: &[String], agent: &dyn Agent) -> Result<bool, PolicyError>;
}

/// Any plain predicate closure is a valid (infallible) speaker policy.
impl<F> SpeakerPolicy for F
where
    F: Fn(&[String], &dyn Agent) -> bool + Send + Sync,
{
    fn evaluate(&self, history: &[String], agent: &dyn Agent) -> Result<bool, PolicyError> {
        Ok(self(history, agent))
    }
}

/// Message length threshold for [`BuiltinPolicy::LengthBased`].
const LENGTH_THRESHOLD: usize = 100;

/// How many trailing history entries the windowed policies inspect.
const RECENT_WINDOW: usize = 3;

/// Description words longer than this count as topics.
const TOPIC_MIN_WORD_LEN: usize = 4;

const POSITIVE_WORDS: [&str; 5] = ["good", "great", "excellent", "happy", "positive"];
const NEGATIVE_WORDS: [&str; 5] = ["bad", "poor", "terrible", "unhappy", "negative"];
const QUESTION_INDICATORS: [&str; 7] = ["?", "what", "how", "why", "when", "where", "who"];

/// The built-in speaker policies.
///
/// All matching is case-insensitive substring matching, and every
/// variant answers true on an empty history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPolicy {
    /// Everyone speaks every turn.
    RoundRobin,

    /// Speaks if the agent's whole description appears in the most
    /// recent entry.
    ExpertiseBased,

    /// Uniformly random yes/no, independent of input.
    RandomSelection,

    /// Speaks if the agent was the most recent speaker (the prefix
    /// before the first colon of the last entry).
    MostRecent,

    /// Matches message sentiment against the agent's leaning: an agent
    /// whose description contains "positive" speaks after positive
    /// messages, any other agent after negative ones. Sentiment is
    /// keyword-classified from fixed word sets.
    SentimentBased,

    /// Agents whose description contains "detailed" prefer messages
    /// longer than 100 characters; all others prefer shorter ones.
    LengthBased,

    /// Speaks if the most recent entry looks like a question ("?" or an
    /// interrogative word).
    QuestionBased,

    /// Speaks if any description word longer than 4 characters appears
    /// in the last up-to-3 entries combined.
    TopicBased,

    /// Composite engagement rule: a description word appears in the last
    /// entry, or the agent is mentioned there, or the agent has not
    /// appeared in any of the last 3 entries.
    Engagement,
}

impl BuiltinPolicy {
    fn decide(&self, history: &[String], agent: &dyn Agent) -> bool {
        // Bootstrap: with no prior turns everyone may speak.
        if history.is_empty() {
            return true;
        }

        let last = history[history.len() - 1].as_str();
        let last_lower = last.to_lowercase();

        match self {
            Self::RoundRobin => true,
            Self::ExpertiseBased => last_lower.contains(&agent.description().to_lowercase()),
            Self::RandomSelection => rand::random::<bool>(),
            Self::MostRecent => {
                let prefix = last.split(':').next().unwrap_or("").trim();
                agent.name().eq_ignore_ascii_case(prefix)
            }
            Self::SentimentBased => {
                let is_positive = POSITIVE_WORDS.iter().any(|w| last_lower.contains(w));
                let is_negative = NEGATIVE_WORDS.iter().any(|w| last_lower.contains(w));
                let leans_positive = agent.description().to_lowercase().contains("positive");
                if leans_positive { is_positive } else { is_negative }
            }
            Self::LengthBased => {
                let prefers_long = agent.description().to_lowercase().contains("detailed");
                let message_is_long = last.len() > LENGTH_THRESHOLD;
                if prefers_long {
                    message_is_long
                } else {
                    !message_is_long
                }
            }
            Self::QuestionBased => QUESTION_INDICATORS.iter().any(|w| last_lower.contains(w)),
            Self::TopicBased => {
                let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
                let combined = window
                    .iter()
                    .map(|entry| entry.to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                agent
                    .description()
                    .to_lowercase()
                    .split_whitespace()
                    .filter(|word| word.len() > TOPIC_MIN_WORD_LEN)
                    .any(|word| combined.contains(word))
            }
            Self::Engagement => {
                let descriptor = agent.description().to_lowercase();
                let expertise_relevant = descriptor
                    .split_whitespace()
                    .any(|word| last_lower.contains(word));

                let name_lower = agent.name().to_lowercase();
                let mentioned = last_lower.contains(&name_lower);

                let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
                let not_recent_speaker = !window
                    .iter()
                    .any(|entry| entry.to_lowercase().contains(&name_lower));

                expertise_relevant || mentioned || not_recent_speaker
            }
        }
    }
}

impl SpeakerPolicy for BuiltinPolicy {
    fn evaluate(&self, history: &[String], agent: &dyn Agent) -> Result<bool, PolicyError> {
        Ok(self.decide(history, agent))
    }
}
