//! The group chat orchestrator.
//!
//! A [`GroupChat`] owns the conversation transcript and the participant
//! list, and drives the turn loop: per turn it asks the speaker policy
//! which agents are eligible, prompts each of them in order with the
//! task and the transcript so far, appends non-empty responses, and
//! stops on turn budget exhaustion, sustained silence, or a detected
//! conclusion.
//!
//! Participant failures never end a run. A respond error or a policy
//! evaluation error is logged and that agent is skipped for the turn;
//! the conversation continues with everyone else.

use crate::agent::Agent;
use crate::error::GroupChatError;
use crate::message::{Conversation, Speaker};
use crate::speaker::SpeakerPolicy;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Consecutive all-silent policy evaluations after which a run ends.
const MAX_SILENT_TURNS: usize = 2;

/// How many trailing transcript entries the conclusion check inspects.
const CONCLUSION_WINDOW: usize = 3;

/// A turn-based conversation between multiple agents.
///
/// Construct through [`GroupChat::builder`], which validates the
/// configuration eagerly: at least two agents, a speaker policy, and a
/// positive turn budget are required before a run is ever possible.
///
/// # Examples
///
/// ```rust,ignore
/// use llm_groupchat::{BuiltinPolicy, GroupChat};
///
/// let mut chat = GroupChat::builder()
///     .name("Investment Advisory")
///     .description("Financial and tax analysis group")
///     .speaker_policy(BuiltinPolicy::ExpertiseBased)
///     .max_turns(5)
///     .add_agent(financial_analyst)
///     .add_agent(tax_adviser)
///     .build()?;
///
/// let transcript = chat.run("How to optimize tax strategy for investments?").await?;
/// ```
pub struct GroupChat {
    name: String,
    description: String,
    rules: String,
    agents: Vec<Arc<dyn Agent>>,
    policy: Arc<dyn SpeakerPolicy>,
    max_turns: usize,
    conversation: Conversation,
}

/// Builder for [`GroupChat`] with eager validation in [`build`](GroupChatBuilder::build).
pub struct GroupChatBuilder {
    name: String,
    description: String,
    rules: String,
    agents: Vec<Arc<dyn Agent>>,
    policy: Option<Arc<dyn SpeakerPolicy>>,
    max_turns: usize,
}

impl Default for GroupChatBuilder {
    fn default() -> Self {
        Self {
            name: "GroupChat".to_string(),
            description: "A group chat for multiple agents".to_string(),
            rules: String::new(),
            agents: Vec::new(),
            policy: None,
            max_turns: 1,
        }
    }
}

impl GroupChatBuilder {
    /// Sets the chat name used in the system framing message.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the chat purpose, shown to every agent in its prompt.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets free-text rules inserted into the system framing message.
    pub fn rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = rules.into();
        self
    }

    /// Sets the maximum number of speaking turns per run.
    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Sets the speaker policy. Required.
    pub fn speaker_policy(mut self, policy: impl SpeakerPolicy + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Adds a participating agent. At least two are required.
    pub fn add_agent(mut self, agent: impl Agent + 'static) -> Self {
        self.agents.push(Arc::new(agent));
        self
    }

    /// Adds an already shared agent.
    pub fn add_shared_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Validates the configuration and builds the session.
    ///
    /// # Errors
    ///
    /// Returns [`GroupChatError::Configuration`] when fewer than two
    /// agents were added, no speaker policy was set, the turn budget is
    /// zero, or an agent has an empty name.
    pub fn build(self) -> Result<GroupChat, GroupChatError> {
        if self.agents.len() < 2 {
            return Err(GroupChatError::Configuration(
                "At least two agents are required for a group chat".to_string(),
            ));
        }
        let policy = self.policy.ok_or_else(|| {
            GroupChatError::Configuration("No speaker policy provided".to_string())
        })?;
        if self.max_turns == 0 {
            return Err(GroupChatError::Configuration(
                "Max turns must be greater than 0".to_string(),
            ));
        }
        for (index, agent) in self.agents.iter().enumerate() {
            if agent.name().trim().is_empty() {
                return Err(GroupChatError::Configuration(format!(
                    "Agent at index {} has an empty name",
                    index
                )));
            }
        }

        Ok(GroupChat {
            name: self.name,
            description: self.description,
            rules: self.rules,
            agents: self.agents,
            policy,
            max_turns: self.max_turns,
            conversation: Conversation::new(),
        })
    }
}

impl GroupChat {
    /// Returns a builder with the default name, description, and a turn
    /// budget of 1.
    pub fn builder() -> GroupChatBuilder {
        GroupChatBuilder::default()
    }

    /// Returns the chat name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the conversation transcript accumulated so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Runs a conversation about the given task and returns the rendered
    /// transcript.
    ///
    /// Calling `run` again on the same session keeps the transcript
    /// (fresh framing messages are appended) while the per-run turn
    /// budget starts over. Callers that need isolation between tasks
    /// should build a new session per task.
    ///
    /// # Errors
    ///
    /// Returns [`GroupChatError::InvalidTask`] when `task` is empty or
    /// whitespace-only. Individual agent failures do not surface here.
    pub async fn run(&mut self, task: &str) -> Result<String, GroupChatError> {
        self.run_with_image(task, None).await
    }

    /// Like [`run`](GroupChat::run), with an optional image reference
    /// forwarded to every respond call of this run.
    pub async fn run_with_image(
        &mut self,
        task: &str,
        image: Option<&str>,
    ) -> Result<String, GroupChatError> {
        if task.trim().is_empty() {
            return Err(GroupChatError::InvalidTask(
                "Task must be a non-empty string".to_string(),
            ));
        }

        let roster = self
            .agents
            .iter()
            .map(|agent| agent.name())
            .collect::<Vec<_>>()
            .join(", ");
        let framing = format!(
            "Group Chat Name: {}\nGroup Chat Description: {}\nRules: {}\nOther agents: {}",
            self.name, self.description, self.rules, roster
        );
        self.conversation.add(Speaker::System, framing);
        self.conversation.add(Speaker::User, task);

        let mut turn = 0;
        let mut consecutive_silent_turns = 0;

        while turn < self.max_turns {
            let history = self.conversation.history_lines();

            let mut speaking_agents: Vec<Arc<dyn Agent>> = Vec::new();
            for agent in &self.agents {
                match self.policy.evaluate(&history, agent.as_ref()) {
                    Ok(true) => speaking_agents.push(Arc::clone(agent)),
                    Ok(false) => {}
                    Err(err) => {
                        // A faulty policy must not abort the conversation;
                        // the agent just sits this turn out.
                        warn!(
                            target: "llm_groupchat::chat",
                            agent = %agent.name(),
                            error = %err,
                            event = "policy_evaluation_failed"
                        );
                    }
                }
            }

            if speaking_agents.is_empty() {
                consecutive_silent_turns += 1;
                if consecutive_silent_turns >= MAX_SILENT_TURNS {
                    debug!(
                        target: "llm_groupchat::chat",
                        turn,
                        event = "silence_termination"
                    );
                    break;
                }
                // Silent turns do not consume the turn budget.
                continue;
            }
            consecutive_silent_turns = 0;

            for agent in &speaking_agents {
                let prompt = format!(
                    "You're {name} participating in a group chat.\n\
                     Chat Purpose: {description}\n\
                     Current Discussion: {task}\n\
                     Chat History:\n{history}\n\
                     As {name}, please provide your response:",
                    name = agent.name(),
                    description = self.description,
                    task = task,
                    history = self.conversation.render(),
                );

                match agent.respond(&prompt, image).await {
                    Ok(message) if message.trim().is_empty() => {
                        warn!(
                            target: "llm_groupchat::chat",
                            turn,
                            agent = %agent.name(),
                            event = "empty_response_skipped"
                        );
                    }
                    Ok(message) => {
                        self.conversation.add(Speaker::agent(agent.name()), message);
                        info!(
                            target: "llm_groupchat::chat",
                            turn,
                            agent = %agent.name(),
                            event = "agent_responded"
                        );
                    }
                    Err(err) => {
                        // One failing agent never aborts the turn.
                        error!(
                            target: "llm_groupchat::chat",
                            turn,
                            agent = %agent.name(),
                            error = %err,
                            event = "agent_respond_failed"
                        );
                    }
                }
            }

            turn += 1;
            self.conversation.advance_turn();

            if self.reached_conclusion() {
                debug!(
                    target: "llm_groupchat::chat",
                    turn,
                    event = "conclusion_termination"
                );
                break;
            }
        }

        info!(
            target: "llm_groupchat::chat",
            turns = turn,
            messages = self.conversation.len(),
            event = "run_completed"
        );

        Ok(self.conversation.render())
    }

    /// True when the last up-to-3 transcript entries all signal closure.
    fn reached_conclusion(&self) -> bool {
        let lines = self.conversation.history_lines();
        if lines.is_empty() {
            return false;
        }
        let tail = &lines[lines.len().saturating_sub(CONCLUSION_WINDOW)..];
        tail.iter()
            .all(|line| line.to_lowercase().contains("conclusion"))
    }
}
