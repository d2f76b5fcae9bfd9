//! Batch execution of group chat sessions across many tasks.
//!
//! Two shapes are provided. [`GroupChat::batched_run`] runs one session
//! over the tasks in order, so history accumulates from task to task.
//! [`concurrent_run`] gives every task its own fresh session on its own
//! worker and collects the transcripts in input order; a session must
//! never be shared across workers, which is why it takes a session
//! factory rather than a session.

use crate::chat::GroupChat;
use crate::error::GroupChatError;
use tokio::task::JoinSet;
use tracing::error;

impl GroupChat {
    /// Runs this session once per task, in order.
    ///
    /// The transcript accumulates across tasks; callers needing isolated
    /// transcripts should use [`concurrent_run`] or build a session per
    /// task themselves.
    ///
    /// # Errors
    ///
    /// Returns [`GroupChatError::InvalidTask`] when `tasks` is empty, and
    /// propagates the first error of an individual run.
    pub async fn batched_run(&mut self, tasks: &[String]) -> Result<Vec<String>, GroupChatError> {
        if tasks.is_empty() {
            return Err(GroupChatError::InvalidTask(
                "Tasks must be a non-empty list of strings".to_string(),
            ));
        }

        let mut transcripts = Vec::with_capacity(tasks.len());
        for task in tasks {
            transcripts.push(self.run(task).await?);
        }
        Ok(transcripts)
    }
}

/// Runs one fresh session per task concurrently and returns the rendered
/// transcripts in input order, regardless of completion order.
///
/// `factory` is invoked once per task to build that task's session, so
/// no conversation state is ever shared between workers. The batch is
/// all-or-nothing: the first session run that fails (or a worker that
/// panics) fails the whole batch. Participant-level failures are
/// recovered inside each run and never surface here; a task whose agent
/// keeps failing still yields a transcript, just without that agent's
/// messages.
///
/// # Errors
///
/// - [`GroupChatError::InvalidTask`] when `tasks` is empty.
/// - [`GroupChatError::Configuration`] when the factory rejects a build.
/// - [`GroupChatError::Batch`] when a member run fails.
/// - [`GroupChatError::Session`] when a worker panics.
pub async fn concurrent_run<F>(
    factory: F,
    tasks: &[String],
) -> Result<Vec<String>, GroupChatError>
where
    F: Fn() -> Result<GroupChat, GroupChatError>,
{
    if tasks.is_empty() {
        return Err(GroupChatError::InvalidTask(
            "Tasks must be a non-empty list of strings".to_string(),
        ));
    }

    let mut join_set = JoinSet::new();
    for (index, task) in tasks.iter().enumerate() {
        let mut session = factory()?;
        let task = task.clone();
        join_set.spawn(async move { (index, session.run(&task).await) });
    }

    let mut results: Vec<Option<String>> = vec![None; tasks.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(transcript))) => {
                results[index] = Some(transcript);
            }
            Ok((index, Err(err))) => {
                error!(
                    target: "llm_groupchat::batch",
                    task_index = index,
                    error = %err,
                    event = "batch_member_failed"
                );
                // Fail fast; dropping the JoinSet aborts in-flight work.
                return Err(GroupChatError::Batch(format!(
                    "task {} failed: {}",
                    index, err
                )));
            }
            Err(join_err) => {
                error!(
                    target: "llm_groupchat::batch",
                    error = %join_err,
                    event = "batch_worker_panicked"
                );
                return Err(GroupChatError::Session(format!(
                    "session worker did not complete: {}",
                    join_err
                )));
            }
        }
    }

    let mut transcripts = Vec::with_capacity(results.len());
    for (index, slot) in results.into_iter().enumerate() {
        match slot {
            Some(transcript) => transcripts.push(transcript),
            None => {
                return Err(GroupChatError::Session(format!(
                    "no result recorded for task {}",
                    index
                )));
            }
        }
    }
    Ok(transcripts)
}
