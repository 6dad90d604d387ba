//! Blocking waits over asynchronous server work
//!
//! Both waits poll on a fixed cadence from the caller's task; nothing is spawned.
//! The cancellation token is checked before every server call and wakes any
//! pending sleep, so a cancelled wait returns within one poll interval.

#[cfg(test)]
mod waiter_test;

use crate::error::{Result, TcaError};
use crate::models::*;
use crate::tca_trait::TcaClientTrait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Time between two polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default attempt budget used by the CLI (one hour)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 360;

/// Polls that may come back empty while a freshly accepted task is being indexed
const INDEXING_POLLS: u32 = 3;

pub struct TaskWaiter<'a, C: ?Sized> {
    client: &'a C,
}

/// Nodes of a task forest whose status differs from `expected`
fn pending<'t>(tasks: &'t [ClusterTask], expected: TaskStatus) -> Vec<&'t ClusterTask> {
    tasks
        .iter()
        .flat_map(ClusterTask::flatten)
        .filter(|t| t.status != expected)
        .collect()
}

impl<'a, C: TcaClientTrait + ?Sized> TaskWaiter<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    async fn pause(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            _ = cancel.cancelled() => Err(TcaError::TaskCancelled),
            _ = tokio::time::sleep(POLL_INTERVAL) => Ok(()),
        }
    }

    /// Poll an instance's LCM info until its instantiation state starts with
    /// `expected_prefix`.
    ///
    /// A `FAILED_TEMP` or `FAILED` operation state ends the wait with `LcmFailed`.
    pub async fn wait_instance_state(
        &self,
        instance_id: &str,
        expected_prefix: &str,
        max_attempts: u32,
        verbose: bool,
        cancel: &CancellationToken,
    ) -> Result<LcmInfo> {
        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(TcaError::TaskCancelled);
            }
            let info = self.client.get_vnf_instance(instance_id, cancel).await?;

            if info.instantiation_state.starts_with(expected_prefix) {
                info!(
                    "Instance {} reached {} after {} polls",
                    info.vnf_instance_name, info.instantiation_state, attempt
                );
                return Ok(info);
            }
            if matches!(
                info.operation_state(),
                Some(LcmOperationState::FailedTemp | LcmOperationState::Failed)
            ) {
                return Err(TcaError::LcmFailed {
                    instance: info.vnf_instance_name.clone(),
                    operation: info.lcm_operation().to_string(),
                });
            }

            if verbose {
                info!(
                    "Instance {} is {} ({} {:?}), attempt {}/{}",
                    info.vnf_instance_name,
                    info.instantiation_state,
                    info.lcm_operation(),
                    info.operation_state(),
                    attempt,
                    max_attempts
                );
            } else {
                debug!("Instance {} is {}", instance_id, info.instantiation_state);
            }

            if attempt < max_attempts {
                self.pause(cancel).await?;
            }
        }
        Err(TcaError::DeadlineExceeded {
            attempts: max_attempts,
        })
    }

    /// Poll the task tree behind `handle` until every node reports `expected`.
    ///
    /// Any node in `FAILED` ends the wait with `TaskFailed` naming that node's
    /// type. An empty handle (dry run) has nothing to wait for. A handle that only
    /// names its entity is tracked through the entity's tasks. A task still unlisted
    /// after the first few polls is `TaskNotFound`.
    pub async fn wait_task_tree(
        &self,
        handle: &TaskHandle,
        expected: TaskStatus,
        max_attempts: u32,
        verbose: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<ClusterTask>> {
        if handle.is_empty() {
            return Ok(Vec::new());
        }
        let (query, label) = match (&handle.operation_id, handle.entity_id.as_deref()) {
            (None, Some(entity)) if handle.id.is_empty() => {
                (TaskQuery::for_cluster(entity), entity.to_string())
            }
            (Some(op), _) if !op.is_empty() => (TaskQuery::for_handle(handle), op.clone()),
            _ => (TaskQuery::for_handle(handle), handle.id.clone()),
        };

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(TcaError::TaskCancelled);
            }
            let tasks = self.client.query_tasks(&query, cancel).await?;
            if tasks.is_empty() {
                if attempt >= INDEXING_POLLS || attempt == max_attempts {
                    return Err(TcaError::TaskNotFound { id: label });
                }
                debug!("Task {} not listed yet (poll {})", label, attempt);
                self.pause(cancel).await?;
                continue;
            }

            let waiting = pending(&tasks, expected);
            if waiting.is_empty() {
                info!("Task {} reached {} after {} polls", label, expected, attempt);
                return Ok(tasks);
            }
            if let Some(failed) = waiting.iter().find(|t| t.status == TaskStatus::Failed) {
                return Err(TcaError::TaskFailed {
                    phase: failed.task_type.clone(),
                    message: failed.message.clone().unwrap_or_default(),
                });
            }

            if verbose {
                for task in &waiting {
                    info!(
                        "Task {} {} is {} ({}%)",
                        task.task_id, task.task_type, task.status, task.progress
                    );
                }
            } else {
                debug!("Task {}: {} nodes not yet {}", label, waiting.len(), expected);
            }

            if attempt < max_attempts {
                self.pause(cancel).await?;
            }
        }
        Err(TcaError::DeadlineExceeded {
            attempts: max_attempts,
        })
    }
}
