//! Cluster task models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle returned by every asynchronous cluster or pool operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    #[serde(default, alias = "taskId")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl TaskHandle {
    /// Handle that names no server task (dry runs)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.operation_id.is_none() && self.entity_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Queued,
    InProgress,
    Success,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Queued => "QUEUED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityDetails {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// One node of a cluster task tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterTask {
    #[serde(alias = "id")]
    pub task_id: String,
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_details: Option<EntityDetails>,
    /// Operation type, e.g. `CREATE_CLUSTER`
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub child_tasks: Vec<ClusterTask>,
}

impl ClusterTask {
    /// This task followed by every descendant, depth first
    pub fn flatten(&self) -> Vec<&ClusterTask> {
        let mut out = vec![self];
        for child in &self.child_tasks {
            out.extend(child.flatten());
        }
        out
    }

    pub fn started_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.started.and_then(chrono::DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operation_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_ids: Vec<String>,
}

/// Body for `POST /hybridity/api/infra/k8s/tasks`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub filter: TaskFilter,
}

impl TaskQuery {
    /// Query for the tree of a handle: by operation when known, else by task id
    pub fn for_handle(handle: &TaskHandle) -> Self {
        let mut filter = TaskFilter::default();
        match &handle.operation_id {
            Some(op) if !op.is_empty() => filter.operation_ids.push(op.clone()),
            _ => filter.task_ids.push(handle.id.clone()),
        }
        Self { filter }
    }

    pub fn for_cluster(cluster_id: &str) -> Self {
        Self {
            filter: TaskFilter {
                cluster_ids: vec![cluster_id.to_string()],
                ..Default::default()
            },
        }
    }
}
