//! Mission, task and plan types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::Coordinate;

/// Lifecycle status of a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl MissionStatus {
    /// Whether planning and stepping are still permitted
    pub fn is_plannable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Mission metadata. Agents, victims and the environment are owned by the
/// mission state; this record keeps only id references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub name: String,
    pub status: MissionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub environment_id: Uuid,
    pub assigned_agent_ids: Vec<Uuid>,
    pub victims_identified: Vec<Uuid>,
    pub victims_rescued: Vec<Uuid>,
}

impl Mission {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: MissionStatus::InProgress,
            start_time: Utc::now(),
            end_time: None,
            environment_id: id,
            assigned_agent_ids: Vec::new(),
            victims_identified: Vec::new(),
            victims_rescued: Vec::new(),
        }
    }
}

/// Primary objective steering the route planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningObjective {
    MinimizeTime,
    MinimizeRiskExposure,
    MaximizeLivesSaved,
}

impl Default for PlanningObjective {
    fn default() -> Self {
        Self::MinimizeRiskExposure
    }
}

/// One unit of work for an agent.
///
/// The allocator fills in a provisional risk/time estimate; the planner
/// overwrites `path_to_target`, `expected_risk_exposure` and
/// `estimated_time_seconds` once a route is found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    #[serde(rename = "type")]
    pub kind: String,
    pub target_location: Option<Coordinate>,
    pub victim_id: Option<Uuid>,
    pub path_to_target: Vec<Coordinate>,
    pub expected_risk_exposure: f64,
    pub estimated_time_seconds: u64,
}

/// A planned sequence of tasks for a single agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPlan {
    pub agent_id: Uuid,
    pub tasks: Vec<AgentTask>,
    pub total_estimated_time_seconds: u64,
    pub total_expected_risk: f64,
}

/// A mission-wide plan covering all allocated agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub agent_plans: Vec<AgentPlan>,
    pub victims_to_rescue_order: Vec<Uuid>,
    pub overall_risk_score: f64,
    pub overall_efficiency_score: f64,
}
