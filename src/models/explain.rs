//! Explainability output types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of explanations the explainability subsystem can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationType {
    VictimPrioritization,
    RouteSelection,
    MissionSummary,
    TradeOffAnalysis,
    TaskDecomposition,
}

impl fmt::Display for ExplanationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VictimPrioritization => "victim_prioritization",
            Self::RouteSelection => "route_selection",
            Self::MissionSummary => "mission_summary",
            Self::TradeOffAnalysis => "trade_off_analysis",
            Self::TaskDecomposition => "task_decomposition",
        };
        write!(f, "{}", name)
    }
}

/// Structured output of the explanation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainabilityOutput {
    pub explanation_id: Uuid,
    pub mission_id: Uuid,
    pub explanation_type: ExplanationType,
    /// The structured data that formed the basis of the decision
    pub decision_context: serde_json::Value,
    pub human_readable_summary: String,
    pub structured_explanation_json: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
