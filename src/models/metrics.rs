//! Metrics and KPI types

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of metrics the core tracks per mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    TotalRescueTime,
    AggregateRiskExposure,
    AgentUtilization,
    EfficiencyIndex,
    PredictedLivesSaved,
    VictimsRescuedCount,
    HazardMitigatedCount,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TotalRescueTime => "total_rescue_time",
            Self::AggregateRiskExposure => "aggregate_risk_exposure",
            Self::AgentUtilization => "agent_utilization",
            Self::EfficiencyIndex => "efficiency_index",
            Self::PredictedLivesSaved => "predicted_lives_saved",
            Self::VictimsRescuedCount => "victims_rescued_count",
            Self::HazardMitigatedCount => "hazard_mitigated_count",
        };
        write!(f, "{}", name)
    }
}

/// A single recorded metric sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub name: MetricType,
    pub value: f64,
    pub unit: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub mission_id: Option<Uuid>,
}

/// Aggregated KPIs for a mission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub mission_id: Option<Uuid>,
    pub total_rescue_time_seconds: Option<u64>,
    pub average_agent_risk_exposure: Option<f64>,
    pub agent_utilization_percentage: Option<f64>,
    pub efficiency_index: Option<f64>,
    pub predicted_lives_saved: Option<u64>,
    pub victims_rescued_count: Option<u64>,
    pub active_agents_count: Option<u64>,
    pub additional_metrics: HashMap<String, serde_json::Value>,
}
