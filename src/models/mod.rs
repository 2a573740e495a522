//! Plain data types shared across the planning core

pub mod agent;
pub mod explain;
pub mod geometry;
pub mod hazard;
pub mod metrics;
pub mod mission;
pub mod request;
pub mod victim;

pub use agent::{Agent, AgentCapability, AgentKind, AgentStatus};
pub use explain::{ExplainabilityOutput, ExplanationType};
pub use geometry::{Coordinate, GridNode};
pub use hazard::{Hazard, HazardKind, NodeRisk, RiskLevel};
pub use metrics::{Metric, MetricType, MetricsSummary};
pub use mission::{
    AgentPlan, AgentTask, Mission, MissionStatus, Plan, PlanningObjective,
};
pub use request::{
    ExplanationRequest, PlanRequest, PlanResponse, SimulateRequest, SimulateResponse, StepReport,
};
pub use victim::{InjurySeverity, Victim, VictimStatus};
