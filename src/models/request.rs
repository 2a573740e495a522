//! Request and response types for the external operation surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{AegisError, Result};

use super::mission::{AgentPlan, MissionStatus, PlanningObjective};

/// Bounds enforced on simulation requests
pub const MAP_SIZE_RANGE: std::ops::RangeInclusive<u32> = 10..=200;
pub const MAX_VICTIMS: u32 = 50;
pub const MAX_AGENTS: u32 = 10;

/// Request to initiate a disaster simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    /// Side length of the square grid
    pub map_size: u32,
    /// Overall intensity factor for hazard generation, in [0, 1]
    pub hazard_intensity_factor: f64,
    pub num_victims: u32,
    pub num_agents: u32,
    /// Optional seed for reproducible environment generation
    pub seed: Option<i64>,
}

impl Default for SimulateRequest {
    fn default() -> Self {
        Self {
            map_size: 50,
            hazard_intensity_factor: 0.5,
            num_victims: 10,
            num_agents: 3,
            seed: None,
        }
    }
}

impl SimulateRequest {
    /// Enforce the wire-level field bounds
    pub fn validate(&self) -> Result<()> {
        if !MAP_SIZE_RANGE.contains(&self.map_size) {
            return Err(AegisError::invalid_parameters(format!(
                "map_size must be within [{}, {}], got {}",
                MAP_SIZE_RANGE.start(),
                MAP_SIZE_RANGE.end(),
                self.map_size
            )));
        }
        if !(0.0..=1.0).contains(&self.hazard_intensity_factor) {
            return Err(AegisError::invalid_parameters(format!(
                "hazard_intensity_factor must be within [0, 1], got {}",
                self.hazard_intensity_factor
            )));
        }
        if self.num_victims > MAX_VICTIMS {
            return Err(AegisError::invalid_parameters(format!(
                "num_victims must be at most {}, got {}",
                MAX_VICTIMS, self.num_victims
            )));
        }
        if self.num_agents > MAX_AGENTS {
            return Err(AegisError::invalid_parameters(format!(
                "num_agents must be at most {}, got {}",
                MAX_AGENTS, self.num_agents
            )));
        }
        Ok(())
    }
}

/// Response after a simulation was initiated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub mission_id: Uuid,
    pub message: String,
}

/// Request to generate a rescue plan for an existing mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub planning_objective: PlanningObjective,
    /// Recompute the risk field before planning
    #[serde(default)]
    pub replan: bool,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            planning_objective: PlanningObjective::default(),
            replan: false,
        }
    }
}

/// Response carrying the generated plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan_id: Uuid,
    pub mission_id: Uuid,
    pub agent_plans: Vec<AgentPlan>,
    pub victims_prioritized_order: Vec<Uuid>,
    pub message: String,
}

/// Request for a decision explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub mission_id: Uuid,
    pub explanation_type: super::explain::ExplanationType,
    pub decision_id: Option<Uuid>,
}

/// Outcome of a single simulation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub mission_id: Uuid,
    pub agents_advanced: u64,
    /// Victims rescued during this step
    pub victims_rescued: Vec<Uuid>,
    pub mission_status: MissionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_is_valid() {
        assert!(SimulateRequest::default().validate().is_ok());
    }

    #[test]
    fn test_map_size_bounds() {
        let mut req = SimulateRequest::default();
        req.map_size = 9;
        assert!(req.validate().is_err());
        req.map_size = 201;
        assert!(req.validate().is_err());
        req.map_size = 10;
        assert!(req.validate().is_ok());
        req.map_size = 200;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_intensity_and_counts_bounds() {
        let mut req = SimulateRequest::default();
        req.hazard_intensity_factor = 1.2;
        assert!(req.validate().is_err());

        req = SimulateRequest::default();
        req.num_victims = 51;
        assert!(req.validate().is_err());

        req = SimulateRequest::default();
        req.num_agents = 11;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_plan_request_defaults() {
        let req: PlanRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            req.planning_objective,
            PlanningObjective::MinimizeRiskExposure
        );
        assert!(!req.replan);
    }
}
