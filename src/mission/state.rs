//! Per-mission owning state container
//!
//! One `MissionState` holds everything a mission owns: metadata, the
//! environment, the agent roster, the engines configured for it, the
//! latest risk field snapshot and the most recent plan. Agents and victims
//! reference each other by id only; lookups resolve through the owning
//! tables here.

use std::sync::Arc;

use uuid::Uuid;

use crate::allocation::AgentAllocator;
use crate::core::config::AegisConfig;
use crate::core::error::{AegisError, Result};
use crate::environment::Environment;
use crate::metrics::MetricsRecorder;
use crate::models::{Agent, Mission, MissionStatus, Plan};
use crate::planner::RoutePlanner;
use crate::prioritization::VictimPrioritizer;
use crate::risk::{RiskField, RiskModel};

/// The complete in-memory state of one mission
#[derive(Debug)]
pub struct MissionState {
    pub mission: Mission,
    pub environment: Environment,
    pub agents: Vec<Agent>,
    pub risk_model: RiskModel,
    pub prioritizer: VictimPrioritizer,
    pub allocator: AgentAllocator,
    pub planner: RoutePlanner,
    /// Latest risk field snapshot; replaced wholesale, never mutated
    pub risk_field: Arc<RiskField>,
    pub current_plan: Option<Plan>,
    pub metrics: MetricsRecorder,
}

impl MissionState {
    /// Assemble the state for a freshly generated environment. The initial
    /// risk field is computed by the caller (on the compute pool) and
    /// passed in.
    pub fn new(
        mission: Mission,
        environment: Environment,
        risk_field: RiskField,
        config: &AegisConfig,
    ) -> Self {
        let mission_id = mission.id;
        Self {
            mission,
            environment,
            agents: Vec::new(),
            risk_model: RiskModel::new(config.risk.clone()),
            prioritizer: VictimPrioritizer::new(config.prioritization.clone()),
            allocator: AgentAllocator::new(),
            planner: RoutePlanner::new(),
            risk_field: Arc::new(risk_field),
            current_plan: None,
            metrics: MetricsRecorder::new(mission_id),
        }
    }

    pub fn agent(&self, id: Uuid) -> Result<&Agent> {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .ok_or(AegisError::AgentNotFound { entity_id: id })
    }

    pub fn agent_mut(&mut self, id: Uuid) -> Result<&mut Agent> {
        self.agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AegisError::AgentNotFound { entity_id: id })
    }

    /// Install a new risk field snapshot
    pub fn replace_risk_field(&mut self, field: RiskField) {
        self.risk_field = Arc::new(field);
    }

    /// Fail unless the mission still accepts planning and mutation
    pub fn ensure_plannable(&self) -> Result<()> {
        if self.mission.status.is_plannable() {
            Ok(())
        } else {
            Err(AegisError::InvalidMissionState {
                mission_id: self.mission.id,
                status: self.mission.status.to_string(),
            })
        }
    }

    /// Move the mission into a terminal state and stamp the end time
    pub fn close(&mut self, status: MissionStatus) -> Result<()> {
        if !status.is_terminal() {
            return Err(AegisError::InvalidMissionState {
                mission_id: self.mission.id,
                status: status.to_string(),
            });
        }
        self.mission.status = status;
        self.mission.end_time = Some(chrono::Utc::now());
        Ok(())
    }
}
