//! Rescue agent domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::Coordinate;

/// Kinds of rescue agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    RoboticArm,
    Drone,
    SearchDog,
    HumanRescuer,
    UnmannedGroundVehicle,
}

/// Operational status of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Moving,
    Searching,
    Rescuing,
    ReturningToBase,
    Damaged,
    Offline,
}

/// Capabilities an agent might possess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCapability {
    SearchVictims,
    ExtractVictims,
    ClearDebris,
    AssessHazards,
    CarrySupplies,
}

/// A rescue agent participating in a mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub kind: AgentKind,
    pub current_location: Coordinate,
    pub status: AgentStatus,
    pub capabilities: Vec<AgentCapability>,
    /// Energy level in [0, 1]
    pub battery_level: f64,
    /// Integrity level in [0, 1]
    pub health: f64,
    pub assigned_victim_id: Option<Uuid>,
    pub current_path: Vec<Coordinate>,
    /// Maximum risk exposure the agent tolerates, in [0, 1]
    pub risk_exposure_tolerance: f64,
}

impl Agent {
    pub fn has_capability(&self, capability: AgentCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Idle and able to extract victims, the allocator's candidate filter
    pub fn is_available_for_rescue(&self) -> bool {
        self.status == AgentStatus::Idle
            && self.assigned_victim_id.is_none()
            && self.has_capability(AgentCapability::ExtractVictims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_agent() -> Agent {
        Agent {
            id: Uuid::new_v4(),
            name: "Agent-0001".to_string(),
            kind: AgentKind::Drone,
            current_location: Coordinate::new(0, 0),
            status: AgentStatus::Idle,
            capabilities: vec![
                AgentCapability::SearchVictims,
                AgentCapability::ExtractVictims,
            ],
            battery_level: 1.0,
            health: 1.0,
            assigned_victim_id: None,
            current_path: Vec::new(),
            risk_exposure_tolerance: 0.7,
        }
    }

    #[test]
    fn test_availability_filter() {
        let mut agent = sample_agent();
        assert!(agent.is_available_for_rescue());

        agent.status = AgentStatus::Moving;
        assert!(!agent.is_available_for_rescue());

        agent.status = AgentStatus::Idle;
        agent.capabilities = vec![AgentCapability::SearchVictims];
        assert!(!agent.is_available_for_rescue());
    }

    #[test]
    fn test_kind_wire_name() {
        assert_eq!(
            serde_json::to_string(&AgentKind::UnmannedGroundVehicle).unwrap(),
            "\"unmanned_ground_vehicle\""
        );
    }
}
