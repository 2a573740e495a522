//! Victim domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::Coordinate;

/// Severity of a victim's injuries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjurySeverity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl InjurySeverity {
    pub const ALL: [InjurySeverity; 4] = [
        InjurySeverity::Mild,
        InjurySeverity::Moderate,
        InjurySeverity::Severe,
        InjurySeverity::Critical,
    ];
}

/// Current status of a victim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictimStatus {
    Trapped,
    Injured,
    Safe,
    Deceased,
    Unknown,
}

/// A victim awaiting rescue.
///
/// `priority_score` is derived by the prioritizer and forced to zero once
/// `is_rescued` holds; a rescued victim is always `Safe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Victim {
    pub id: Uuid,
    pub location: Coordinate,
    pub injury_severity: InjurySeverity,
    pub time_since_incident_minutes: u32,
    pub estimated_survival_window_minutes: u32,
    pub status: VictimStatus,
    /// Risk associated with reaching this victim, in [0, 1]
    pub accessibility_risk: f64,
    /// Derived rescue priority, in [0, 1]
    pub priority_score: f64,
    pub is_rescued: bool,
    pub assigned_agent_id: Option<Uuid>,
}

impl Victim {
    /// Remaining survival budget; negative when the window is exhausted
    pub fn time_remaining_minutes(&self) -> i64 {
        i64::from(self.estimated_survival_window_minutes)
            - i64::from(self.time_since_incident_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_remaining() {
        let v = Victim {
            id: Uuid::new_v4(),
            location: Coordinate::new(0, 0),
            injury_severity: InjurySeverity::Moderate,
            time_since_incident_minutes: 100,
            estimated_survival_window_minutes: 160,
            status: VictimStatus::Trapped,
            accessibility_risk: 0.2,
            priority_score: 0.0,
            is_rescued: false,
            assigned_agent_id: None,
        };
        assert_eq!(v.time_remaining_minutes(), 60);
    }
}
