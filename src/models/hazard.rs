//! Hazard and per-cell risk types

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::Coordinate;

/// Closed set of hazard kinds present in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Fire,
    Collapse,
    Flood,
    GasLeak,
    Debris,
}

impl HazardKind {
    pub const ALL: [HazardKind; 5] = [
        HazardKind::Fire,
        HazardKind::Collapse,
        HazardKind::Flood,
        HazardKind::GasLeak,
        HazardKind::Debris,
    ];
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fire => write!(f, "fire"),
            Self::Collapse => write!(f, "collapse"),
            Self::Flood => write!(f, "flood"),
            Self::GasLeak => write!(f, "gas_leak"),
            Self::Debris => write!(f, "debris"),
        }
    }
}

/// An active hazard. Only `intensity` may change after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: Uuid,
    pub kind: HazardKind,
    pub location: Coordinate,
    /// Severity in [0, 1]
    pub intensity: f64,
    /// Diamond-shaped radius of effect, in cells
    pub radius: u32,
    /// Whether the hazard's properties can change over time
    pub dynamic: bool,
}

/// Categorized risk bands for a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Derived risk at a single grid cell. Recomputed wholesale, never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRisk {
    pub coordinate: Coordinate,
    /// Aggregate risk in [0, 1]
    pub total_risk: f64,
    /// The kind judged to contribute most at this cell
    pub dominant_hazard: Option<HazardKind>,
    pub risk_level: RiskLevel,
}

impl NodeRisk {
    /// Zero-risk cell, the state before any hazard is applied
    pub fn quiet(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            total_risk: 0.0,
            dominant_hazard: None,
            risk_level: RiskLevel::Low,
        }
    }
}
