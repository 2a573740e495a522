//! Aegis: risk-aware disaster response planning engine
//!
//! A deterministic, in-memory planning core: given a grid-shaped disaster
//! environment it computes a scalar risk field over every cell, ranks
//! victims by rescue priority, allocates them to capable agents and plans
//! a risk-weighted route per binding. Missions are isolated state
//! containers behind a concurrent registry, and every operation is exposed
//! as a request/response call suitable for hosting behind any network
//! façade.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use aegis::core::config::AegisConfig;
//! use aegis::mission::MissionOrchestrator;
//! use aegis::models::{PlanRequest, SimulateRequest};
//!
//! # async fn run() -> aegis::core::error::Result<()> {
//! let orchestrator = MissionOrchestrator::new(Arc::new(AegisConfig::default()));
//! let sim = orchestrator
//!     .initiate_simulation(SimulateRequest { seed: Some(42), ..Default::default() })
//!     .await?;
//! let plan = orchestrator
//!     .generate_plan(sim.mission_id, PlanRequest::default())
//!     .await?;
//! println!("planned {} agent routes", plan.agent_plans.len());
//! # Ok(())
//! # }
//! ```

pub mod allocation;
pub mod api;
pub mod core;
pub mod environment;
pub mod explain;
pub mod metrics;
pub mod mission;
pub mod models;
pub mod planner;
pub mod prioritization;
pub mod risk;

pub use crate::core::config::AegisConfig;
pub use crate::core::error::{AegisError, Result};
pub use crate::environment::Environment;
pub use crate::mission::{MissionOrchestrator, MissionRegistry, MissionState};
pub use crate::planner::RoutePlanner;
pub use crate::prioritization::VictimPrioritizer;
pub use crate::risk::{RiskField, RiskModel};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
