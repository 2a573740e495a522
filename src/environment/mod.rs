//! Disaster environment: grid, hazards and victims
//!
//! The environment owns the grid together with its hazard and victim tables
//! and the seeded RNG used to generate them. All randomness for a mission
//! flows through this single RNG so that identical seeds replay the exact
//! same world, agent spawn points included.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::core::error::{AegisError, Result};
use crate::models::{
    AgentKind, Coordinate, GridNode, Hazard, HazardKind, InjurySeverity, SimulateRequest, Victim,
    VictimStatus,
};

/// Fraction of grid cells that may receive a hazard at full intensity
const HAZARD_DENSITY: f64 = 0.05;

/// Agent kinds eligible for automatic deployment
const DEPLOYABLE_KINDS: [AgentKind; 3] = [
    AgentKind::RoboticArm,
    AgentKind::Drone,
    AgentKind::UnmannedGroundVehicle,
];

/// The disaster grid and everything placed on it
#[derive(Debug, Clone)]
pub struct Environment {
    mission_id: Uuid,
    size: u32,
    grid: Vec<GridNode>,
    hazards: Vec<Hazard>,
    victims: Vec<Victim>,
    rng: StdRng,
}

impl Environment {
    /// Create an empty all-passable grid of `size x size` cells.
    ///
    /// Fails with `InvalidParameters` when `size` is zero. The tighter
    /// wire-level bounds are enforced on the request before this is
    /// reached.
    pub fn new(mission_id: Uuid, size: u32, seed: Option<i64>) -> Result<Self> {
        if size == 0 {
            return Err(AegisError::invalid_parameters("map_size must be at least 1"));
        }
        let mut grid = Vec::with_capacity((size as usize).pow(2));
        for y in 0..size {
            for x in 0..size {
                grid.push(GridNode::passable(Coordinate::new(x, y)));
            }
        }
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s as u64),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            mission_id,
            size,
            grid,
            hazards: Vec::new(),
            victims: Vec::new(),
            rng,
        })
    }

    /// Build a fully populated environment from a simulation request.
    /// Deterministic for a given seed.
    pub fn generate(request: &SimulateRequest, mission_id: Uuid) -> Result<Self> {
        if !(0.0..=1.0).contains(&request.hazard_intensity_factor) {
            return Err(AegisError::invalid_parameters(format!(
                "hazard_intensity_factor must be within [0, 1], got {}",
                request.hazard_intensity_factor
            )));
        }
        let mut env = Self::new(mission_id, request.map_size, request.seed)?;
        env.generate_hazards(request.hazard_intensity_factor);
        env.place_victims(request.num_victims)?;
        tracing::info!(
            mission_id = %mission_id,
            size = env.size,
            hazards = env.hazards.len(),
            victims = env.victims.len(),
            "environment generated"
        );
        Ok(env)
    }

    /// Scatter hazards over the grid. The count scales with grid area and
    /// the intensity factor; duplicate coordinates are rejected, so the
    /// final count may fall short of the target.
    fn generate_hazards(&mut self, intensity_factor: f64) {
        let target =
            ((self.size as f64).powi(2) * intensity_factor * HAZARD_DENSITY).floor() as usize;
        let max_radius = (self.size / 5).min(5).max(1);

        for _ in 0..target {
            let x = self.rng.gen_range(0..self.size);
            let y = self.rng.gen_range(0..self.size);
            let location = Coordinate::new(x, y);
            if self.hazards.iter().any(|h| h.location == location) {
                continue;
            }
            let kind = HazardKind::ALL[self.rng.gen_range(0..HazardKind::ALL.len())];
            let intensity = self.rng.gen_range(0.1..1.0) * intensity_factor;
            let radius = self.rng.gen_range(1..=max_radius);
            self.hazards.push(Hazard {
                id: Uuid::new_v4(),
                kind,
                location,
                intensity,
                radius,
                dynamic: true,
            });
        }
    }

    /// Place victims on distinct passable cells
    fn place_victims(&mut self, num_victims: u32) -> Result<()> {
        if num_victims > 0 && !self.grid.iter().any(|n| n.is_passable) {
            return Err(AegisError::service_init(
                "environment",
                "no passable coordinates available for victim placement",
            ));
        }
        let attempt_budget = (self.size as usize).pow(2) * 16;

        for _ in 0..num_victims {
            let mut attempts = 0;
            let location = loop {
                let x = self.rng.gen_range(0..self.size);
                let y = self.rng.gen_range(0..self.size);
                let candidate = Coordinate::new(x, y);
                let occupied = self.victims.iter().any(|v| v.location == candidate);
                if !occupied && self.is_passable(candidate) {
                    break candidate;
                }
                attempts += 1;
                if attempts > attempt_budget {
                    return Err(AegisError::service_init(
                        "environment",
                        "unable to find a free passable cell for a victim",
                    ));
                }
            };

            let severity = InjurySeverity::ALL[self.rng.gen_range(0..InjurySeverity::ALL.len())];
            let time_since = self.rng.gen_range(10..=120u32);
            let survival_window = self.rng.gen_range(time_since + 30..=time_since + 360);
            let accessibility_risk = self.rng.gen_range(0.1..0.8);

            self.victims.push(Victim {
                id: Uuid::new_v4(),
                location,
                injury_severity: severity,
                time_since_incident_minutes: time_since,
                estimated_survival_window_minutes: survival_window,
                status: VictimStatus::Trapped,
                accessibility_risk,
                priority_score: 0.0,
                is_rescued: false,
                assigned_agent_id: None,
            });
        }
        Ok(())
    }

    pub fn mission_id(&self) -> Uuid {
        self.mission_id
    }

    /// Side length of the square grid
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn in_bounds(&self, coord: Coordinate) -> bool {
        coord.x < self.size && coord.y < self.size
    }

    pub fn node(&self, coord: Coordinate) -> Option<&GridNode> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.grid
            .get(coord.y as usize * self.size as usize + coord.x as usize)
    }

    pub fn is_passable(&self, coord: Coordinate) -> bool {
        self.node(coord).map(|n| n.is_passable).unwrap_or(false)
    }

    /// The up-to-four 4-connected, in-bounds, passable neighbors of a cell.
    /// Order is fixed (east, west, north, south) for deterministic replay.
    pub fn neighbors(&self, coord: Coordinate) -> Vec<Coordinate> {
        let mut neighbors = Vec::with_capacity(4);
        let candidates = [
            (coord.x.checked_add(1), Some(coord.y)),
            (coord.x.checked_sub(1), Some(coord.y)),
            (Some(coord.x), coord.y.checked_add(1)),
            (Some(coord.x), coord.y.checked_sub(1)),
        ];
        for (x, y) in candidates {
            if let (Some(x), Some(y)) = (x, y) {
                let candidate = Coordinate::new(x, y);
                if self.is_passable(candidate) {
                    neighbors.push(candidate);
                }
            }
        }
        neighbors
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn hazard(&self, id: Uuid) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id)
    }

    /// Register an additional hazard, e.g. from a live assessment feed
    pub fn insert_hazard(&mut self, hazard: Hazard) {
        self.hazards.push(hazard);
    }

    /// Update the intensity of a dynamic hazard
    pub fn set_hazard_intensity(&mut self, id: Uuid, intensity: f64) -> Result<&Hazard> {
        if !(0.0..=1.0).contains(&intensity) {
            return Err(AegisError::invalid_parameters(format!(
                "intensity must be within [0, 1], got {}",
                intensity
            )));
        }
        let hazard = self
            .hazards
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(AegisError::InvalidParameters {
                message: format!("hazard {} not found", id),
            })?;
        hazard.intensity = intensity;
        Ok(hazard)
    }

    pub fn victims(&self) -> &[Victim] {
        &self.victims
    }

    pub fn victim(&self, id: Uuid) -> Option<&Victim> {
        self.victims.iter().find(|v| v.id == id)
    }

    pub fn victim_mut(&mut self, id: Uuid) -> Option<&mut Victim> {
        self.victims.iter_mut().find(|v| v.id == id)
    }

    /// Register an additional victim, e.g. discovered during search
    pub fn insert_victim(&mut self, victim: Victim) {
        self.victims.push(victim);
    }

    /// Update a victim's status; reaching `Safe` marks the rescue complete
    pub fn set_victim_status(&mut self, id: Uuid, status: VictimStatus) -> Result<&Victim> {
        let victim = self
            .victims
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(AegisError::VictimNotFound { entity_id: id })?;
        victim.status = status;
        if status == VictimStatus::Safe {
            victim.is_rescued = true;
        }
        Ok(victim)
    }

    /// Draw a uniformly random passable coordinate
    pub fn random_passable_coordinate(&mut self) -> Result<Coordinate> {
        let passable: Vec<Coordinate> = self
            .grid
            .iter()
            .filter(|n| n.is_passable)
            .map(|n| n.coordinate)
            .collect();
        if passable.is_empty() {
            return Err(AegisError::service_init(
                "environment",
                "no passable coordinates found in the environment",
            ));
        }
        Ok(passable[self.rng.gen_range(0..passable.len())])
    }

    /// Draw an agent kind for automatic deployment
    pub fn sample_agent_kind(&mut self) -> AgentKind {
        DEPLOYABLE_KINDS[self.rng.gen_range(0..DEPLOYABLE_KINDS.len())]
    }
}
