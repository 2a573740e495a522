//! Risk field computation
//!
//! Aggregates per-hazard contributions over a diamond radius with distance
//! decay, then bleeds a fraction of each cell's risk into its passable
//! neighbors. The output is a dense field covering every grid cell,
//! replaced wholesale on each recompute so readers always observe a
//! consistent snapshot.

use serde::{Deserialize, Serialize};

use crate::core::config::RiskSettings;
use crate::environment::Environment;
use crate::models::{Coordinate, Hazard, HazardKind, NodeRisk, RiskLevel};

/// Thresholds mapping total risk to a band
const CRITICAL_THRESHOLD: f64 = 0.8;
const HIGH_THRESHOLD: f64 = 0.5;
const MEDIUM_THRESHOLD: f64 = 0.2;

/// Dense per-cell risk map for one grid snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskField {
    size: u32,
    nodes: Vec<NodeRisk>,
}

impl RiskField {
    fn quiet(size: u32) -> Self {
        let mut nodes = Vec::with_capacity((size as usize).pow(2));
        for y in 0..size {
            for x in 0..size {
                nodes.push(NodeRisk::quiet(Coordinate::new(x, y)));
            }
        }
        Self { size, nodes }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, coord: Coordinate) -> Option<&NodeRisk> {
        if coord.x >= self.size || coord.y >= self.size {
            return None;
        }
        self.nodes
            .get(coord.y as usize * self.size as usize + coord.x as usize)
    }

    fn get_mut(&mut self, coord: Coordinate) -> Option<&mut NodeRisk> {
        if coord.x >= self.size || coord.y >= self.size {
            return None;
        }
        self.nodes
            .get_mut(coord.y as usize * self.size as usize + coord.x as usize)
    }

    /// Total risk at a cell; zero outside the grid
    pub fn risk_at(&self, coord: Coordinate) -> f64 {
        self.get(coord).map(|n| n.total_risk).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeRisk> {
        self.nodes.iter()
    }
}

/// Categorize a total risk score
pub fn risk_level(total_risk: f64) -> RiskLevel {
    if total_risk >= CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if total_risk >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if total_risk >= MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// The risk computation engine for one mission
#[derive(Debug, Clone)]
pub struct RiskModel {
    settings: RiskSettings,
}

impl RiskModel {
    pub fn new(settings: RiskSettings) -> Self {
        Self { settings }
    }

    /// Base weight of a hazard kind
    pub fn weight(&self, kind: HazardKind) -> f64 {
        match kind {
            HazardKind::Fire => self.settings.fire_weight,
            HazardKind::Collapse => self.settings.collapse_weight,
            HazardKind::Flood => self.settings.flood_weight,
            HazardKind::GasLeak => self.settings.gas_leak_weight,
            HazardKind::Debris => self.settings.debris_weight,
        }
    }

    /// Recompute the full risk field from the environment's current
    /// hazards. Deterministic and idempotent: unchanged hazards yield an
    /// identical field.
    pub fn recompute(&self, env: &Environment) -> RiskField {
        let mut field = RiskField::quiet(env.size());

        for hazard in env.hazards() {
            self.apply_hazard(hazard, &mut field, env.size());
        }
        self.propagate(&mut field, env);

        for node in field.nodes.iter_mut() {
            node.risk_level = risk_level(node.total_risk);
        }
        field
    }

    /// Apply one hazard's contribution over its diamond radius
    fn apply_hazard(&self, hazard: &Hazard, field: &mut RiskField, size: u32) {
        let base_weight = self.weight(hazard.kind);
        let radius = hazard.radius as i64;

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let reach = dx.abs() + dy.abs();
                if reach > radius {
                    continue;
                }
                let tx = hazard.location.x as i64 + dx;
                let ty = hazard.location.y as i64 + dy;
                if tx < 0 || ty < 0 || tx >= size as i64 || ty >= size as i64 {
                    continue;
                }
                let target = Coordinate::new(tx as u32, ty as u32);

                let distance = reach.max(1) as f64;
                let decay = self.settings.decay_factor_base / distance;
                let contribution = hazard.intensity * base_weight * decay;

                if let Some(node) = field.get_mut(target) {
                    node.total_risk = (node.total_risk + contribution).min(1.0);

                    // Dominance compares this contribution against the raw
                    // base weight of the incumbent kind, not its stored
                    // contribution.
                    let incumbent_weight = node.dominant_hazard.map(|k| self.weight(k));
                    match incumbent_weight {
                        None => node.dominant_hazard = Some(hazard.kind),
                        Some(w) if contribution > w => node.dominant_hazard = Some(hazard.kind),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Bleed risk into passable neighbors. Each iteration works on a
    /// snapshot of the previous totals so propagation order cannot matter.
    fn propagate(&self, field: &mut RiskField, env: &Environment) {
        for _ in 0..self.settings.propagation_iterations {
            let mut new_totals: Vec<f64> = field.nodes.iter().map(|n| n.total_risk).collect();

            for node in field.nodes.iter() {
                if node.total_risk <= 0.0 {
                    continue;
                }
                let propagated = node.total_risk * self.settings.propagation_factor;
                for neighbor in env.neighbors(node.coordinate) {
                    let idx =
                        neighbor.y as usize * field.size as usize + neighbor.x as usize;
                    new_totals[idx] = new_totals[idx].max(propagated).min(1.0);
                }
            }

            for (node, total) in field.nodes.iter_mut().zip(new_totals) {
                node.total_risk = total;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AegisConfig;
    use crate::models::SimulateRequest;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn model() -> RiskModel {
        RiskModel::new(AegisConfig::default().risk)
    }

    fn empty_env(size: u32) -> Environment {
        Environment::new(Uuid::new_v4(), size, Some(1)).unwrap()
    }

    fn fire(location: Coordinate, intensity: f64, radius: u32) -> Hazard {
        Hazard {
            id: Uuid::new_v4(),
            kind: HazardKind::Fire,
            location,
            intensity,
            radius,
            dynamic: true,
        }
    }

    #[test]
    fn test_field_covers_entire_grid() {
        let env = empty_env(5);
        let field = model().recompute(&env);
        assert_eq!(field.len(), 25);
        for y in 0..5 {
            for x in 0..5 {
                assert!(field.get(Coordinate::new(x, y)).is_some());
            }
        }
        assert!(field.get(Coordinate::new(5, 5)).is_none());
    }

    #[test]
    fn test_no_hazards_means_zero_risk_everywhere() {
        let req = SimulateRequest {
            map_size: 10,
            hazard_intensity_factor: 0.0,
            num_victims: 0,
            num_agents: 0,
            seed: Some(1),
        };
        let env = Environment::generate(&req, Uuid::new_v4()).unwrap();
        let field = model().recompute(&env);
        for node in field.iter() {
            assert_eq!(node.total_risk, 0.0);
            assert_eq!(node.risk_level, RiskLevel::Low);
            assert!(node.dominant_hazard.is_none());
        }
    }

    #[test]
    fn test_single_fire_contribution_and_decay() {
        let mut env = empty_env(5);
        env.insert_hazard(fire(Coordinate::new(2, 2), 1.0, 2));
        let field = model().recompute(&env);

        // Center: intensity 1.0 * weight 0.8 / max(1, 0) = 0.8
        assert!((field.risk_at(Coordinate::new(2, 2)) - 0.8).abs() < 1e-9);
        // Distance 1: same 0.8 (decay 1/1)
        assert!((field.risk_at(Coordinate::new(3, 2)) - 0.8).abs() < 1e-9);
        // Distance 2: 0.8 / 2 = 0.4
        assert!((field.risk_at(Coordinate::new(4, 2)) - 0.4).abs() < 1e-9);
        // Outside the diamond but adjacent to 0.4-risk cells: one
        // propagation pass leaves 0.4 * 0.1
        assert!((field.risk_at(Coordinate::new(4, 3)) - 0.04).abs() < 1e-9);

        assert_eq!(
            field.get(Coordinate::new(2, 2)).unwrap().dominant_hazard,
            Some(HazardKind::Fire)
        );
    }

    #[test]
    fn test_total_risk_clamped_at_one() {
        let mut env = empty_env(3);
        // Stack several collapses on the same cell
        for _ in 0..5 {
            env.insert_hazard(Hazard {
                id: Uuid::new_v4(),
                kind: HazardKind::Collapse,
                location: Coordinate::new(1, 1),
                intensity: 1.0,
                radius: 1,
                dynamic: true,
            });
        }
        let field = model().recompute(&env);
        for node in field.iter() {
            assert!(node.total_risk <= 1.0);
            assert!(node.total_risk >= 0.0);
        }
        assert_eq!(field.risk_at(Coordinate::new(1, 1)), 1.0);
        assert_eq!(
            field.get(Coordinate::new(1, 1)).unwrap().risk_level,
            RiskLevel::Critical
        );
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(risk_level(0.0), RiskLevel::Low);
        assert_eq!(risk_level(0.19), RiskLevel::Low);
        assert_eq!(risk_level(0.2), RiskLevel::Medium);
        assert_eq!(risk_level(0.49), RiskLevel::Medium);
        assert_eq!(risk_level(0.5), RiskLevel::High);
        assert_eq!(risk_level(0.79), RiskLevel::High);
        assert_eq!(risk_level(0.8), RiskLevel::Critical);
        assert_eq!(risk_level(1.0), RiskLevel::Critical);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut env = empty_env(6);
        env.insert_hazard(fire(Coordinate::new(3, 3), 0.9, 2));
        env.insert_hazard(Hazard {
            id: Uuid::new_v4(),
            kind: HazardKind::GasLeak,
            location: Coordinate::new(1, 4),
            intensity: 0.5,
            radius: 1,
            dynamic: true,
        });
        let m = model();
        let a = m.recompute(&env);
        let b = m.recompute(&env);
        for (na, nb) in a.iter().zip(b.iter()) {
            assert_eq!(na.total_risk, nb.total_risk);
            assert_eq!(na.dominant_hazard, nb.dominant_hazard);
            assert_eq!(na.risk_level, nb.risk_level);
        }
    }

    #[test]
    fn test_propagation_respects_iteration_count() {
        let mut settings = AegisConfig::default().risk;
        settings.propagation_iterations = 2;
        let wide = RiskModel::new(settings);

        let mut env = empty_env(7);
        env.insert_hazard(fire(Coordinate::new(3, 3), 1.0, 1));

        let narrow_field = model().recompute(&env);
        let wide_field = wide.recompute(&env);

        // Two cells outside the diamond: reachable only by the second pass
        let distant = Coordinate::new(6, 3);
        assert_eq!(narrow_field.risk_at(distant), 0.0);
        let one_out = Coordinate::new(5, 3);
        assert!(narrow_field.risk_at(one_out) > 0.0);
        assert!(wide_field.risk_at(distant) > 0.0);
    }

    #[test]
    fn test_dominant_hazard_uses_raw_weight_comparison() {
        let mut env = empty_env(5);
        // Debris applied first claims the cell with weight 0.4
        env.insert_hazard(Hazard {
            id: Uuid::new_v4(),
            kind: HazardKind::Debris,
            location: Coordinate::new(2, 2),
            intensity: 1.0,
            radius: 1,
            dynamic: true,
        });
        // Fire contributes 0.9 * 0.8 = 0.72 > 0.4, so it takes over
        env.insert_hazard(fire(Coordinate::new(2, 2), 0.9, 1));
        let field = model().recompute(&env);
        assert_eq!(
            field.get(Coordinate::new(2, 2)).unwrap().dominant_hazard,
            Some(HazardKind::Fire)
        );
    }

    proptest! {
        #[test]
        fn prop_risk_always_clamped(intensity in 0.0f64..=1.0, radius in 0u32..4, x in 0u32..6, y in 0u32..6) {
            let mut env = empty_env(6);
            env.insert_hazard(fire(Coordinate::new(x, y), intensity, radius));
            env.insert_hazard(fire(Coordinate::new(x, y), intensity, radius));
            let field = model().recompute(&env);
            for node in field.iter() {
                prop_assert!(node.total_risk >= 0.0);
                prop_assert!(node.total_risk <= 1.0);
                prop_assert_eq!(node.risk_level, risk_level(node.total_risk));
            }
        }
    }
}
