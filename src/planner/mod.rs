//! Risk-weighted route planning
//!
//! A* over the 4-connected passable grid. Movement costs one unit per
//! step; risk accumulates along the path from the risk field and, under
//! the `minimize_risk_exposure` objective, is folded into the heuristic at
//! a 100x scale so the search prefers safe detours.
//!
//! The risk term makes that heuristic inadmissible: it reflects risk
//! already accumulated rather than an estimate of what remains, so the
//! returned route is biased toward safety instead of guaranteed-shortest.
//! This is a deliberate trade-off.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::environment::Environment;
use crate::models::{Agent, AgentPlan, AgentTask, Coordinate, PlanningObjective};
use crate::risk::RiskField;

/// Scale magnifying accumulated risk inside the risk-averse heuristic
const RISK_EMPHASIS: f64 = 100.0;

/// A found route with its accumulated cost and risk
#[derive(Debug, Clone)]
pub struct Route {
    pub path: Vec<Coordinate>,
    pub total_cost: f64,
    pub total_risk: f64,
}

/// Entry in the A* open set. Min-ordered by `f`, then `g`, then insertion
/// sequence.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    g: f64,
    seq: u64,
    coord: Coordinate,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.g == other.g && self.seq == other.seq
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on every key for min-heap behavior in BinaryHeap
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.g.partial_cmp(&self.g).unwrap_or(Ordering::Equal))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The route planner for one mission
#[derive(Debug, Clone, Default)]
pub struct RoutePlanner;

impl RoutePlanner {
    pub fn new() -> Self {
        Self
    }

    /// Produce a single-task plan for an agent.
    ///
    /// On success the task is updated in place with the found path, its
    /// accumulated risk and a time estimate of one second per unit cost.
    /// Returns `None` when the target is unreachable; that is an outcome,
    /// not an error.
    pub fn plan_task(
        &self,
        agent: &Agent,
        task: &mut AgentTask,
        env: &Environment,
        field: &RiskField,
        objective: PlanningObjective,
    ) -> Option<AgentPlan> {
        let goal = match task.target_location {
            Some(goal) => goal,
            None => {
                tracing::warn!(agent_id = %agent.id, "task has no target location");
                return None;
            }
        };

        let route = self.find_route(env, field, agent.current_location, goal, objective)?;

        let estimated_seconds = route.total_cost.ceil() as u64;
        task.path_to_target = route.path;
        task.expected_risk_exposure = route.total_risk;
        task.estimated_time_seconds = estimated_seconds;

        Some(AgentPlan {
            agent_id: agent.id,
            tasks: vec![task.clone()],
            total_estimated_time_seconds: estimated_seconds,
            total_expected_risk: route.total_risk,
        })
    }

    /// A* search from `start` to `goal`
    pub fn find_route(
        &self,
        env: &Environment,
        field: &RiskField,
        start: Coordinate,
        goal: Coordinate,
        objective: PlanningObjective,
    ) -> Option<Route> {
        if !env.is_passable(start) || !env.is_passable(goal) {
            return None;
        }

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<Coordinate, Coordinate> = HashMap::new();
        let mut g_score: HashMap<Coordinate, f64> = HashMap::new();
        let mut risk_score: HashMap<Coordinate, f64> = HashMap::new();
        let mut seq: u64 = 0;

        g_score.insert(start, 0.0);
        risk_score.insert(start, 0.0);
        open.push(OpenNode {
            f: heuristic(start, goal, objective, 0.0),
            g: 0.0,
            seq,
            coord: start,
        });

        while let Some(node) = open.pop() {
            let current = node.coord;
            if node.g > g_score.get(&current).copied().unwrap_or(f64::INFINITY) {
                continue; // stale entry
            }
            if current == goal {
                let path = reconstruct_path(&came_from, current);
                return Some(Route {
                    path,
                    total_cost: g_score[&current],
                    total_risk: risk_score[&current],
                });
            }

            for neighbor in env.neighbors(current) {
                let tentative_g = g_score[&current] + 1.0;
                let cell_risk = field.risk_at(neighbor);
                let accumulated_risk = (risk_score[&current] + cell_risk).min(1.0);

                let known_g = g_score.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative_g < known_g {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);
                    risk_score.insert(neighbor, accumulated_risk);
                    seq += 1;
                    open.push(OpenNode {
                        f: tentative_g + heuristic(neighbor, goal, objective, accumulated_risk),
                        g: tentative_g,
                        seq,
                        coord: neighbor,
                    });
                }
            }
        }
        None
    }
}

/// Heuristic cost-to-goal for the given objective.
///
/// `minimize_risk_exposure` adds `100 × accumulated_risk` on top of the
/// Manhattan distance; every other objective uses the distance alone.
fn heuristic(
    current: Coordinate,
    goal: Coordinate,
    objective: PlanningObjective,
    accumulated_risk: f64,
) -> f64 {
    let mut h = f64::from(current.manhattan_distance(goal));
    if objective == PlanningObjective::MinimizeRiskExposure {
        h += accumulated_risk * RISK_EMPHASIS;
    }
    h
}

fn reconstruct_path(
    came_from: &HashMap<Coordinate, Coordinate>,
    mut current: Coordinate,
) -> Vec<Coordinate> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        current = previous;
        path.push(current);
    }
    path.reverse();
    path
}
