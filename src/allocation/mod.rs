//! Victim-to-agent allocation
//!
//! Greedy pass over the prioritized victim list: each victim is bound to
//! the nearest idle, extraction-capable agent, which is then removed from
//! the candidate pool for the rest of the cycle. Bindings are symmetric.
//! The actual route and risk are filled in later by the planner.

use uuid::Uuid;

use crate::models::{Agent, AgentTask, Victim};

/// Seconds of travel assumed per grid cell for the provisional estimate
const SECONDS_PER_CELL: u64 = 10;

/// The task kind emitted for every binding
pub const RESCUE_TASK_KIND: &str = "rescue_victim";

/// One victim bound to one agent for this planning cycle
#[derive(Debug, Clone)]
pub struct Assignment {
    pub agent_id: Uuid,
    pub task: AgentTask,
}

/// Greedy nearest-agent allocator
#[derive(Debug, Clone, Default)]
pub struct AgentAllocator;

impl AgentAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Bind prioritized victims to available agents.
    ///
    /// `victims` must already be in priority order. Bindings are written
    /// into both tables (`victim.assigned_agent_id`,
    /// `agent.assigned_victim_id`). Victims left unbound when the agent
    /// pool runs dry stay available for later cycles.
    pub fn allocate(&self, victims: &mut [Victim], agents: &mut [Agent]) -> Vec<Assignment> {
        let mut candidates: Vec<usize> = agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_available_for_rescue())
            .map(|(i, _)| i)
            .collect();

        let mut assignments = Vec::new();
        if candidates.is_empty() {
            tracing::debug!("no extraction-capable idle agents available");
            return assignments;
        }

        for victim in victims.iter_mut() {
            if victim.is_rescued || victim.assigned_agent_id.is_some() {
                continue;
            }
            if candidates.is_empty() {
                break;
            }

            // Nearest candidate wins; ties go to the earliest agent in the
            // input roster.
            let mut best: Option<(usize, u32)> = None;
            for (slot, &agent_idx) in candidates.iter().enumerate() {
                let distance = agents[agent_idx]
                    .current_location
                    .manhattan_distance(victim.location);
                if best.map(|(_, d)| distance < d).unwrap_or(true) {
                    best = Some((slot, distance));
                }
            }
            let Some((slot, distance)) = best else {
                continue;
            };
            let agent_idx = candidates.remove(slot);
            let agent = &mut agents[agent_idx];

            agent.assigned_victim_id = Some(victim.id);
            victim.assigned_agent_id = Some(agent.id);

            assignments.push(Assignment {
                agent_id: agent.id,
                task: AgentTask {
                    kind: RESCUE_TASK_KIND.to_string(),
                    target_location: Some(victim.location),
                    victim_id: Some(victim.id),
                    path_to_target: Vec::new(),
                    expected_risk_exposure: victim.accessibility_risk,
                    estimated_time_seconds: (u64::from(distance) * SECONDS_PER_CELL).max(1),
                },
            });
            tracing::debug!(
                victim_id = %victim.id,
                agent = %agent.name,
                distance,
                "victim assigned"
            );
        }
        assignments
    }
}
