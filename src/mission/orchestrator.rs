//! Mission orchestration
//!
//! The orchestrator owns the mission lifecycle and sequences the engines
//! for every planning cycle: risk recompute, victim prioritization, task
//! allocation, route planning. CPU kernels run on the bounded compute
//! pool; all state mutation happens while holding the mission's lock, so
//! overlapping requests for the same mission serialize and later callers
//! observe earlier commits.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::Assignment;
use crate::core::config::AegisConfig;
use crate::core::error::Result;
use crate::core::runtime::ComputePool;
use crate::environment::Environment;
use crate::explain::ExplainabilityEngine;
use crate::models::{
    Agent, AgentCapability, AgentStatus, ExplanationRequest, ExplainabilityOutput, MetricType,
    MetricsSummary, Mission, MissionStatus, Plan, PlanRequest, PlanResponse, SimulateRequest,
    SimulateResponse, StepReport, Victim, VictimStatus,
};
use crate::risk::RiskModel;

use super::registry::MissionRegistry;
use super::state::MissionState;

/// Orchestrates mission lifecycle and planning cycles
pub struct MissionOrchestrator {
    config: Arc<AegisConfig>,
    registry: Arc<MissionRegistry>,
    pool: ComputePool,
    explainer: ExplainabilityEngine,
}

impl MissionOrchestrator {
    pub fn new(config: Arc<AegisConfig>) -> Self {
        let pool = ComputePool::new(config.runtime.max_workers);
        Self {
            config,
            registry: Arc::new(MissionRegistry::new()),
            pool,
            explainer: ExplainabilityEngine::default(),
        }
    }

    /// Swap in a different explanation backend
    pub fn with_explainer(mut self, explainer: ExplainabilityEngine) -> Self {
        self.explainer = explainer;
        self
    }

    pub fn registry(&self) -> &Arc<MissionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &AegisConfig {
        &self.config
    }

    /// Initiate a new disaster simulation with a generated mission id
    pub async fn initiate_simulation(&self, request: SimulateRequest) -> Result<SimulateResponse> {
        self.initiate_simulation_with_id(request, None).await
    }

    /// Initiate a simulation under a caller-chosen mission id. A duplicate
    /// id fails with `MissionConflict`.
    pub async fn initiate_simulation_with_id(
        &self,
        request: SimulateRequest,
        mission_id: Option<Uuid>,
    ) -> Result<SimulateResponse> {
        request.validate()?;
        let mission_id = mission_id.unwrap_or_else(Uuid::new_v4);
        if self.registry.contains(mission_id).await {
            return Err(crate::core::error::AegisError::MissionConflict {
                entity_id: mission_id,
            });
        }

        let generation_request = request.clone();
        let mut environment = self
            .pool
            .run(move || Environment::generate(&generation_request, mission_id))
            .await??;

        let mut agents = Vec::with_capacity(request.num_agents as usize);
        for _ in 0..request.num_agents {
            let location = environment.random_passable_coordinate()?;
            let kind = environment.sample_agent_kind();
            let id = Uuid::new_v4();
            agents.push(Agent {
                id,
                name: format!("Agent-{}", &id.simple().to_string()[..4]),
                kind,
                current_location: location,
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
            });
        }

        let mut mission = Mission::new(mission_id, format!("Simulation {}", mission_id));
        mission.assigned_agent_ids = agents.iter().map(|a| a.id).collect();
        mission.victims_identified = environment.victims().iter().map(|v| v.id).collect();

        let risk_model = RiskModel::new(self.config.risk.clone());
        let (environment, initial_field) = self
            .pool
            .run(move || {
                let field = risk_model.recompute(&environment);
                (environment, field)
            })
            .await?;

        let mut state = MissionState::new(mission, environment, initial_field, &self.config);
        state.agents = agents;
        self.registry.add(mission_id, state).await?;

        info!(
            mission_id = %mission_id,
            map_size = request.map_size,
            agents = request.num_agents,
            victims = request.num_victims,
            "simulation initiated"
        );
        Ok(SimulateResponse {
            mission_id,
            message: "Simulation initiated successfully.".to_string(),
        })
    }

    /// Run one planning cycle for a mission: prioritize remaining victims,
    /// allocate them to idle agents and compute a risk-weighted route per
    /// binding. The resulting plan is stored on the mission state.
    pub async fn generate_plan(
        &self,
        mission_id: Uuid,
        request: PlanRequest,
    ) -> Result<PlanResponse> {
        let handle = self.registry.get(mission_id).await?;
        let mut state = handle.lock().await;
        state.ensure_plannable()?;

        // 1. Refresh the risk field when the caller signals changed hazards
        if request.replan {
            let environment = state.environment.clone();
            let model = state.risk_model.clone();
            let field = self.pool.run(move || model.recompute(&environment)).await?;
            state.replace_risk_field(field);
        }

        // 2. Prioritize the victims still awaiting rescue
        let field = Arc::clone(&state.risk_field);
        let prioritizer = state.prioritizer.clone();
        let pending: Vec<Victim> = state
            .environment
            .victims()
            .iter()
            .filter(|v| !v.is_rescued)
            .cloned()
            .collect();
        let prioritized = self
            .pool
            .run(move || {
                let mut victims = pending;
                prioritizer.prioritize(&mut victims, &field);
                victims
            })
            .await?;
        for victim in &prioritized {
            if let Some(owned) = state.environment.victim_mut(victim.id) {
                owned.priority_score = victim.priority_score;
            }
        }
        let victims_prioritized_order: Vec<Uuid> = prioritized.iter().map(|v| v.id).collect();

        // 3. Bind top-priority victims to available agents
        let allocator = state.allocator.clone();
        let agents_snapshot = state.agents.clone();
        let assignments = self
            .pool
            .run(move || {
                let mut victims = prioritized;
                let mut agents = agents_snapshot;
                allocator.allocate(&mut victims, &mut agents)
            })
            .await?;
        for assignment in &assignments {
            if let Some(victim_id) = assignment.task.victim_id {
                if let Some(victim) = state.environment.victim_mut(victim_id) {
                    victim.assigned_agent_id = Some(assignment.agent_id);
                }
                state.agent_mut(assignment.agent_id)?.assigned_victim_id = Some(victim_id);
            }
        }

        // 4. Compute a route per binding, in allocation order
        let environment = Arc::new(state.environment.clone());
        let field = Arc::clone(&state.risk_field);
        let objective = request.planning_objective;

        let mut agent_plans = Vec::new();
        let mut risk_sum = 0.0;
        let mut time_sum: u64 = 0;

        for Assignment { agent_id, task } in assignments {
            let agent = state.agent(agent_id)?.clone();
            let environment = Arc::clone(&environment);
            let field = Arc::clone(&field);
            let planner = state.planner.clone();

            let outcome = self
                .pool
                .run(move || {
                    let mut task = task;
                    planner
                        .plan_task(&agent, &mut task, &environment, &field, objective)
                        .map(|plan| (plan, task))
                })
                .await?;

            match outcome {
                Some((plan, task)) => {
                    risk_sum += plan.total_expected_risk;
                    time_sum += plan.total_estimated_time_seconds;
                    let agent = state.agent_mut(agent_id)?;
                    agent.status = AgentStatus::Moving;
                    agent.current_path = task.path_to_target.clone();
                    agent_plans.push(plan);
                }
                None => {
                    warn!(mission_id = %mission_id, agent_id = %agent_id, "no route to target, agent left idle");
                }
            }
        }

        // 5. Aggregate and commit
        let plan_count = agent_plans.len() as f64;
        let (avg_risk, avg_time) = if plan_count > 0.0 {
            (risk_sum / plan_count, time_sum as f64 / plan_count)
        } else {
            (0.0, 0.0)
        };
        let efficiency_denominator = avg_time + avg_risk * 100.0;
        let overall_efficiency_score = if efficiency_denominator > 0.0 {
            (1.0 / efficiency_denominator).min(1.0)
        } else {
            0.0
        };

        let plan = Plan {
            id: Uuid::new_v4(),
            mission_id,
            timestamp: Utc::now(),
            agent_plans: agent_plans.clone(),
            victims_to_rescue_order: victims_prioritized_order.clone(),
            overall_risk_score: avg_risk,
            overall_efficiency_score,
        };
        let plan_id = plan.id;
        state.current_plan = Some(plan);
        state
            .metrics
            .record(MetricType::AggregateRiskExposure, avg_risk);
        state
            .metrics
            .record(MetricType::EfficiencyIndex, overall_efficiency_score);

        info!(
            mission_id = %mission_id,
            plan_id = %plan_id,
            agent_plans = agent_plans.len(),
            avg_risk,
            "plan generated"
        );
        Ok(PlanResponse {
            plan_id,
            mission_id,
            agent_plans,
            victims_prioritized_order,
            message: "Plan generated successfully.".to_string(),
        })
    }

    /// Advance the simulation by one tick: every moving agent takes one
    /// step along its path; agents arriving at their assigned victim
    /// complete the rescue. In-memory mutation only.
    pub async fn step_simulation(&self, mission_id: Uuid) -> Result<StepReport> {
        let handle = self.registry.get(mission_id).await?;
        let mut state = handle.lock().await;
        state.ensure_plannable()?;

        let mut agents_advanced = 0u64;
        let mut victims_rescued = Vec::new();

        let MissionState {
            mission,
            environment,
            agents,
            ..
        } = &mut *state;

        for agent in agents.iter_mut() {
            if agent.status != AgentStatus::Moving || agent.current_path.is_empty() {
                continue;
            }
            if agent.current_path.len() > 1 {
                agent.current_path.remove(0);
                agent.current_location = agent.current_path[0];
                agents_advanced += 1;
            }
            if agent.current_path.len() > 1 {
                continue;
            }
            // Path exhausted: check for an arrival rescue
            let Some(victim_id) = agent.assigned_victim_id else {
                agent.status = AgentStatus::Idle;
                agent.current_path.clear();
                continue;
            };
            if let Some(victim) = environment.victim_mut(victim_id) {
                if victim.location == agent.current_location && !victim.is_rescued {
                    victim.status = VictimStatus::Safe;
                    victim.is_rescued = true;
                    victim.assigned_agent_id = None;
                    mission.victims_rescued.push(victim_id);
                    victims_rescued.push(victim_id);

                    agent.assigned_victim_id = None;
                    agent.status = AgentStatus::Idle;
                    agent.current_path.clear();
                }
            }
        }

        info!(
            mission_id = %mission_id,
            agents_advanced,
            rescued = victims_rescued.len(),
            "simulation stepped"
        );
        Ok(StepReport {
            mission_id,
            agents_advanced,
            victims_rescued,
            mission_status: state.mission.status,
        })
    }

    /// Build the KPI summary for a mission
    pub async fn get_metrics(&self, mission_id: Uuid) -> Result<MetricsSummary> {
        let handle = self.registry.get(mission_id).await?;
        let state = handle.lock().await;
        state.metrics.summary(&state.mission, state.current_plan.as_ref())
    }

    /// Produce an explanation for a mission decision
    pub async fn get_explanation(
        &self,
        request: ExplanationRequest,
    ) -> Result<ExplainabilityOutput> {
        let handle = self.registry.get(request.mission_id).await?;
        let state = handle.lock().await;
        self.explainer
            .explain(&state, request.explanation_type, request.decision_id)
            .await
    }

    /// Move a mission into a terminal state
    pub async fn close_mission(&self, mission_id: Uuid, status: MissionStatus) -> Result<()> {
        let handle = self.registry.get(mission_id).await?;
        let mut state = handle.lock().await;
        state.close(status)?;
        info!(mission_id = %mission_id, status = %status, "mission closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AegisError;
    use crate::models::{Coordinate, InjurySeverity, PlanningObjective};

    fn orchestrator() -> MissionOrchestrator {
        MissionOrchestrator::new(Arc::new(AegisConfig::default()))
    }

    fn quiet_request() -> SimulateRequest {
        SimulateRequest {
            map_size: 10,
            hazard_intensity_factor: 0.0,
            num_victims: 0,
            num_agents: 0,
            seed: Some(1),
        }
    }

    fn trapped_victim_at(x: u32, y: u32) -> Victim {
        Victim {
            id: Uuid::new_v4(),
            location: Coordinate::new(x, y),
            injury_severity: InjurySeverity::Severe,
            time_since_incident_minutes: 30,
            estimated_survival_window_minutes: 120,
            status: VictimStatus::Trapped,
            accessibility_risk: 0.3,
            priority_score: 0.0,
            is_rescued: false,
            assigned_agent_id: None,
        }
    }

    fn idle_agent_at(x: u32, y: u32) -> Agent {
        let id = Uuid::new_v4();
        Agent {
            id,
            name: format!("Agent-{}", &id.simple().to_string()[..4]),
            kind: crate::models::AgentKind::Drone,
            current_location: Coordinate::new(x, y),
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

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let orch = orchestrator();
        let mut request = quiet_request();
        request.map_size = 5;
        assert!(matches!(
            orch.initiate_simulation(request).await,
            Err(AegisError::InvalidParameters { .. })
        ));
    }

    #[tokio::test]
    async fn test_explicit_duplicate_mission_id_conflicts() {
        let orch = orchestrator();
        let id = Uuid::new_v4();
        orch.initiate_simulation_with_id(quiet_request(), Some(id))
            .await
            .unwrap();
        match orch
            .initiate_simulation_with_id(quiet_request(), Some(id))
            .await
        {
            Err(AegisError::MissionConflict { entity_id }) => assert_eq!(entity_id, id),
            other => panic!("expected conflict, got {:?}", other.map(|r| r.mission_id)),
        }
    }

    #[tokio::test]
    async fn test_plan_on_trivial_colocated_mission() {
        let orch = orchestrator();
        let response = orch.initiate_simulation(quiet_request()).await.unwrap();
        let mission_id = response.mission_id;

        // Inject an agent and a victim on the same cell
        let handle = orch.registry().get(mission_id).await.unwrap();
        {
            let mut state = handle.lock().await;
            state.environment.insert_victim(trapped_victim_at(0, 0));
            state.agents.push(idle_agent_at(0, 0));
        }

        let plan = orch
            .generate_plan(
                mission_id,
                PlanRequest {
                    planning_objective: PlanningObjective::MinimizeTime,
                    replan: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(plan.agent_plans.len(), 1);
        let agent_plan = &plan.agent_plans[0];
        assert_eq!(agent_plan.tasks.len(), 1);
        let task = &agent_plan.tasks[0];
        assert_eq!(task.path_to_target, vec![Coordinate::new(0, 0)]);
        assert_eq!(task.expected_risk_exposure, 0.0);
        assert_eq!(task.estimated_time_seconds, 0);

        let state = handle.lock().await;
        assert!(state.current_plan.is_some());
        assert_eq!(state.agents[0].status, AgentStatus::Moving);
    }

    #[tokio::test]
    async fn test_planning_rejected_after_close() {
        let orch = orchestrator();
        let response = orch.initiate_simulation(quiet_request()).await.unwrap();
        orch.close_mission(response.mission_id, MissionStatus::Cancelled)
            .await
            .unwrap();
        assert!(matches!(
            orch.generate_plan(response.mission_id, PlanRequest::default())
                .await,
            Err(AegisError::InvalidMissionState { .. })
        ));
        assert!(matches!(
            orch.step_simulation(response.mission_id).await,
            Err(AegisError::InvalidMissionState { .. })
        ));
    }

    #[tokio::test]
    async fn test_step_moves_agent_and_rescues_on_arrival() {
        let orch = orchestrator();
        let response = orch.initiate_simulation(quiet_request()).await.unwrap();
        let mission_id = response.mission_id;
        let handle = orch.registry().get(mission_id).await.unwrap();
        {
            let mut state = handle.lock().await;
            state.environment.insert_victim(trapped_victim_at(2, 0));
            state.agents.push(idle_agent_at(0, 0));
        }
        orch.generate_plan(mission_id, PlanRequest::default())
            .await
            .unwrap();

        let first = orch.step_simulation(mission_id).await.unwrap();
        assert_eq!(first.agents_advanced, 1);
        assert!(first.victims_rescued.is_empty());

        let second = orch.step_simulation(mission_id).await.unwrap();
        assert_eq!(second.agents_advanced, 1);
        assert_eq!(second.victims_rescued.len(), 1);

        let state = handle.lock().await;
        assert_eq!(state.agents[0].status, AgentStatus::Idle);
        assert_eq!(state.mission.victims_rescued.len(), 1);
        let victim = state.environment.victims()[0].clone();
        assert!(victim.is_rescued);
        assert_eq!(victim.status, VictimStatus::Safe);
    }

    #[tokio::test]
    async fn test_metrics_after_plan() {
        let orch = orchestrator();
        let response = orch.initiate_simulation(quiet_request()).await.unwrap();
        let mission_id = response.mission_id;
        let handle = orch.registry().get(mission_id).await.unwrap();
        {
            let mut state = handle.lock().await;
            state.environment.insert_victim(trapped_victim_at(3, 3));
            state.agents.push(idle_agent_at(0, 0));
        }
        orch.generate_plan(mission_id, PlanRequest::default())
            .await
            .unwrap();

        let summary = orch.get_metrics(mission_id).await.unwrap();
        assert_eq!(summary.mission_id, Some(mission_id));
        // Quiet grid: the planned route accumulates zero risk
        assert_eq!(summary.average_agent_risk_exposure, Some(0.0));
        assert!(summary.efficiency_index.unwrap() > 0.0);
    }
}
