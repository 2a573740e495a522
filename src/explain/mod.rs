//! Decision explanations (read-only over mission state)
//!
//! The core's contract with the explanation subsystem is a narrow one: a
//! text-generation model behind [`ExplanationModel`], fed a prompt built
//! from mission state the engine only ever reads. The default
//! [`TemplateModel`] is deterministic and offline so the core stays
//! self-contained; a hosting façade can plug in a real generative backend.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::error::{AegisError, Result};
use crate::mission::MissionState;
use crate::models::{ExplainabilityOutput, ExplanationType};

/// A text model that turns a decision prompt into a human-readable summary
/// plus a structured JSON explanation.
#[async_trait]
pub trait ExplanationModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<(String, Value)>;
}

/// Offline stand-in model producing deterministic template output
#[derive(Debug, Clone, Default)]
pub struct TemplateModel;

#[async_trait]
impl ExplanationModel for TemplateModel {
    async fn generate(&self, prompt: &str) -> Result<(String, Value)> {
        let summary = format!(
            "Decision rationale (template model): {}",
            prompt.chars().take(240).collect::<String>()
        );
        let structured = json!({
            "model": "template",
            "prompt": prompt,
            "confidence": 0.8,
        });
        Ok((summary, structured))
    }
}

/// Builds explanation outputs for mission decisions
pub struct ExplainabilityEngine {
    model: Box<dyn ExplanationModel>,
}

impl Default for ExplainabilityEngine {
    fn default() -> Self {
        Self {
            model: Box::new(TemplateModel),
        }
    }
}

impl ExplainabilityEngine {
    pub fn new(model: Box<dyn ExplanationModel>) -> Self {
        Self { model }
    }

    /// Produce an explanation for a mission decision.
    ///
    /// Requires only shared access to the mission state; nothing here
    /// mutates it.
    pub async fn explain(
        &self,
        state: &MissionState,
        explanation_type: ExplanationType,
        decision_id: Option<Uuid>,
    ) -> Result<ExplainabilityOutput> {
        match explanation_type {
            ExplanationType::VictimPrioritization => {
                self.explain_victim_prioritization(state, decision_id).await
            }
            ExplanationType::RouteSelection => self.explain_route_selection(state, decision_id).await,
            ExplanationType::MissionSummary => self.explain_mission_summary(state).await,
            ExplanationType::TradeOffAnalysis => self.explain_trade_off(state, decision_id).await,
            ExplanationType::TaskDecomposition => Err(AegisError::ExplanationNotImplemented {
                explanation_type: explanation_type.to_string(),
            }),
        }
    }

    async fn explain_victim_prioritization(
        &self,
        state: &MissionState,
        decision_id: Option<Uuid>,
    ) -> Result<ExplainabilityOutput> {
        let victim_id = decision_id.ok_or_else(|| {
            AegisError::invalid_explanation(
                "decision_id (victim ID) is required for victim prioritization explanations",
            )
        })?;
        let victim = state
            .environment
            .victim(victim_id)
            .ok_or(AegisError::VictimNotFound {
                entity_id: victim_id,
            })?;

        let decision_context = json!({
            "victim_id": victim.id,
            "injury_severity": victim.injury_severity,
            "time_since_incident_minutes": victim.time_since_incident_minutes,
            "estimated_survival_window_minutes": victim.estimated_survival_window_minutes,
            "accessibility_risk": victim.accessibility_risk,
            "priority_score": victim.priority_score,
        });

        let peer_scores: Vec<(Uuid, f64)> = state
            .environment
            .victims()
            .iter()
            .filter(|v| v.id != victim_id)
            .take(3)
            .map(|v| (v.id, v.priority_score))
            .collect();

        let prompt = format!(
            "Explain why victim {} at {} was prioritized. Injury severity {:?}, \
             estimated survival window {} minutes, accessibility risk {:.2}, \
             calculated priority score {:.2}. Peer scores: {:?}. Mission: {} ({}).",
            victim.id,
            victim.location,
            victim.injury_severity,
            victim.estimated_survival_window_minutes,
            victim.accessibility_risk,
            victim.priority_score,
            peer_scores,
            state.mission.name,
            state.mission.id,
        );

        self.finish(state, ExplanationType::VictimPrioritization, decision_context, &prompt)
            .await
    }

    async fn explain_route_selection(
        &self,
        state: &MissionState,
        decision_id: Option<Uuid>,
    ) -> Result<ExplainabilityOutput> {
        let agent_id = decision_id.ok_or_else(|| {
            AegisError::invalid_explanation(
                "decision_id (agent ID) is required for route selection explanations",
            )
        })?;
        let plan = state.current_plan.as_ref().ok_or_else(|| {
            AegisError::invalid_explanation("mission has no stored plan to explain")
        })?;
        let agent_plan = plan
            .agent_plans
            .iter()
            .find(|ap| ap.agent_id == agent_id)
            .filter(|ap| !ap.tasks.is_empty())
            .ok_or_else(|| {
                AegisError::invalid_explanation(format!(
                    "agent plan for ID {} not found or has no tasks",
                    agent_id
                ))
            })?;
        let agent = state.agent(agent_id)?;

        let first_task = &agent_plan.tasks[0];
        let segment: Vec<_> = if first_task.path_to_target.is_empty() {
            first_task
                .target_location
                .map(|goal| vec![agent.current_location, goal])
                .unwrap_or_else(|| vec![agent.current_location])
        } else {
            first_task.path_to_target.clone()
        };

        let decision_context = json!({
            "agent_id": agent.id,
            "task_type": first_task.kind,
            "target_location": first_task.target_location,
            "expected_risk": first_task.expected_risk_exposure,
            "path_length": segment.len(),
        });

        let prompt = format!(
            "Explain why agent {} ({}) was assigned the route from {} to {}. \
             Capabilities: {:?}. Expected risk along the path: {:.2}. Mission: {} ({}).",
            agent.name,
            agent.id,
            segment.first().map(|c| c.to_string()).unwrap_or_default(),
            segment.last().map(|c| c.to_string()).unwrap_or_default(),
            agent.capabilities,
            first_task.expected_risk_exposure,
            state.mission.name,
            state.mission.id,
        );

        self.finish(state, ExplanationType::RouteSelection, decision_context, &prompt)
            .await
    }

    async fn explain_mission_summary(&self, state: &MissionState) -> Result<ExplainabilityOutput> {
        let plan = state.current_plan.as_ref().ok_or_else(|| {
            AegisError::invalid_explanation("mission has no stored plan to summarize")
        })?;
        let metrics = state.metrics.summary(&state.mission, Some(plan))?;

        let decision_context = json!({
            "mission": state.mission,
            "final_plan": plan,
            "metrics_summary": metrics,
        });

        let prompt = format!(
            "Generate a summary for mission '{}' ({}). Status: {}. Started {}. \
             Victims rescued: {}. Overall plan risk {:.2}, efficiency {:.4}. \
             Focus on key outcomes, challenges and agent performance.",
            state.mission.name,
            state.mission.id,
            state.mission.status,
            state.mission.start_time.to_rfc3339(),
            state.mission.victims_rescued.len(),
            plan.overall_risk_score,
            plan.overall_efficiency_score,
        );

        self.finish(state, ExplanationType::MissionSummary, decision_context, &prompt)
            .await
    }

    async fn explain_trade_off(
        &self,
        state: &MissionState,
        decision_id: Option<Uuid>,
    ) -> Result<ExplainabilityOutput> {
        let decision_context = match decision_id {
            Some(id) => json!({
                "situation": format!("Trade-off related to decision {}", id),
                "decision_id": id,
            }),
            None => json!({
                "situation": "Prioritizing a high-risk, low-severity victim over a low-risk, high-severity victim",
                "options_considered": [
                    "Rescue high-risk, low-severity",
                    "Rescue low-risk, high-severity",
                ],
                "chosen_option": "Rescue high-risk, low-severity",
                "rationale": "Mitigating the immediate environmental threat to agent safety",
            }),
        };

        let prompt = format!(
            "Explain a critical trade-off made during mission '{}' ({}): {}",
            state.mission.name, state.mission.id, decision_context
        );

        self.finish(state, ExplanationType::TradeOffAnalysis, decision_context, &prompt)
            .await
    }

    async fn finish(
        &self,
        state: &MissionState,
        explanation_type: ExplanationType,
        decision_context: Value,
        prompt: &str,
    ) -> Result<ExplainabilityOutput> {
        let (human_readable_summary, structured_explanation_json) =
            self.model.generate(prompt).await?;
        Ok(ExplainabilityOutput {
            explanation_id: Uuid::new_v4(),
            mission_id: state.mission.id,
            explanation_type,
            decision_context,
            human_readable_summary,
            structured_explanation_json,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AegisConfig;
    use crate::environment::Environment;
    use crate::models::{Mission, SimulateRequest};
    use crate::risk::RiskModel;

    fn state_with_victims(num_victims: u32) -> MissionState {
        let config = AegisConfig::default();
        let id = Uuid::new_v4();
        let req = SimulateRequest {
            map_size: 10,
            hazard_intensity_factor: 0.2,
            num_victims,
            num_agents: 0,
            seed: Some(11),
        };
        let env = Environment::generate(&req, id).unwrap();
        let field = RiskModel::new(config.risk.clone()).recompute(&env);
        MissionState::new(Mission::new(id, "explain test"), env, field, &config)
    }

    #[tokio::test]
    async fn test_victim_prioritization_requires_decision_id() {
        let state = state_with_victims(1);
        let engine = ExplainabilityEngine::default();
        let err = engine
            .explain(&state, ExplanationType::VictimPrioritization, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_unknown_victim_is_404() {
        let state = state_with_victims(1);
        let engine = ExplainabilityEngine::default();
        let err = engine
            .explain(
                &state,
                ExplanationType::VictimPrioritization,
                Some(Uuid::new_v4()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AegisError::VictimNotFound { .. }));
    }

    #[tokio::test]
    async fn test_victim_explanation_output_shape() {
        let state = state_with_victims(2);
        let victim_id = state.environment.victims()[0].id;
        let engine = ExplainabilityEngine::default();
        let output = engine
            .explain(
                &state,
                ExplanationType::VictimPrioritization,
                Some(victim_id),
            )
            .await
            .unwrap();
        assert_eq!(output.mission_id, state.mission.id);
        assert_eq!(
            output.explanation_type,
            ExplanationType::VictimPrioritization
        );
        assert!(!output.human_readable_summary.is_empty());
        assert_eq!(
            output.decision_context["victim_id"],
            serde_json::to_value(victim_id).unwrap()
        );
    }

    #[tokio::test]
    async fn test_mission_summary_requires_plan() {
        let state = state_with_victims(0);
        let engine = ExplainabilityEngine::default();
        let err = engine
            .explain(&state, ExplanationType::MissionSummary, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AegisError::InvalidExplanationRequest { .. }));
    }

    #[tokio::test]
    async fn test_task_decomposition_is_not_implemented() {
        let state = state_with_victims(0);
        let engine = ExplainabilityEngine::default();
        let err = engine
            .explain(&state, ExplanationType::TaskDecomposition, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 501);
    }

    #[tokio::test]
    async fn test_trade_off_works_without_decision_id() {
        let state = state_with_victims(0);
        let engine = ExplainabilityEngine::default();
        let output = engine
            .explain(&state, ExplanationType::TradeOffAnalysis, None)
            .await
            .unwrap();
        assert_eq!(output.explanation_type, ExplanationType::TradeOffAnalysis);
    }
}
