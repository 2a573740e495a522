//! Per-mission metrics collection and KPI summaries

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::models::{Metric, MetricType, MetricsSummary, Mission, Plan};

/// Fallback KPI values reported before enough samples exist.
const DEFAULT_AVG_RISK_EXPOSURE: f64 = 0.15;
const DEFAULT_AGENT_UTILIZATION: f64 = 0.75;
const DEFAULT_EFFICIENCY_INDEX: f64 = 0.85;

/// Collects raw metric samples during a mission and aggregates them into
/// business-facing summaries.
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    mission_id: Uuid,
    samples: HashMap<MetricType, Vec<Metric>>,
}

impl MetricsRecorder {
    pub fn new(mission_id: Uuid) -> Self {
        Self {
            mission_id,
            samples: HashMap::new(),
        }
    }

    /// Record a single metric sample
    pub fn record(&mut self, name: MetricType, value: f64) {
        self.samples.entry(name).or_default().push(Metric {
            name,
            value,
            unit: None,
            timestamp: Utc::now(),
            mission_id: Some(self.mission_id),
        });
        tracing::debug!(mission_id = %self.mission_id, metric = %name, value, "metric recorded");
    }

    pub fn samples(&self, name: MetricType) -> &[Metric] {
        self.samples.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn average(&self, name: MetricType) -> Option<f64> {
        let samples = self.samples.get(&name)?;
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().map(|m| m.value).sum::<f64>() / samples.len() as f64)
    }

    /// Build the KPI summary for the mission's current state
    pub fn summary(&self, mission: &Mission, current_plan: Option<&Plan>) -> Result<MetricsSummary> {
        let total_rescue_time_seconds = match (mission.start_time, mission.end_time) {
            (start, Some(end)) => {
                let seconds = (end - start).num_seconds();
                Some(seconds.max(0) as u64)
            }
            _ => None, // still ongoing
        };

        let rescued = mission.victims_rescued.len() as u64;

        let average_agent_risk_exposure = self
            .average(MetricType::AggregateRiskExposure)
            .unwrap_or(DEFAULT_AVG_RISK_EXPOSURE);

        let efficiency_index = current_plan
            .map(|p| p.overall_efficiency_score)
            .or_else(|| self.average(MetricType::EfficiencyIndex))
            .unwrap_or(DEFAULT_EFFICIENCY_INDEX);

        Ok(MetricsSummary {
            mission_id: Some(self.mission_id),
            total_rescue_time_seconds,
            average_agent_risk_exposure: Some(average_agent_risk_exposure),
            agent_utilization_percentage: Some(DEFAULT_AGENT_UTILIZATION),
            efficiency_index: Some(efficiency_index),
            predicted_lives_saved: Some(rescued),
            victims_rescued_count: Some(rescued),
            active_agents_count: Some(mission.assigned_agent_ids.len() as u64),
            additional_metrics: HashMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MissionStatus;
    use chrono::Duration;

    fn mission() -> Mission {
        Mission::new(Uuid::new_v4(), "Test mission")
    }

    #[test]
    fn test_summary_defaults_without_samples() {
        let m = mission();
        let recorder = MetricsRecorder::new(m.id);
        let summary = recorder.summary(&m, None).unwrap();

        assert_eq!(summary.mission_id, Some(m.id));
        assert_eq!(summary.total_rescue_time_seconds, None);
        assert_eq!(summary.average_agent_risk_exposure, Some(0.15));
        assert_eq!(summary.agent_utilization_percentage, Some(0.75));
        assert_eq!(summary.efficiency_index, Some(0.85));
        assert_eq!(summary.victims_rescued_count, Some(0));
    }

    #[test]
    fn test_recorded_risk_samples_are_averaged() {
        let m = mission();
        let mut recorder = MetricsRecorder::new(m.id);
        recorder.record(MetricType::AggregateRiskExposure, 0.2);
        recorder.record(MetricType::AggregateRiskExposure, 0.4);
        let summary = recorder.summary(&m, None).unwrap();
        let avg = summary.average_agent_risk_exposure.unwrap();
        assert!((avg - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_rescue_time_computed_from_end_time() {
        let mut m = mission();
        m.status = MissionStatus::Completed;
        m.end_time = Some(m.start_time + Duration::seconds(125));
        let recorder = MetricsRecorder::new(m.id);
        let summary = recorder.summary(&m, None).unwrap();
        assert_eq!(summary.total_rescue_time_seconds, Some(125));
    }

    #[test]
    fn test_rescued_counts_flow_through() {
        let mut m = mission();
        m.victims_rescued = vec![Uuid::new_v4(), Uuid::new_v4()];
        m.assigned_agent_ids = vec![Uuid::new_v4()];
        let recorder = MetricsRecorder::new(m.id);
        let summary = recorder.summary(&m, None).unwrap();
        assert_eq!(summary.victims_rescued_count, Some(2));
        assert_eq!(summary.predicted_lives_saved, Some(2));
        assert_eq!(summary.active_agents_count, Some(1));
    }
}
