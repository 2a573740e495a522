//! Victim prioritization
//!
//! Scores every victim on a weighted blend of injury severity, survival
//! time pressure and accessibility, then ranks the list. Weights and
//! severity scores come from configuration.

use crate::core::config::PrioritizationSettings;
use crate::models::{InjurySeverity, Victim};
use crate::risk::RiskField;

/// Scale used to normalize the remaining survival window
const MAX_EXPECTED_WINDOW_MINUTES: f64 = 360.0;

/// The victim scoring and ranking engine for one mission
#[derive(Debug, Clone)]
pub struct VictimPrioritizer {
    settings: PrioritizationSettings,
}

impl VictimPrioritizer {
    pub fn new(settings: PrioritizationSettings) -> Self {
        Self { settings }
    }

    /// Score each victim and sort the list by priority, descending.
    ///
    /// The sort is stable, so victims with equal scores keep their input
    /// order. Rescued victims always score zero.
    pub fn prioritize(&self, victims: &mut Vec<Victim>, field: &RiskField) {
        for victim in victims.iter_mut() {
            victim.priority_score = self.score(victim, field);
        }
        victims.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Weighted priority score in [0, 1]
    pub fn score(&self, victim: &Victim, field: &RiskField) -> f64 {
        if victim.is_rescued {
            return 0.0;
        }

        let severity_score = self.severity_score(victim.injury_severity);

        // Shorter remaining survival window scores higher; an exhausted
        // window scores zero.
        let time_remaining = victim.time_remaining_minutes();
        let time_sensitivity_score = if time_remaining > 0 {
            (1.0 - time_remaining as f64 / MAX_EXPECTED_WINDOW_MINUTES).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Safer cells are easier to reach and score higher
        let accessibility_score = 1.0 - field.risk_at(victim.location);

        // Reserved slot in the default model
        let agent_availability_factor = 0.0;

        let weighted = self.settings.severity_weight * severity_score
            + self.settings.time_sensitivity_weight * time_sensitivity_score
            + self.settings.accessibility_risk_weight * accessibility_score
            + self.settings.num_agents_available_weight * agent_availability_factor;

        weighted.clamp(0.0, 1.0)
    }

    fn severity_score(&self, severity: InjurySeverity) -> f64 {
        match severity {
            InjurySeverity::Critical => self.settings.severity_critical_score,
            InjurySeverity::Severe => self.settings.severity_severe_score,
            InjurySeverity::Moderate => self.settings.severity_moderate_score,
            InjurySeverity::Mild => self.settings.severity_mild_score,
        }
    }
}
