//! Configuration management for the Aegis planning core
//!
//! All tunables are grouped into sections mirroring the subsystems they
//! drive. Every field has a default and can be overridden through an
//! environment variable of the same name.

use std::env;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::error::{AegisError, Result};

/// Global configuration instance
static CONFIG: Lazy<RwLock<Option<Arc<AegisConfig>>>> = Lazy::new(|| RwLock::new(None));

/// Complete Aegis configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AegisConfig {
    pub app: AppSettings,
    pub logging: LoggingSettings,
    pub runtime: RuntimeSettings,
    pub risk: RiskSettings,
    pub prioritization: PrioritizationSettings,
    pub rate_limit: RateLimitSettings,
}

/// Application identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub environment: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub file_path: Option<String>,
}

/// Concurrency configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Number of workers in the bounded compute pool for CPU-bound kernels
    pub max_workers: usize,
}

/// Risk field computation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSettings {
    pub fire_weight: f64,
    pub collapse_weight: f64,
    pub flood_weight: f64,
    pub gas_leak_weight: f64,
    pub debris_weight: f64,
    /// Fraction of a cell's risk that bleeds into each passable neighbor
    pub propagation_factor: f64,
    /// Numerator of the per-cell distance decay (decay = base / distance)
    pub decay_factor_base: f64,
    /// Number of neighbor-propagation passes per recompute
    pub propagation_iterations: u32,
}

/// Victim prioritization tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizationSettings {
    pub severity_weight: f64,
    pub time_sensitivity_weight: f64,
    pub accessibility_risk_weight: f64,
    pub num_agents_available_weight: f64,
    pub severity_critical_score: f64,
    pub severity_severe_score: f64,
    pub severity_moderate_score: f64,
    pub severity_mild_score: f64,
}

/// Rate limiting settings, recognized for the hosting façade.
/// The core itself never throttles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub requests_per_interval: u64,
    pub interval_seconds: u64,
}

impl Default for AegisConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "aegis".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                environment: "development".to_string(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                file_path: None,
            },
            runtime: RuntimeSettings { max_workers: 4 },
            risk: RiskSettings {
                fire_weight: 0.8,
                collapse_weight: 1.0,
                flood_weight: 0.6,
                gas_leak_weight: 0.9,
                debris_weight: 0.4,
                propagation_factor: 0.1,
                decay_factor_base: 1.0,
                propagation_iterations: 1,
            },
            prioritization: PrioritizationSettings {
                severity_weight: 0.4,
                time_sensitivity_weight: 0.3,
                accessibility_risk_weight: 0.2,
                num_agents_available_weight: 0.1,
                severity_critical_score: 1.0,
                severity_severe_score: 0.75,
                severity_moderate_score: 0.5,
                severity_mild_score: 0.25,
            },
            rate_limit: RateLimitSettings {
                requests_per_interval: 100,
                interval_seconds: 60,
            },
        }
    }
}

impl AegisConfig {
    /// Build a configuration from defaults plus environment overrides.
    ///
    /// Recognized variables: `APP_NAME`, `APP_VERSION`, `ENVIRONMENT`,
    /// `LOG_LEVEL`, `LOG_FILE_PATH`, `MAX_WORKERS`, `HAZARD_*_WEIGHT`,
    /// `RISK_PROPAGATION_FACTOR`, `RISK_DECAY_FACTOR_BASE`,
    /// `RISK_PROPAGATION_ITERATIONS`, `PRIORITIZATION_*` and the
    /// `RATE_LIMIT_*` pair.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(v) = env::var("APP_NAME") {
            cfg.app.name = v;
        }
        if let Ok(v) = env::var("APP_VERSION") {
            cfg.app.version = v;
        }
        if let Ok(v) = env::var("ENVIRONMENT") {
            match v.as_str() {
                "development" | "staging" | "production" => cfg.app.environment = v,
                other => {
                    return Err(AegisError::invalid_parameters(format!(
                        "unknown ENVIRONMENT '{}'",
                        other
                    )))
                }
            }
        }
        if let Ok(v) = env::var("LOG_LEVEL") {
            cfg.logging.level = v;
        }
        if let Ok(v) = env::var("LOG_FILE_PATH") {
            cfg.logging.file_path = Some(v);
        }

        parse_env("MAX_WORKERS", &mut cfg.runtime.max_workers)?;

        parse_env("HAZARD_FIRE_WEIGHT", &mut cfg.risk.fire_weight)?;
        parse_env("HAZARD_COLLAPSE_WEIGHT", &mut cfg.risk.collapse_weight)?;
        parse_env("HAZARD_FLOOD_WEIGHT", &mut cfg.risk.flood_weight)?;
        parse_env("HAZARD_GAS_LEAK_WEIGHT", &mut cfg.risk.gas_leak_weight)?;
        parse_env("HAZARD_DEBRIS_WEIGHT", &mut cfg.risk.debris_weight)?;
        parse_env("RISK_PROPAGATION_FACTOR", &mut cfg.risk.propagation_factor)?;
        parse_env("RISK_DECAY_FACTOR_BASE", &mut cfg.risk.decay_factor_base)?;
        parse_env(
            "RISK_PROPAGATION_ITERATIONS",
            &mut cfg.risk.propagation_iterations,
        )?;

        parse_env(
            "PRIORITIZATION_SEVERITY_WEIGHT",
            &mut cfg.prioritization.severity_weight,
        )?;
        parse_env(
            "PRIORITIZATION_TIME_SENSITIVITY_WEIGHT",
            &mut cfg.prioritization.time_sensitivity_weight,
        )?;
        parse_env(
            "PRIORITIZATION_ACCESSIBILITY_RISK_WEIGHT",
            &mut cfg.prioritization.accessibility_risk_weight,
        )?;
        parse_env(
            "PRIORITIZATION_NUM_AGENTS_AVAILABLE_WEIGHT",
            &mut cfg.prioritization.num_agents_available_weight,
        )?;
        parse_env(
            "PRIORITIZATION_SEVERITY_CRITICAL_SCORE",
            &mut cfg.prioritization.severity_critical_score,
        )?;
        parse_env(
            "PRIORITIZATION_SEVERITY_SEVERE_SCORE",
            &mut cfg.prioritization.severity_severe_score,
        )?;
        parse_env(
            "PRIORITIZATION_SEVERITY_MODERATE_SCORE",
            &mut cfg.prioritization.severity_moderate_score,
        )?;
        parse_env(
            "PRIORITIZATION_SEVERITY_MILD_SCORE",
            &mut cfg.prioritization.severity_mild_score,
        )?;

        parse_env(
            "RATE_LIMIT_REQUESTS_PER_INTERVAL",
            &mut cfg.rate_limit.requests_per_interval,
        )?;
        parse_env(
            "RATE_LIMIT_INTERVAL_SECONDS",
            &mut cfg.rate_limit.interval_seconds,
        )?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.runtime.max_workers == 0 {
            return Err(AegisError::invalid_parameters(
                "MAX_WORKERS must be at least 1",
            ));
        }
        for (name, value) in [
            ("HAZARD_FIRE_WEIGHT", self.risk.fire_weight),
            ("HAZARD_COLLAPSE_WEIGHT", self.risk.collapse_weight),
            ("HAZARD_FLOOD_WEIGHT", self.risk.flood_weight),
            ("HAZARD_GAS_LEAK_WEIGHT", self.risk.gas_leak_weight),
            ("HAZARD_DEBRIS_WEIGHT", self.risk.debris_weight),
            ("RISK_PROPAGATION_FACTOR", self.risk.propagation_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AegisError::invalid_parameters(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            (
                "PRIORITIZATION_SEVERITY_WEIGHT",
                self.prioritization.severity_weight,
            ),
            (
                "PRIORITIZATION_TIME_SENSITIVITY_WEIGHT",
                self.prioritization.time_sensitivity_weight,
            ),
            (
                "PRIORITIZATION_ACCESSIBILITY_RISK_WEIGHT",
                self.prioritization.accessibility_risk_weight,
            ),
            (
                "PRIORITIZATION_NUM_AGENTS_AVAILABLE_WEIGHT",
                self.prioritization.num_agents_available_weight,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AegisError::invalid_parameters(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn parse_env<T>(name: &str, slot: &mut T) -> Result<()>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = env::var(name) {
        *slot = raw.parse().map_err(|e| {
            AegisError::invalid_parameters(format!("cannot parse {}='{}': {}", name, raw, e))
        })?;
    }
    Ok(())
}

/// Install a configuration as the process-wide instance
pub fn set_global(config: AegisConfig) {
    let mut slot = CONFIG.write().expect("config lock poisoned");
    *slot = Some(Arc::new(config));
}

/// The process-wide configuration. Falls back to environment-derived
/// defaults on first access if nothing was installed.
pub fn global() -> Arc<AegisConfig> {
    if let Some(cfg) = CONFIG.read().expect("config lock poisoned").as_ref() {
        return Arc::clone(cfg);
    }
    let cfg = Arc::new(AegisConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid environment configuration, using defaults");
        AegisConfig::default()
    }));
    let mut slot = CONFIG.write().expect("config lock poisoned");
    slot.get_or_insert_with(|| Arc::clone(&cfg));
    slot.as_ref().map(Arc::clone).unwrap_or(cfg)
}
