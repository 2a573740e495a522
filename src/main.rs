//! Demo runner: spin up one mission, plan it and print the results.
//!
//! The production deployment hosts the library behind a network façade;
//! this binary exists for local exploration and smoke checks.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use aegis::core::config::{self, AegisConfig};
use aegis::core::logging;
use aegis::mission::MissionOrchestrator;
use aegis::models::{PlanRequest, PlanningObjective, SimulateRequest};

#[derive(Parser, Debug)]
#[command(name = "aegis", version, about = "Risk-aware disaster response planning engine")]
struct Cli {
    /// Side length of the square grid
    #[arg(long, default_value_t = 50)]
    map_size: u32,

    /// Overall hazard intensity factor in [0, 1]
    #[arg(long, default_value_t = 0.5)]
    hazard_intensity: f64,

    /// Number of victims to generate
    #[arg(long, default_value_t = 10)]
    victims: u32,

    /// Number of rescue agents to deploy
    #[arg(long, default_value_t = 3)]
    agents: u32,

    /// Seed for reproducible scenarios
    #[arg(long)]
    seed: Option<i64>,

    /// Planning objective: minimize_time, minimize_risk_exposure or
    /// maximize_lives_saved
    #[arg(long, default_value = "minimize_risk_exposure")]
    objective: String,

    /// Simulation steps to run after planning
    #[arg(long, default_value_t = 0)]
    steps: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AegisConfig::from_env()?;
    logging::init_logging(&config.logging)?;
    config::set_global(config.clone());

    let objective: PlanningObjective =
        serde_json::from_value(serde_json::Value::String(cli.objective.clone()))
            .map_err(|_| anyhow::anyhow!("unknown objective '{}'", cli.objective))?;

    let orchestrator = MissionOrchestrator::new(Arc::new(config));

    let sim = orchestrator
        .initiate_simulation(SimulateRequest {
            map_size: cli.map_size,
            hazard_intensity_factor: cli.hazard_intensity,
            num_victims: cli.victims,
            num_agents: cli.agents,
            seed: cli.seed,
        })
        .await?;
    println!("mission: {}", sim.mission_id);

    let plan = orchestrator
        .generate_plan(
            sim.mission_id,
            PlanRequest {
                planning_objective: objective,
                replan: false,
            },
        )
        .await?;
    println!("{}", serde_json::to_string_pretty(&plan)?);

    for _ in 0..cli.steps {
        let report = orchestrator.step_simulation(sim.mission_id).await?;
        println!(
            "step: advanced={} rescued={}",
            report.agents_advanced,
            report.victims_rescued.len()
        );
        if report.agents_advanced == 0 && report.victims_rescued.is_empty() {
            break;
        }
    }

    let metrics = orchestrator.get_metrics(sim.mission_id).await?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}
