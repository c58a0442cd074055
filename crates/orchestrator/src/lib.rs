//! Orchestration Layer
//!
//! This crate drives the droplet simulation kernel, including:
//! - JSON configuration loading and validation
//! - Interactive commands (run/pause, single step, reset, resize, tuning)
//! - Simulation runner with lifecycle management and frame snapshots

#![warn(missing_docs)]

pub mod config;
pub mod controller;
pub mod error;
pub mod runner;

pub use config::SimulationConfig;
pub use controller::{Adjustment, Command, CommandOutcome, SimulationController};
pub use error::OrchestratorError;
pub use runner::{FrameSnapshot, RunnerState, SimulationRunner};

use droplet_kernel::SimulationKernel;

/// Create a complete simulation from a configuration file
///
/// This function performs the full simulation setup pipeline:
/// 1. Load and validate the configuration
/// 2. Create the simulation kernel and lay out the initial particles
/// 3. Wrap in a SimulationRunner for lifecycle management
///
/// # Arguments
/// * `config_path` - Path to the JSON configuration file
///
/// # Returns
/// A `SimulationRunner` ready to be started, or an error if setup fails
///
/// # Example
/// ```no_run
/// use droplet_orchestrator::create_simulation;
///
/// let runner = create_simulation("configs/single_drop.json")?;
/// runner.start();
/// // ... query status, submit commands, read snapshots, etc.
/// # Ok::<(), droplet_orchestrator::OrchestratorError>(())
/// ```
pub fn create_simulation(config_path: &str) -> Result<SimulationRunner, OrchestratorError> {
    tracing::info!("Creating simulation from config: {}", config_path);

    // 1. Load and validate configuration
    let config = SimulationConfig::load(config_path)?;
    tracing::info!("Configuration loaded: {}", config.name);

    // 2. Create kernel and initial particle set
    let controller = SimulationController::from_config(&config)?;
    tracing::info!(
        "Kernel ready: {} particles in {:?} layout, dt = {}s",
        controller.simulation().particle_count(),
        controller.layout(),
        controller.timestep()
    );

    // 3. Wrap in SimulationRunner
    tracing::info!("Creating simulation runner...");
    let runner = SimulationRunner::new(controller, config.max_timesteps, config.max_time);

    tracing::info!("Simulation ready to start");
    Ok(runner)
}
