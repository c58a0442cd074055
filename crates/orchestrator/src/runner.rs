//! Simulation runner with lifecycle management
//!
//! This module provides the `SimulationRunner` which drives a
//! [`SimulationController`] in a background thread: start, pause, resume,
//! command submission and status tracking. After every completed tick the
//! thread publishes an immutable [`FrameSnapshot`]; readers never observe a
//! half-finished tick.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use droplet_kernel::sph::density_at;
use droplet_kernel::{ParticleSnapshot, SimulationConstants, SimulationKernel};
use glam::Vec2;
use rand::Rng;

use crate::controller::{Command, SimulationController};
use crate::error::OrchestratorError;

/// Runner state enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerState {
    /// Simulation created but not yet started
    Created,
    /// Simulation actively running
    Running,
    /// Simulation paused
    Paused,
    /// Simulation finished (reached stopping condition)
    Finished,
    /// Simulation encountered an error
    Error,
}

/// Everything a presentation layer needs from one completed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Kernel tick counter (restarts at 0 on reset)
    pub tick: u64,
    /// Simulated time accumulated by the runner (seconds)
    pub sim_time: f64,
    /// Per-particle render state
    pub particles: Vec<ParticleSnapshot>,
    /// Constants the tick was computed with
    pub constants: SimulationConstants,
}

impl FrameSnapshot {
    fn capture<R: Rng>(controller: &SimulationController<R>, sim_time: f64) -> Self {
        let simulation = controller.simulation();
        Self {
            tick: simulation.tick(),
            sim_time,
            particles: simulation.snapshot(),
            constants: *simulation.constants(),
        }
    }

    /// Density at `point` from the published positions.
    pub fn query_density(&self, point: Vec2) -> f32 {
        density_at(
            point,
            self.particles.iter().map(|p| p.position),
            self.constants.mass,
            self.constants.kernel_radius,
        )
    }
}

/// Shared state between the runner thread and control interface
struct SharedState {
    /// Current runner state
    state: RunnerState,
    /// Current simulation time (seconds)
    sim_time: f64,
    /// Number of timesteps executed
    timestep_count: u64,
    /// Most recent error message
    error_message: Option<String>,
    /// Commands waiting for the runner thread
    pending: Vec<Command>,
    /// Last fully completed frame
    frame: Arc<FrameSnapshot>,
}

fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for controlling and querying a running simulation
pub struct SimulationRunner {
    /// Shared state (protected by mutex)
    shared: Arc<Mutex<SharedState>>,
    /// Handle to the background thread
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl SimulationRunner {
    /// Create a new simulation runner around `controller`
    ///
    /// # Arguments
    /// * `controller` - Simulation plus layout and tick length
    /// * `max_timesteps` - Optional maximum number of timesteps
    /// * `max_time` - Optional maximum simulation time (seconds)
    pub fn new<R>(
        mut controller: SimulationController<R>,
        max_timesteps: Option<u64>,
        max_time: Option<f64>,
    ) -> Self
    where
        R: Rng + Send + 'static,
    {
        controller.set_running(false);
        let shared = Arc::new(Mutex::new(SharedState {
            state: RunnerState::Created,
            sim_time: 0.0,
            timestep_count: 0,
            error_message: None,
            pending: Vec::new(),
            frame: Arc::new(FrameSnapshot::capture(&controller, 0.0)),
        }));

        let shared_clone = Arc::clone(&shared);

        // Spawn background thread
        let thread_handle = thread::spawn(move || {
            run_simulation_loop(controller, shared_clone, max_timesteps, max_time);
        });

        Self {
            shared,
            thread_handle: Some(thread_handle),
        }
    }

    /// Get current runner state
    pub fn state(&self) -> RunnerState {
        lock(&self.shared).state.clone()
    }

    /// Get current simulation time (seconds)
    pub fn sim_time(&self) -> f64 {
        lock(&self.shared).sim_time
    }

    /// Get current timestep count
    pub fn timestep_count(&self) -> u64 {
        lock(&self.shared).timestep_count
    }

    /// Get the most recent error message, if any
    pub fn error_message(&self) -> Option<String> {
        lock(&self.shared).error_message.clone()
    }

    /// Last fully completed frame
    pub fn snapshot(&self) -> Arc<FrameSnapshot> {
        Arc::clone(&lock(&self.shared).frame)
    }

    /// Queue a command for the runner thread
    pub fn submit(&self, command: Command) {
        lock(&self.shared).pending.push(command);
    }

    /// Pause the simulation
    pub fn pause(&self) {
        let mut state = lock(&self.shared);
        if state.state == RunnerState::Running {
            state.state = RunnerState::Paused;
        }
    }

    /// Resume the simulation
    pub fn resume(&self) {
        let mut state = lock(&self.shared);
        if state.state == RunnerState::Paused {
            state.state = RunnerState::Running;
        }
    }

    /// Start the simulation (transition from Created to Running)
    pub fn start(&self) {
        let mut state = lock(&self.shared);
        if state.state == RunnerState::Created {
            state.state = RunnerState::Running;
        }
    }

    /// Ask the runner thread to exit after its current iteration
    pub fn stop(&self) {
        let mut state = lock(&self.shared);
        if state.state != RunnerState::Error {
            state.state = RunnerState::Finished;
        }
    }

    /// Wait for the simulation thread to complete
    pub fn join(mut self) -> Result<(), OrchestratorError> {
        if let Some(handle) = self.thread_handle.take() {
            handle.join().map_err(|_| OrchestratorError::ThreadPanicked)?;
        }
        Ok(())
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        // Set state to Finished to signal thread to exit
        let mut state = lock(&self.shared);
        if matches!(
            state.state,
            RunnerState::Created | RunnerState::Running | RunnerState::Paused
        ) {
            state.state = RunnerState::Finished;
        }
    }
}

/// Main simulation loop executed in background thread
fn run_simulation_loop<R: Rng>(
    mut controller: SimulationController<R>,
    shared: Arc<Mutex<SharedState>>,
    max_timesteps: Option<u64>,
    max_time: Option<f64>,
) {
    let start_wall_time = Instant::now();
    let dt = controller.timestep();
    let mut sim_time = 0.0_f64;
    let mut timestep_count = 0_u64;

    loop {
        // Take queued commands and the current state together
        let (state, commands) = {
            let mut guard = lock(&shared);
            (guard.state.clone(), std::mem::take(&mut guard.pending))
        };

        if matches!(state, RunnerState::Finished | RunnerState::Error) {
            break;
        }

        let was_running = state == RunnerState::Running;
        controller.set_running(was_running);
        let mut ticks = 0_u64;
        let mut changed = false;
        let mut rejected = None;

        for command in commands {
            let steps = matches!(command, Command::StepOnce);
            match controller.apply(command) {
                Ok(_) => {
                    changed = true;
                    if steps {
                        ticks += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Command rejected: {}", e);
                    rejected = Some(e.to_string());
                }
            }
        }

        if controller.advance() {
            ticks += 1;
        }
        sim_time += ticks as f64 * dt as f64;
        timestep_count += ticks;

        // Publish the completed frame and reconcile run state
        let mut finished = false;
        {
            let mut guard = lock(&shared);
            if ticks > 0 || changed {
                guard.frame = Arc::new(FrameSnapshot::capture(&controller, sim_time));
            }
            guard.sim_time = sim_time;
            guard.timestep_count = timestep_count;
            if rejected.is_some() {
                guard.error_message = rejected;
            }
            // Only commands may override pause/resume issued meanwhile. A
            // toggle before start() starts the runner.
            if controller.is_running() != was_running
                && matches!(
                    guard.state,
                    RunnerState::Created | RunnerState::Running | RunnerState::Paused
                )
            {
                guard.state = if controller.is_running() {
                    RunnerState::Running
                } else {
                    RunnerState::Paused
                };
            }

            // A tick that produced NaN or infinity cannot be continued
            if ticks > 0 {
                let particles = controller.simulation().particles();
                if let Some(index) = particles.iter().position(|p| !p.is_finite()) {
                    let message = format!(
                        "particle {} left the finite range at step {}: {:?}",
                        index, timestep_count, particles[index].position
                    );
                    tracing::error!("Simulation failed: {}", message);
                    guard.state = RunnerState::Error;
                    guard.error_message = Some(message);
                    finished = true;
                }
            }

            // Check stopping conditions
            if let Some(max_steps) = max_timesteps {
                if !finished && timestep_count >= max_steps {
                    tracing::info!("Simulation finished: reached max_timesteps = {}", max_steps);
                    guard.state = RunnerState::Finished;
                    finished = true;
                }
            }
            if let Some(max_t) = max_time {
                if !finished && sim_time >= max_t {
                    tracing::info!("Simulation finished: reached max_time = {:.3}s", max_t);
                    guard.state = RunnerState::Finished;
                    finished = true;
                }
            }
        }
        if finished {
            break;
        }

        if ticks > 0 {
            // Log progress periodically
            if timestep_count % 100 == 0 {
                let metrics = controller.simulation().metrics();
                tracing::debug!(
                    "Step {}: sim_time={:.4}s, wall_time={:.2}s, mean_density={:.3}, kinetic={:.4}",
                    timestep_count,
                    sim_time,
                    start_wall_time.elapsed().as_secs_f64(),
                    metrics.mean_density,
                    metrics.kinetic_energy,
                );
            }
        } else {
            // Idle while created or paused
            thread::sleep(Duration::from_millis(10));
        }
    }

    tracing::info!(
        "Simulation thread exiting: {} timesteps, {:.4}s simulated",
        timestep_count,
        sim_time
    );
}
