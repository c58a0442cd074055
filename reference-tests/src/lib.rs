//! Reference test framework for droplet simulation validation
//!
//! This crate runs end-to-end scenarios from JSON configurations and checks
//! the final particle state against physical expectations: containment,
//! settling on the floor, numerical sanity and initial grid shape.

pub mod scenarios;

use droplet_kernel::boundary::is_contained;
use droplet_kernel::{DensityMetrics, Particle, SimulationKernel};
use droplet_orchestrator::{OrchestratorError, SimulationConfig, SimulationController};

/// Expected result criteria for a reference test
#[derive(Debug, Clone, Default)]
pub struct ExpectedResult {
    /// Every drop must lie inside the container
    pub containment: Option<ContainmentCheck>,
    /// Drops resting on the floor
    pub settling: Option<SettlingCheck>,
    /// Finite state and positive densities
    pub sanity: Option<SanityCheck>,
    /// Layout of a fresh grid
    pub grid_shape: Option<GridShapeCheck>,
}

/// Check that every drop's disk lies inside the container
#[derive(Debug, Clone)]
pub struct ContainmentCheck;

/// Check that drops have come to rest on the floor
#[derive(Debug, Clone)]
pub struct SettlingCheck {
    /// Floor Y position
    pub floor_y: f32,
    /// Maximum gap between a drop's lower edge and the floor
    pub max_gap: f32,
    /// Maximum residual speed
    pub max_speed: f32,
}

/// Check that positions and velocities are finite and densities positive
#[derive(Debug, Clone)]
pub struct SanityCheck;

/// Check the shape of a square grid layout
#[derive(Debug, Clone)]
pub struct GridShapeCheck {
    /// Number of drops expected
    pub count: usize,
    /// Radius every drop should have
    pub radius: f32,
}

/// Result of running a reference test
#[derive(Debug)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Whether test passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Final density metrics
    pub metrics: DensityMetrics,
    /// Number of timesteps executed
    pub timesteps: usize,
    /// Simulated time (seconds)
    pub sim_time: f64,
}

/// Result of an individual validation check
#[derive(Debug)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Error message if failed
    pub message: Option<String>,
}

/// A reference test case
pub struct ReferenceTest {
    /// Test name
    pub name: String,
    /// Path to configuration file
    pub config_path: String,
    /// Number of timesteps to run
    pub timesteps: usize,
    /// Expected results to validate
    pub expected: ExpectedResult,
}

impl ReferenceTest {
    /// Run the reference test and return results
    pub fn run(&self) -> Result<TestResult, OrchestratorError> {
        tracing::info!("Running reference test: {}", self.name);

        // Load configuration and lay out particles
        let config = SimulationConfig::load(&self.config_path)?;
        let mut controller = SimulationController::from_config(&config)?;
        tracing::info!(
            "Initialized: {} particles, kernel radius {}",
            controller.simulation().particle_count(),
            config.kernel_radius,
        );

        // Run simulation with the configured fixed timestep
        tracing::info!("Running {} timesteps...", self.timesteps);
        controller.set_running(true);
        let mut sim_time = 0.0_f64;
        for step in 0..self.timesteps {
            controller.advance();
            sim_time += controller.timestep() as f64;

            // Log progress every 10% of steps
            if (step + 1) % (self.timesteps / 10).max(1) == 0 {
                let progress = ((step + 1) as f32 / self.timesteps as f32) * 100.0;
                tracing::info!("Progress: {:.0}% ({}/{})", progress, step + 1, self.timesteps);
            }
        }
        tracing::info!("Simulation complete: {} steps, {:.6}s simulated", self.timesteps, sim_time);

        // Get final state
        let simulation = controller.simulation();
        let particles = simulation.particles();
        let constants = simulation.constants();
        let metrics = simulation.metrics();

        // Validate results
        let mut checks = Vec::new();

        if self.expected.containment.is_some() {
            checks.push(validate_containment(particles, constants.width, constants.height));
        }
        if let Some(ref settling) = self.expected.settling {
            checks.push(validate_settling(particles, settling));
        }
        if self.expected.sanity.is_some() {
            checks.push(validate_sanity(particles));
        }
        if let Some(ref shape) = self.expected.grid_shape {
            checks.push(validate_grid_shape(particles, shape));
        }

        let passed = checks.iter().all(|c| c.passed);
        Ok(TestResult {
            name: self.name.clone(),
            passed,
            checks,
            metrics,
            timesteps: self.timesteps,
            sim_time,
        })
    }
}

fn pass(name: &str, message: Option<String>) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        passed: true,
        message,
    }
}

fn fail(name: &str, message: String) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        passed: false,
        message: Some(message),
    }
}

/// Validate that every drop lies inside the container
fn validate_containment(particles: &[Particle], width: f32, height: f32) -> CheckResult {
    let escaped: Vec<usize> = particles
        .iter()
        .enumerate()
        .filter(|(_, p)| !is_contained(p, width, height))
        .map(|(i, _)| i)
        .collect();

    if escaped.is_empty() {
        pass("Containment", None)
    } else {
        let first = &particles[escaped[0]];
        fail(
            "Containment",
            format!(
                "{} drops outside the {}x{} container (first: #{} at {:?})",
                escaped.len(),
                width,
                height,
                escaped[0],
                first.position
            ),
        )
    }
}

/// Validate that drops rest on the floor
fn validate_settling(particles: &[Particle], check: &SettlingCheck) -> CheckResult {
    if particles.is_empty() {
        return fail("Settling", "No particles".to_string());
    }

    let max_gap = particles
        .iter()
        .map(|p| p.position.y - p.radius - check.floor_y)
        .fold(f32::MIN, f32::max);
    let max_speed = particles
        .iter()
        .map(|p| p.velocity.length())
        .fold(0.0_f32, f32::max);

    if max_gap <= check.max_gap && max_speed <= check.max_speed {
        pass(
            "Settling",
            Some(format!("Max gap: {:.4}, max speed: {:.4}", max_gap, max_speed)),
        )
    } else {
        fail(
            "Settling",
            format!(
                "Max gap: {:.4} (limit {:.4}), max speed: {:.4} (limit {:.4})",
                max_gap, check.max_gap, max_speed, check.max_speed
            ),
        )
    }
}

/// Validate finite state and positive densities
fn validate_sanity(particles: &[Particle]) -> CheckResult {
    let non_finite = particles
        .iter()
        .filter(|p| !p.is_finite())
        .count();
    let non_positive = particles.iter().filter(|p| !(p.density > 0.0)).count();

    if non_finite == 0 && non_positive == 0 {
        pass("State Sanity", None)
    } else {
        fail(
            "State Sanity",
            format!(
                "{} drops with non-finite state, {} with non-positive density",
                non_finite, non_positive
            ),
        )
    }
}

/// Validate a freshly laid out square grid
fn validate_grid_shape(particles: &[Particle], check: &GridShapeCheck) -> CheckResult {
    if particles.len() != check.count {
        return fail(
            "Grid Shape",
            format!("Expected {} drops, got {}", check.count, particles.len()),
        );
    }
    if let Some(p) = particles
        .iter()
        .find(|p| (p.radius - check.radius).abs() > 1.0e-5)
    {
        return fail(
            "Grid Shape",
            format!("Drop radius {} differs from {}", p.radius, check.radius),
        );
    }

    // Full grids are point-symmetric about the origin
    let asymmetric = particles
        .iter()
        .filter(|p| {
            !particles
                .iter()
                .any(|q| (q.position + p.position).length() < 1.0e-4)
        })
        .count();
    if asymmetric > 0 {
        return fail(
            "Grid Shape",
            format!("{} drops without a mirror image through the origin", asymmetric),
        );
    }

    pass(
        "Grid Shape",
        Some(format!("{} drops of radius {:.4}", check.count, check.radius)),
    )
}

impl TestResult {
    /// Print a summary of the test results
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Test: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("Status: {}", if self.passed { "PASSED" } else { "FAILED" });
        println!("Timesteps: {}", self.timesteps);
        println!("Simulated time: {:.6} s", self.sim_time);
        println!("\nDensity Metrics:");
        println!("  Max density error: {:.2}%", self.metrics.max_density_error * 100.0);
        println!("  Mean density: {:.3}", self.metrics.mean_density);
        println!("  Kinetic energy: {:.4}", self.metrics.kinetic_energy);
        println!("\nValidation Checks:");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            print!("  [{}] {}", status, check.name);
            if let Some(ref msg) = check.message {
                print!(" - {}", msg);
            }
            println!();
        }
        println!("{}", "=".repeat(80));
    }
}
