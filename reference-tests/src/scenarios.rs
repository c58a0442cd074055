//! The reference suite, parameterized on where the `configs/` directory lives.

use std::path::Path;

use crate::{
    ContainmentCheck, ExpectedResult, GridShapeCheck, ReferenceTest, SanityCheck, SettlingCheck,
};

fn config(dir: &Path, file: &str) -> String {
    dir.join(file).to_string_lossy().into_owned()
}

/// Single drop released at the origin with damped wall contact. After ten
/// seconds it must rest on the floor (`y = -2`), bouncing by no more than one
/// tick of gravity (`9.81 * 0.016`).
pub fn single_drop_settling(config_dir: &Path) -> ReferenceTest {
    ReferenceTest {
        name: "Single Drop Settling".to_string(),
        config_path: config(config_dir, "single_drop.json"),
        timesteps: 600,
        expected: ExpectedResult {
            containment: Some(ContainmentCheck),
            settling: Some(SettlingCheck {
                floor_y: -2.0,
                max_gap: 0.01,
                max_speed: 0.15,
            }),
            sanity: Some(SanityCheck),
            grid_shape: None,
        },
    }
}

/// A fresh nine-drop grid: 3x3, radius 1/3, symmetric about the origin.
pub fn grid_nine_layout(config_dir: &Path) -> ReferenceTest {
    ReferenceTest {
        name: "Nine-Drop Grid Layout".to_string(),
        config_path: config(config_dir, "grid_nine.json"),
        timesteps: 0,
        expected: ExpectedResult {
            sanity: Some(SanityCheck),
            grid_shape: Some(GridShapeCheck {
                count: 9,
                radius: 1.0 / 3.0,
            }),
            ..Default::default()
        },
    }
}

/// The nine-drop grid falling under gravity stays inside the container.
pub fn grid_nine_falling(config_dir: &Path) -> ReferenceTest {
    ReferenceTest {
        name: "Nine-Drop Grid Falling".to_string(),
        config_path: config(config_dir, "grid_nine.json"),
        timesteps: 300,
        expected: ExpectedResult {
            containment: Some(ContainmentCheck),
            sanity: Some(SanityCheck),
            ..Default::default()
        },
    }
}

/// Dense random scatter: pressure forces and wall collisions stay finite and
/// contained.
pub fn random_box_containment(config_dir: &Path) -> ReferenceTest {
    ReferenceTest {
        name: "Random Box Containment".to_string(),
        config_path: config(config_dir, "random_box.json"),
        timesteps: 120,
        expected: ExpectedResult {
            containment: Some(ContainmentCheck),
            sanity: Some(SanityCheck),
            ..Default::default()
        },
    }
}

/// Get all reference tests
pub fn all_tests(config_dir: &Path) -> Vec<ReferenceTest> {
    vec![
        single_drop_settling(config_dir),
        grid_nine_layout(config_dir),
        grid_nine_falling(config_dir),
        random_box_containment(config_dir),
    ]
}
