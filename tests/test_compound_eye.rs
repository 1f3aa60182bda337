// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Full pipeline: configuration file -> lattice -> positions -> intensities

use std::collections::HashMap;
use std::fs;

use approx::assert_abs_diff_eq;
use image::{GrayImage, Luma};
use ndarray::Array2;
use ommatidia::prelude::*;
use ommatidia::sampling::gray_to_array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

fn small_config(rings: u32, steps: usize) -> OmmatidiaConfig {
    let mut config = OmmatidiaConfig::default();
    config.lattice.rings = rings;
    config.sampling.steps = steps;
    config
}

#[test]
fn test_eye_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ommatidia.toml");
    fs::write(
        &path,
        r#"
[lattice]
rings = 1

[projection]
screen_map = "equidistant"

[sampling]
steps = 10
dt = 1e-4
image_field = "frame"
"#,
    )
    .unwrap();

    let cli = HashMap::new();
    let config = load_config(Some(&path), Some(&cli)).unwrap();
    let eye = CompoundEye::from_config(&config).unwrap();

    assert_eq!(eye.neighbors().len(), 7);
    for (index, list) in eye.neighbors().iter().enumerate() {
        assert_eq!(list[0], index);
    }

    let source = ImageSource::single("frame", Array2::from_elem((30, 30), 3.0));
    let intensities = eye.intensities(&source, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(intensities.dim(), (10, 42));
    for value in intensities.iter() {
        assert_abs_diff_eq!(*value, 3.0 * 1e-4 / 1e-3, epsilon = 1e-9);
    }
}

#[test]
fn test_positions_by_name() {
    let eye = CompoundEye::from_config(&small_config(1, 1)).unwrap();

    let center = eye.positions("spherical", "center", false).unwrap();
    assert_eq!(center.len(), 7);

    let periphery = eye.positions("cartesian2D", "R1toR6", false).unwrap();
    assert_eq!(periphery.len(), 42);

    let with_border = eye.positions("cartesian3D", "all", true).unwrap();
    assert_eq!(with_border.len(), 37 * 7);

    let err = eye.positions("polar", "center", false).unwrap_err();
    assert!(err.to_string().contains("polar"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = small_config(1, 1);
    config.projection.screen_radius = 0.5;
    config.sampling.kappa = -1.0;

    let err = CompoundEye::from_config(&config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("projection.screen_radius"));
    assert!(message.contains("sampling.kappa"));
}

#[test]
fn test_jittered_from_gray_image() {
    let mut config = small_config(2, 3);
    config.sampling.still_image = false;
    let eye = CompoundEye::from_config(&config).unwrap();

    let gray = GrayImage::from_fn(96, 96, |x, y| Luma([((x + 2 * y) % 256) as u8]));
    let source = ImageSource::single("im", gray_to_array(&gray));

    let first = eye.intensities(&source, &mut StdRng::seed_from_u64(5)).unwrap();
    let second = eye.intensities(&source, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(first.dim(), (3, 19 * 6));
    assert_eq!(first, second);
    assert!(first.iter().all(|v| *v >= 0.0));
}

#[test]
fn test_missing_image_field() {
    let eye = CompoundEye::from_config(&small_config(1, 1)).unwrap();
    let source = ImageSource::single("other", Array2::ones((8, 8)));
    let err = eye
        .intensities(&source, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(err.to_string().contains("available: [other]"));
}
