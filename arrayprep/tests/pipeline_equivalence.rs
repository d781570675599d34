mod common;

use arrayprep::prelude::*;
use common::{
    snapshot,
    DemoBatchBuilder,
};
use rstest::{
    fixture,
    rstest,
};

const EXPLICIT_STEPS: [&str; 5] = [
    "infer_channel_switch",
    "poobah",
    "quality_mask",
    "noob",
    "dye_bias",
];

#[fixture]
fn builder() -> DemoBatchBuilder {
    DemoBatchBuilder::new(300, 16, 3, 42)
}

fn full_preset() -> RunOptions {
    RunOptions::default()
        .with_sesame(true)
        .with_betas(true)
        .with_export_poobah(true)
        .with_save_uncorrected(true)
        .with_save_control(true)
        .with_export_csv(true)
        .with_array_type(ArrayType::Custom)
}

fn assert_stores_equal(
    left: &ProductStore,
    right: &ProductStore,
) {
    assert_eq!(left.kinds(), right.kinds());
    for kind in left.kinds() {
        if !kind.is_matrix() {
            continue;
        }
        let left_frame = left.matrix(kind).unwrap();
        let right_frame = right.matrix(kind).unwrap();
        assert!(
            left_frame.equals_missing(right_frame),
            "product '{}' differs between runs",
            kind
        );
    }
    assert_eq!(left.sample_ids(), right.sample_ids());
}

/// The documented preset flags and their explicit step-list equivalent
/// must produce identical stores and byte-identical on-disk artifacts.
#[rstest]
fn preset_matches_explicit_steps(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let preset_dir = tempfile::tempdir()?;
    let explicit_dir = tempfile::tempdir()?;
    builder.write(preset_dir.path())?;
    builder.write(explicit_dir.path())?;

    let preset_store = run_pipeline(preset_dir.path(), &full_preset())?;
    let explicit_store = make_pipeline(
        explicit_dir.path(),
        &EXPLICIT_STEPS,
        &["all"],
        "betas",
        Some(ArrayType::Custom),
    )?;

    assert_stores_equal(&preset_store, &explicit_store);
    assert_eq!(
        snapshot(preset_dir.path())?,
        snapshot(explicit_dir.path())?
    );
    Ok(())
}

/// Requested step order never changes the result.
#[rstest]
fn step_order_does_not_change_artifacts(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let forward_dir = tempfile::tempdir()?;
    let reversed_dir = tempfile::tempdir()?;
    builder.write(forward_dir.path())?;
    builder.write(reversed_dir.path())?;

    let reversed: Vec<&str> = EXPLICIT_STEPS.iter().rev().copied().collect();
    let forward_store = make_pipeline(
        forward_dir.path(),
        &EXPLICIT_STEPS,
        &["all"],
        "betas",
        Some(ArrayType::Custom),
    )?;
    let reversed_store = make_pipeline(
        reversed_dir.path(),
        &reversed,
        &["all"],
        "betas",
        Some(ArrayType::Custom),
    )?;

    assert_stores_equal(&forward_store, &reversed_store);
    assert_eq!(
        snapshot(forward_dir.path())?,
        snapshot(reversed_dir.path())?
    );
    Ok(())
}

/// Re-running over its own previous exports overwrites them with
/// byte-identical artifacts.
#[rstest]
fn rerun_is_idempotent(builder: DemoBatchBuilder) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;

    run_pipeline(dir.path(), &full_preset())?;
    let first = snapshot(dir.path())?;
    run_pipeline(dir.path(), &full_preset())?;
    let second = snapshot(dir.path())?;

    assert_eq!(first, second);
    Ok(())
}
