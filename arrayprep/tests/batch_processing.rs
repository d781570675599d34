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

#[fixture]
fn builder() -> DemoBatchBuilder {
    DemoBatchBuilder::new(150, 10, 2, 7)
}

#[rstest]
fn store_shapes_follow_the_batch(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;

    let batch = read_batch_dir(dir.path(), Some(ArrayType::Custom))?;
    assert_eq!(batch.n_samples(), builder.n_samples());
    assert_eq!(batch.probe_ids().len(), builder.n_probes());

    let config = RunOptions::default()
        .with_sesame(true)
        .with_betas(true)
        .with_m_values(true)
        .to_config();
    let store = process_batch(&batch, &config)?;

    let expected_columns: Vec<String> = std::iter::once("probe_id".to_string())
        .chain(builder.sample_ids())
        .collect();
    for kind in [
        ProductKind::BetaValues,
        ProductKind::MValues,
        ProductKind::NoobMethValues,
        ProductKind::PoobahValues,
    ] {
        let matrix = store.matrix(kind).unwrap();
        assert_eq!(matrix.height(), builder.n_probes());
        assert_eq!(
            matrix.get_column_names_str(),
            expected_columns
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
        );
    }
    assert_eq!(store.sample_ids(), builder.sample_ids());
    assert_eq!(store.sheet().height(), builder.n_samples());
    Ok(())
}

#[rstest]
fn betas_and_p_values_stay_in_bounds(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;

    let batch = read_batch_dir(dir.path(), Some(ArrayType::Custom))?;
    let config = RunOptions::default()
        .with_sesame(true)
        .with_betas(true)
        .to_config();
    let store = process_batch(&batch, &config)?;

    for (kind, range) in [
        (ProductKind::BetaValues, 0.0..=1.0),
        (ProductKind::PoobahValues, 0.0..=1.0),
    ] {
        let matrix = store.matrix(kind).unwrap();
        for sample_id in store.sample_ids() {
            let column = matrix.column(sample_id)?.f64()?;
            for value in column.into_iter().flatten() {
                assert!(
                    range.contains(&value),
                    "{} value {} out of bounds",
                    kind,
                    value
                );
            }
        }
    }
    Ok(())
}

/// An export that no requested step produces fails at planning time,
/// before anything is read or written.
#[rstest]
fn unresolved_export_fails_before_writing(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;
    let before = snapshot(dir.path())?;

    let err = make_pipeline(
        dir.path(),
        &["noob"],
        &["poobah_values"],
        "betas",
        Some(ArrayType::Custom),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::UnresolvedExport { .. }));
    assert_eq!(before, snapshot(dir.path())?);
    Ok(())
}

#[rstest]
fn preset_flags_gate_artifacts(builder: DemoBatchBuilder) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;

    let options = RunOptions::default()
        .with_sesame(true)
        .with_betas(true)
        .with_array_type(ArrayType::Custom);
    run_pipeline(dir.path(), &options)?;

    for absent in ["meth_values.csv", "poobah_values.csv", "control_probes.csv"]
    {
        assert!(!dir.path().join(absent).exists(), "{} was written", absent);
    }
    for present in [
        "beta_values.csv",
        "noob_meth_values.csv",
        "sample_sheet_meta_data.csv",
    ] {
        assert!(dir.path().join(present).exists(), "{} is missing", present);
    }
    // Per-sample tables only appear when asked for.
    assert!(!dir.path().join("9247377085").exists());
    Ok(())
}

#[rstest]
fn per_sample_tables_land_under_the_sentrix_dir(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;

    let options = RunOptions::default()
        .with_sesame(true)
        .with_betas(true)
        .with_export_csv(true)
        .with_array_type(ArrayType::Custom);
    run_pipeline(dir.path(), &options)?;

    for sample_id in builder.sample_ids() {
        let path = dir
            .path()
            .join("9247377085")
            .join(format!("{}_processed.csv", sample_id));
        assert!(path.exists(), "{} is missing", path.display());
    }
    Ok(())
}

#[rstest]
fn ipc_format_switches_artifact_extension(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;

    let options = RunOptions::default()
        .with_sesame(true)
        .with_betas(true)
        .with_format(ExportFormat::Ipc)
        .with_array_type(ArrayType::Custom);
    run_pipeline(dir.path(), &options)?;

    assert!(dir.path().join("beta_values.ipc").exists());
    assert!(!dir.path().join("beta_values.csv").exists());
    Ok(())
}

/// A failing run leaves the batch directory exactly as it was; artifacts
/// only ever appear after the whole batch processed.
#[rstest]
fn failed_run_leaves_directory_untouched(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;
    std::fs::remove_file(dir.path().join("9247377085_R02C01_Red.csv"))?;
    let before = snapshot(dir.path())?;

    let err = make_pipeline(
        dir.path(),
        &["noob"],
        &["noob_meth_values"],
        "betas",
        Some(ArrayType::Custom),
    )
    .unwrap_err();
    match err {
        PipelineError::Ingest { sample, .. } => {
            assert_eq!(sample, "9247377085_R02C01")
        },
        other => panic!("expected Ingest, got {:?}", other),
    }
    assert_eq!(before, snapshot(dir.path())?);
    Ok(())
}

/// The stacked control artifact keeps its schema even when no sample
/// carried control rows.
#[test]
fn empty_control_export_keeps_schema() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ProductStore::new(polars::prelude::DataFrame::empty());
    ExportManager::new(&store, dir.path(), ExportFormat::Csv, 3)
        .export(&[ProductKind::ControlProbes], false)?;

    let written =
        std::fs::read_to_string(dir.path().join("control_probes.csv"))?;
    assert_eq!(written.trim_end(), "sample_id,probe_id,grn,red");
    Ok(())
}

#[rstest]
fn unknown_probe_count_without_override(
    builder: DemoBatchBuilder
) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    builder.write(dir.path())?;

    let err = read_batch_dir(dir.path(), None).unwrap_err();
    assert!(matches!(err, PipelineError::UnknownArray {
        probe_count: 160
    }));
    Ok(())
}
