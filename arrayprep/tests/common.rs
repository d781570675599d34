#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};

/// Materializes a synthetic decoded batch on disk: a sample sheet plus one
/// Grn/Red channel table per sample, control rows carrying the `ctl`
/// prefix. The same seed always yields byte-identical input files.
pub struct DemoBatchBuilder {
    n_probes:   usize,
    n_controls: usize,
    samples:    Vec<(String, String)>,
    seed:       u64,
}

impl DemoBatchBuilder {
    pub fn new(
        n_probes: usize,
        n_controls: usize,
        n_samples: usize,
        seed: u64,
    ) -> Self {
        let samples = (0..n_samples)
            .map(|idx| ("9247377085".to_string(), format!("R0{}C01", idx + 1)))
            .collect();
        Self {
            n_probes,
            n_controls,
            samples,
            seed,
        }
    }

    pub fn n_probes(&self) -> usize {
        self.n_probes
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_ids(&self) -> Vec<String> {
        self.samples
            .iter()
            .map(|(sentrix, position)| format!("{}_{}", sentrix, position))
            .collect()
    }

    pub fn write(
        &self,
        dir: &Path,
    ) -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut sheet =
            String::from("Sentrix_ID,Sentrix_Position,Sample_Name\n");
        for (idx, (sentrix, position)) in self.samples.iter().enumerate() {
            writeln!(sheet, "{},{},sample_{}", sentrix, position, idx)?;
        }
        fs::write(dir.join("samplesheet.csv"), sheet)?;

        for (sentrix, position) in &self.samples {
            let identifier = format!("{}_{}", sentrix, position);
            for channel in ["Grn", "Red"] {
                let mut table = String::from("probe_id,intensity\n");
                for probe in 0..self.n_probes {
                    writeln!(
                        table,
                        "cg{:06},{:.1}",
                        probe,
                        rng.gen_range(50.0..5000.0_f64)
                    )?;
                }
                for control in 0..self.n_controls {
                    writeln!(
                        table,
                        "ctl{:03},{:.1}",
                        control,
                        rng.gen_range(50.0..300.0_f64)
                    )?;
                }
                fs::write(
                    dir.join(format!("{}_{}.csv", identifier, channel)),
                    table,
                )?;
            }
        }
        Ok(())
    }
}

/// Recursive byte snapshot of a directory, keyed by relative path.
pub fn snapshot(dir: &Path) -> anyhow::Result<BTreeMap<String, Vec<u8>>> {
    fn walk(
        root: &Path,
        dir: &Path,
        out: &mut BTreeMap<String, Vec<u8>>,
    ) -> anyhow::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                walk(root, &path, out)?;
            }
            else {
                let relative = path
                    .strip_prefix(root)?
                    .to_string_lossy()
                    .into_owned();
                out.insert(relative, fs::read(&path)?);
            }
        }
        Ok(())
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out)?;
    Ok(out)
}
