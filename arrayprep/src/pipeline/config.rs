use crate::data_structs::arrays::ArrayType;
use crate::data_structs::products::ProductKind;
use crate::error::{
    PipelineError,
    Result,
};
use crate::pipeline::registry::{
    produced_kinds,
    StepKind,
};

/// Default detection p-value significance threshold.
pub const DEFAULT_POOBAH_SIG: f64 = 0.05;
/// Default rounding applied to exported p-values.
pub const DEFAULT_POOBAH_DECIMALS: u32 = 3;

/// On-disk format of exported batch artifacts. Per-sample processed tables
/// are always CSV.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Ipc,
}

impl ExportFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Ipc => "ipc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "ipc" | "arrow" => Some(ExportFormat::Ipc),
            _ => None,
        }
    }
}

/// Terminal estimator selection of the explicit surface.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Estimator {
    Betas,
    MValues,
    Both,
}

impl Estimator {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "betas" | "beta" => Ok(Estimator::Betas),
            "m_values" | "m_value" | "mvalues" => Ok(Estimator::MValues),
            "both" => Ok(Estimator::Both),
            _ => {
                Err(PipelineError::UnknownEstimator {
                    name: name.to_string(),
                })
            },
        }
    }

    pub const fn betas(&self) -> bool {
        matches!(self, Estimator::Betas | Estimator::Both)
    }

    pub const fn m_values(&self) -> bool {
        matches!(self, Estimator::MValues | Estimator::Both)
    }
}

/// Which products get persisted after a successful run.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum ExportSelection {
    /// Every product the resolved plan produces, seeded products included.
    All,
    Named(Vec<ProductKind>),
}

/// The single canonical configuration both entry surfaces expand into.
///
/// The preset adapter ([`RunOptions::to_config`]) and the explicit-list
/// adapter build a `PipelineConfig` and hand it to the same planner and
/// executor, so equivalent invocations resolve to identical plans by
/// construction rather than by incidental agreement.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Requested steps, in any order; the planner closes over missing
    /// producers and sorts by declared dependencies.
    pub steps: Vec<StepKind>,
    pub exports: ExportSelection,
    /// Additionally write one processed table per sample.
    pub per_sample_csv: bool,
    pub betas: bool,
    pub m_values: bool,
    pub poobah_sig: f64,
    pub poobah_decimals: u32,
    pub format: ExportFormat,
    /// Skips probe-count resolution entirely when set.
    pub array_type: Option<ArrayType>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            exports: ExportSelection::All,
            per_sample_csv: false,
            betas: false,
            m_values: false,
            poobah_sig: DEFAULT_POOBAH_SIG,
            poobah_decimals: DEFAULT_POOBAH_DECIMALS,
            format: ExportFormat::default(),
            array_type: None,
        }
    }
}

/// Preset surface of [`run_pipeline`](crate::pipeline::run_pipeline):
/// flag-style options that expand deterministically to an explicit
/// configuration.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Sesame-equivalent processing: channel-switch inference, p-value
    /// detection, quality masking, background correction and dye-bias
    /// correction.
    pub sesame: bool,
    pub betas: bool,
    pub m_values: bool,
    /// Compute detection p-values (implied by `sesame`).
    pub poobah: bool,
    pub export_poobah: bool,
    /// Keep the uncorrected meth/unmeth pair among the exports.
    pub save_uncorrected: bool,
    pub save_control: bool,
    /// Write one processed CSV per sample.
    pub export_csv: bool,
    pub poobah_sig: Option<f64>,
    pub poobah_decimals: Option<u32>,
    pub format: ExportFormat,
    pub array_type: Option<ArrayType>,
}

impl RunOptions {
    pub fn with_sesame(
        mut self,
        value: bool,
    ) -> Self {
        self.sesame = value;
        self
    }

    pub fn with_betas(
        mut self,
        value: bool,
    ) -> Self {
        self.betas = value;
        self
    }

    pub fn with_m_values(
        mut self,
        value: bool,
    ) -> Self {
        self.m_values = value;
        self
    }

    pub fn with_poobah(
        mut self,
        value: bool,
    ) -> Self {
        self.poobah = value;
        self
    }

    pub fn with_export_poobah(
        mut self,
        value: bool,
    ) -> Self {
        self.export_poobah = value;
        self
    }

    pub fn with_save_uncorrected(
        mut self,
        value: bool,
    ) -> Self {
        self.save_uncorrected = value;
        self
    }

    pub fn with_save_control(
        mut self,
        value: bool,
    ) -> Self {
        self.save_control = value;
        self
    }

    pub fn with_export_csv(
        mut self,
        value: bool,
    ) -> Self {
        self.export_csv = value;
        self
    }

    pub fn with_format(
        mut self,
        value: ExportFormat,
    ) -> Self {
        self.format = value;
        self
    }

    pub fn with_array_type(
        mut self,
        value: ArrayType,
    ) -> Self {
        self.array_type = Some(value);
        self
    }

    /// Expands the preset flags into the canonical explicit configuration.
    ///
    /// Steps: `sesame` selects the full canonical sequence; otherwise the
    /// background and dye-bias corrections run, preceded by p-value
    /// detection when `poobah` is set. Exports: every product of the chosen
    /// plan, with the raw pair, p-values and control probes gated by their
    /// respective flags.
    pub fn to_config(&self) -> PipelineConfig {
        let steps = if self.sesame {
            StepKind::canonical()
        }
        else {
            let mut steps = Vec::new();
            if self.poobah {
                steps.push(StepKind::Poobah);
            }
            steps.extend([StepKind::Noob, StepKind::DyeBias]);
            steps
        };

        let mut with_estimators = steps.clone();
        if self.betas {
            with_estimators.push(StepKind::ComputeBetas);
        }
        if self.m_values {
            with_estimators.push(StepKind::ComputeMValues);
        }
        let exports = produced_kinds(&with_estimators)
            .into_iter()
            .filter(|kind| {
                match kind {
                    ProductKind::PoobahValues => self.export_poobah,
                    ProductKind::MethValues | ProductKind::UnmethValues => {
                        self.save_uncorrected
                    },
                    ProductKind::ControlProbes => self.save_control,
                    _ => true,
                }
            })
            .collect();

        PipelineConfig {
            steps,
            exports: ExportSelection::Named(exports),
            per_sample_csv: self.export_csv,
            betas: self.betas,
            m_values: self.m_values,
            poobah_sig: self.poobah_sig.unwrap_or(DEFAULT_POOBAH_SIG),
            poobah_decimals: self
                .poobah_decimals
                .unwrap_or(DEFAULT_POOBAH_DECIMALS),
            format: self.format,
            array_type: self.array_type,
        }
    }
}
