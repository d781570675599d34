use std::fmt::Display;

use indexmap::IndexMap;
use polars::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

/// Named data products a pipeline run can hold.
///
/// Probe-matrix products are tables keyed by probe identifier with one
/// column per sample. `ControlProbes` is a per-sample map of control tables
/// and `SampleSheetMetaData` is the sheet frame itself. A product, once
/// produced for a run, is immutable; corrected views get new names
/// (`noob_meth_values` is distinct from `meth_values`).
///
/// `ALL` lists the catalog in canonical declaration order, which is also
/// the order products are merged and exported in.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum ProductKind {
    MethValues,
    UnmethValues,
    ControlProbes,
    SampleSheetMetaData,
    ChannelSwitchFlags,
    PoobahValues,
    MaskedMethValues,
    MaskedUnmethValues,
    NoobMethValues,
    NoobUnmethValues,
    DyeMethValues,
    DyeUnmethValues,
    BetaValues,
    MValues,
}

impl ProductKind {
    pub const ALL: [ProductKind; 14] = [
        ProductKind::MethValues,
        ProductKind::UnmethValues,
        ProductKind::ControlProbes,
        ProductKind::SampleSheetMetaData,
        ProductKind::ChannelSwitchFlags,
        ProductKind::PoobahValues,
        ProductKind::MaskedMethValues,
        ProductKind::MaskedUnmethValues,
        ProductKind::NoobMethValues,
        ProductKind::NoobUnmethValues,
        ProductKind::DyeMethValues,
        ProductKind::DyeUnmethValues,
        ProductKind::BetaValues,
        ProductKind::MValues,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductKind::MethValues => "meth_values",
            ProductKind::UnmethValues => "unmeth_values",
            ProductKind::ControlProbes => "control_probes",
            ProductKind::SampleSheetMetaData => "sample_sheet_meta_data",
            ProductKind::ChannelSwitchFlags => "channel_switch_flags",
            ProductKind::PoobahValues => "poobah_values",
            ProductKind::MaskedMethValues => "masked_meth_values",
            ProductKind::MaskedUnmethValues => "masked_unmeth_values",
            ProductKind::NoobMethValues => "noob_meth_values",
            ProductKind::NoobUnmethValues => "noob_unmeth_values",
            ProductKind::DyeMethValues => "dye_meth_values",
            ProductKind::DyeUnmethValues => "dye_unmeth_values",
            ProductKind::BetaValues => "beta_values",
            ProductKind::MValues => "m_values",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }

    /// Products present in the store before any step runs.
    pub const fn is_seeded(&self) -> bool {
        matches!(
            self,
            ProductKind::MethValues
                | ProductKind::UnmethValues
                | ProductKind::ControlProbes
                | ProductKind::SampleSheetMetaData
        )
    }

    /// Probe-matrix products (probe rows, one column per sample).
    pub const fn is_matrix(&self) -> bool {
        !matches!(
            self,
            ProductKind::ControlProbes | ProductKind::SampleSheetMetaData
        )
    }

    /// Meth/unmeth intensity pairs ordered from raw to most corrected.
    /// Refinement steps read the best rung strictly below their own output
    /// rung; estimators read the best rung present at all.
    pub const fn intensity_ladder() -> [[ProductKind; 2]; 4] {
        [
            [ProductKind::MethValues, ProductKind::UnmethValues],
            [
                ProductKind::MaskedMethValues,
                ProductKind::MaskedUnmethValues,
            ],
            [ProductKind::NoobMethValues, ProductKind::NoobUnmethValues],
            [ProductKind::DyeMethValues, ProductKind::DyeUnmethValues],
        ]
    }
}

impl Display for ProductKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ProductKind {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        ProductKind::from_name(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown product '{}'", s))
        })
    }
}

/// The in-memory result set of a pipeline run.
///
/// Probe-matrix products live as DataFrames with a `probe_id` column plus
/// one column per sample; control tables are kept per sample in
/// sample-sheet order. The store does not decide persistence, the export
/// manager does.
#[derive(Debug, Clone)]
pub struct ProductStore {
    matrices: IndexMap<ProductKind, DataFrame>,
    controls: IndexMap<String, DataFrame>,
    sheet:    DataFrame,
}

impl ProductStore {
    pub fn new(sheet: DataFrame) -> Self {
        Self {
            matrices: IndexMap::new(),
            controls: IndexMap::new(),
            sheet,
        }
    }

    pub(crate) fn insert_matrix(
        &mut self,
        kind: ProductKind,
        frame: DataFrame,
    ) {
        debug_assert!(
            !self.matrices.contains_key(&kind),
            "product '{}' inserted twice",
            kind
        );
        self.matrices.insert(kind, frame);
    }

    pub(crate) fn insert_controls(
        &mut self,
        sample_id: String,
        frame: DataFrame,
    ) {
        self.controls.insert(sample_id, frame);
    }

    pub fn matrix(
        &self,
        kind: ProductKind,
    ) -> Option<&DataFrame> {
        self.matrices.get(&kind)
    }

    /// Per-sample control tables, keyed by sample identifier in
    /// sample-sheet order.
    pub fn controls(&self) -> &IndexMap<String, DataFrame> {
        &self.controls
    }

    pub fn sheet(&self) -> &DataFrame {
        &self.sheet
    }

    pub fn contains(
        &self,
        kind: ProductKind,
    ) -> bool {
        match kind {
            ProductKind::ControlProbes | ProductKind::SampleSheetMetaData => true,
            _ => self.matrices.contains_key(&kind),
        }
    }

    /// Every product present in the store, in catalog order.
    pub fn kinds(&self) -> Vec<ProductKind> {
        ProductKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    pub fn sample_ids(&self) -> Vec<&str> {
        self.controls.keys().map(String::as_str).collect()
    }
}
