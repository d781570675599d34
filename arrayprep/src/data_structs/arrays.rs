use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    PipelineError,
    Result,
};

/// Physical array layout a batch of samples was measured on.
///
/// Every downstream correction depends on the layout's probe and control
/// counts, so the layout is resolved once per batch, at ingestion time, and
/// never mutated afterwards. Each supported variant carries its manifest
/// constants directly. The `Custom` layout intentionally has no fixed shape
/// and is only ever selected through an explicit override.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum ArrayType {
    Custom,
    Hm450k,
    Epic,
    EpicPlus,
}

/// Exact scanner output row count of the EPIC+ layout. The extended layout
/// is only ever detected by this fixed value.
const EPIC_PLUS_COUNT: usize = 1_055_583;

impl ArrayType {
    /// Determines the array layout from the number of probes observed in a
    /// decoded intensity table (control rows included).
    ///
    /// Raw scanner outputs and manifest-aligned tables carry different row
    /// counts for the same physical layout, so each layout matches two
    /// disjoint ranges. Counts inside the 27k range identify a layout this
    /// crate does not support and are rejected by name rather than
    /// misclassified; every other unmatched count fails as unknown.
    pub fn from_probe_count(probe_count: usize) -> Result<Self> {
        if probe_count == EPIC_PLUS_COUNT {
            return Ok(ArrayType::EpicPlus);
        }
        match probe_count {
            622_000..=623_000 | 484_000..=487_000 => Ok(ArrayType::Hm450k),
            1_050_000..=1_053_000 | 863_000..=867_000 => Ok(ArrayType::Epic),
            54_000..=56_000 => {
                Err(PipelineError::UnsupportedArray {
                    name: "Illumina Human Methylation 27k".to_string(),
                })
            },
            _ => Err(PipelineError::UnknownArray { probe_count }),
        }
    }

    /// Manifest probe count, `None` for the custom layout.
    pub const fn num_probes(&self) -> Option<usize> {
        match self {
            ArrayType::Hm450k => Some(485_578),
            ArrayType::Epic => Some(865_919),
            ArrayType::EpicPlus => Some(868_699),
            ArrayType::Custom => None,
        }
    }

    /// Manifest control probe count, `None` for the custom layout.
    pub const fn num_controls(&self) -> Option<usize> {
        match self {
            ArrayType::Hm450k => Some(850),
            ArrayType::Epic | ArrayType::EpicPlus => Some(635),
            ArrayType::Custom => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ArrayType::Custom => "custom",
            ArrayType::Hm450k => "450k",
            ArrayType::Epic => "epic",
            ArrayType::EpicPlus => "epic+",
        }
    }

    /// Parses a canonical layout name, as accepted by the `array_type`
    /// override option.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "custom" => Some(ArrayType::Custom),
            "450k" => Some(ArrayType::Hm450k),
            "epic" => Some(ArrayType::Epic),
            "epic+" => Some(ArrayType::EpicPlus),
            _ => None,
        }
    }
}

impl Display for ArrayType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ArrayType {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArrayType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        ArrayType::from_name(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown array type '{}'", s))
        })
    }
}
