use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::products::ProductKind;

use ProductKind as P;

/// A named correction step with static dependency metadata.
///
/// `ALL` lists the registry in canonical declaration order. Declaration
/// order doubles as the tie-break between steps with no dependency
/// relation, which keeps resolved plans independent of the order steps
/// were requested in.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum StepKind {
    InferChannelSwitch,
    Poobah,
    QualityMask,
    Noob,
    DyeBias,
    ComputeBetas,
    ComputeMValues,
}

impl StepKind {
    pub const ALL: [StepKind; 7] = [
        StepKind::InferChannelSwitch,
        StepKind::Poobah,
        StepKind::QualityMask,
        StepKind::Noob,
        StepKind::DyeBias,
        StepKind::ComputeBetas,
        StepKind::ComputeMValues,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            StepKind::InferChannelSwitch => "infer_channel_switch",
            StepKind::Poobah => "poobah",
            StepKind::QualityMask => "quality_mask",
            StepKind::Noob => "noob",
            StepKind::DyeBias => "dye_bias",
            StepKind::ComputeBetas => "compute_betas",
            StepKind::ComputeMValues => "compute_m_values",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|step| step.as_str() == name)
    }

    /// Terminal estimators are selected through the estimator option and
    /// excluded from `"all"` expansion.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, StepKind::ComputeBetas | StepKind::ComputeMValues)
    }

    /// The canonical full sequence every `"all"` token expands to: every
    /// non-terminal step in declaration order.
    pub fn canonical() -> Vec<StepKind> {
        Self::ALL
            .iter()
            .copied()
            .filter(|step| !step.is_terminal())
            .collect()
    }

    /// Products this step reads unconditionally. Non-seeded entries pull
    /// their producing step into the plan.
    pub const fn requires(&self) -> &'static [ProductKind] {
        match self {
            StepKind::InferChannelSwitch => &[],
            StepKind::Poobah => &[P::MethValues, P::UnmethValues],
            StepKind::QualityMask => {
                &[P::MethValues, P::UnmethValues, P::PoobahValues]
            },
            StepKind::Noob => &[P::MethValues, P::UnmethValues],
            StepKind::DyeBias => &[P::NoobMethValues, P::NoobUnmethValues],
            StepKind::ComputeBetas | StepKind::ComputeMValues => {
                &[P::MethValues, P::UnmethValues]
            },
        }
    }

    /// Products this step consumes only when some planned step produces
    /// them. Soft requirements contribute ordering edges, never plan
    /// members.
    pub const fn soft_requires(&self) -> &'static [ProductKind] {
        match self {
            StepKind::Noob => &[P::MaskedMethValues, P::MaskedUnmethValues],
            StepKind::ComputeBetas | StepKind::ComputeMValues => {
                &[
                    P::MaskedMethValues,
                    P::MaskedUnmethValues,
                    P::NoobMethValues,
                    P::NoobUnmethValues,
                    P::DyeMethValues,
                    P::DyeUnmethValues,
                ]
            },
            _ => &[],
        }
    }

    pub const fn produces(&self) -> &'static [ProductKind] {
        match self {
            StepKind::InferChannelSwitch => &[P::ChannelSwitchFlags],
            StepKind::Poobah => &[P::PoobahValues],
            StepKind::QualityMask => {
                &[P::MaskedMethValues, P::MaskedUnmethValues]
            },
            StepKind::Noob => &[P::NoobMethValues, P::NoobUnmethValues],
            StepKind::DyeBias => &[P::DyeMethValues, P::DyeUnmethValues],
            StepKind::ComputeBetas => &[P::BetaValues],
            StepKind::ComputeMValues => &[P::MValues],
        }
    }

    /// The unique producing step of a non-seeded product.
    pub fn producer_of(kind: ProductKind) -> Option<StepKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.produces().contains(&kind))
    }
}

/// Every product a step sequence will leave in the store, seeded products
/// included, in catalog order.
pub fn produced_kinds(steps: &[StepKind]) -> Vec<ProductKind> {
    ProductKind::ALL
        .iter()
        .copied()
        .filter(|kind| {
            kind.is_seeded()
                || StepKind::producer_of(*kind)
                    .map(|producer| steps.contains(&producer))
                    .unwrap_or(false)
        })
        .collect()
}

impl Display for StepKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for StepKind {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        StepKind::from_name(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown step '{}'", s))
        })
    }
}
