//! Weighting policy definitions.

use serde::{Deserialize, Serialize};

/// Share count used as capitalization weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareBasis {
    /// Total shares outstanding.
    Total,
    /// Free-float shares.
    #[default]
    FreeFloat,
}

impl ShareBasis {
    /// Column name of this basis in return and bar files.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Total => "total_shares",
            Self::FreeFloat => "free_float_shares",
        }
    }
}

impl std::str::FromStr for ShareBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" | "total_shares" => Ok(Self::Total),
            "free_float" | "free_float_shares" => Ok(Self::FreeFloat),
            other => Err(format!("unknown share basis: {other}")),
        }
    }
}

/// How members of a bucket are combined into one group return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Arithmetic mean of member returns.
    #[default]
    Equal,
    /// `sum(w * r) / sum(w)` with shares as weights.
    Capitalization(ShareBasis),
}

impl Weighting {
    /// Whether this policy needs a weight column.
    #[must_use]
    pub const fn is_weighted(&self) -> bool {
        matches!(self, Self::Capitalization(_))
    }

    /// Build the policy from a weighted/equal switch and a share basis.
    #[must_use]
    pub const fn from_flag(weighted: bool, basis: ShareBasis) -> Self {
        if weighted { Self::Capitalization(basis) } else { Self::Equal }
    }
}
