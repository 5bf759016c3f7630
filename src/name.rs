//! Identifiers of the registered attacks and what they require of a model.
use crate::error::AttackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackName {
    PgdL1,
    PgdLinf,
    PgdL2,
    Fgsm,
    AutoattackLinf,
    MimLinf,
    Cw2,
    Deepfool,
    Ead,
    Ba,
    Bim,
    Blb,
    Llc,
    Om,
    Jsm,
}

/// Broad family of an attack, which decides the shape of its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackCategory {
    /// Gradient steps projected onto an Lp ball.
    PerturbationBounded,
    /// Standardised ensemble of attacks run over the whole batch.
    Ensemble,
    /// Iterative sign-gradient attacks, with or without momentum.
    Iterative,
    /// Query-only attacks walking along the decision boundary.
    DecisionBased,
    /// Attacks solving for a minimal perturbation under a trade-off constant.
    OptimizationBased,
    /// Attacks perturbing the most salient input features.
    SaliencyMap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelAccess {
    Gradient,
    DecisionOnly,
}

impl AttackName {
    pub const ALL: [Self; 15] = [
        Self::PgdL1,
        Self::PgdLinf,
        Self::PgdL2,
        Self::Fgsm,
        Self::AutoattackLinf,
        Self::MimLinf,
        Self::Cw2,
        Self::Deepfool,
        Self::Ead,
        Self::Ba,
        Self::Bim,
        Self::Blb,
        Self::Llc,
        Self::Om,
        Self::Jsm,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PgdL1 => "pgd_l1",
            Self::PgdLinf => "pgd_linf",
            Self::PgdL2 => "pgd_l2",
            Self::Fgsm => "fgsm",
            Self::AutoattackLinf => "autoattack_linf",
            Self::MimLinf => "mim_linf",
            Self::Cw2 => "cw2",
            Self::Deepfool => "deepfool",
            Self::Ead => "ead",
            Self::Ba => "ba",
            Self::Bim => "bim",
            Self::Blb => "blb",
            Self::Llc => "llc",
            Self::Om => "om",
            Self::Jsm => "jsm",
        }
    }

    pub const fn category(self) -> AttackCategory {
        match self {
            Self::PgdL1 | Self::PgdLinf | Self::PgdL2 | Self::Fgsm => {
                AttackCategory::PerturbationBounded
            }
            Self::AutoattackLinf => AttackCategory::Ensemble,
            Self::MimLinf | Self::Bim | Self::Llc => AttackCategory::Iterative,
            Self::Ba => AttackCategory::DecisionBased,
            Self::Cw2 | Self::Deepfool | Self::Ead | Self::Blb | Self::Om => {
                AttackCategory::OptimizationBased
            }
            Self::Jsm => AttackCategory::SaliencyMap,
        }
    }

    pub const fn access(self) -> ModelAccess {
        match self.category() {
            AttackCategory::DecisionBased => ModelAccess::DecisionOnly,
            _ => ModelAccess::Gradient,
        }
    }
}

impl fmt::Display for AttackName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttackName {
    type Err = AttackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| AttackError::UnknownAttack {
                name: s.to_string(),
            })
    }
}
