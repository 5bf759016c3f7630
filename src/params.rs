//! Per-attack parameter sets.
//!
//! Every field is required: nothing is defaulted at this layer, so a parameter
//! bag missing a key is rejected before any attack runs.
use crate::error::AttackError;
use crate::name::AttackName;
use crate::tensor::Device;
use crate::AdvFloat;
use enum_dispatch::enum_dispatch;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// What the dispatcher needs to know about a parameter set before running it.
#[enum_dispatch]
pub trait AttackSpec {
    fn name(&self) -> AttackName;

    /// Device the samples must live on when the attack is invoked, if any.
    fn residency(&self) -> Option<Device> {
        None
    }
}

/// Lp norm an attack bounds its perturbation in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Norm {
    #[serde(rename = "L1")]
    L1,
    #[serde(rename = "L2")]
    L2,
    #[serde(rename = "Linf")]
    Linf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoAttackVersion {
    Standard,
    Plus,
    Rand,
    Custom,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PgdL1 {
    pub eps: AdvFloat,
    /// Side length of the square input images.
    pub input_size: usize,
    pub eps_step: AdvFloat,
    pub max_iter: usize,
    pub batch_size: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PgdLinf {
    pub eps: AdvFloat,
    pub rel_stepsize: AdvFloat,
    pub steps: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PgdL2 {
    pub eps: AdvFloat,
    pub rel_stepsize: AdvFloat,
    pub steps: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Fgsm {
    pub eps: AdvFloat,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AutoattackLinf {
    pub norm: Norm,
    pub eps: AdvFloat,
    pub version: AutoAttackVersion,
    pub verbose: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MimLinf {
    pub eps: AdvFloat,
    pub num_steps: usize,
    pub step_size: AdvFloat,
    /// Weight of the accumulated gradient carried into each step.
    pub decay_factor: AdvFloat,
}

/// Boundary attack.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Ba {
    pub eps: AdvFloat,
    pub delta: AdvFloat,
    pub lower_bound: AdvFloat,
    pub upper_bound: AdvFloat,
    pub max_iter: usize,
    pub binary_search_steps: usize,
    pub batch_size: usize,
    pub step_adapt: AdvFloat,
    pub sample_size: usize,
    pub init_size: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Bim {
    pub eps: AdvFloat,
    pub eps_iter: AdvFloat,
    pub num_steps: usize,
}

/// Box-constrained L-BFGS.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Blb {
    pub init_const: AdvFloat,
    pub max_iter: usize,
    pub binary_search_steps: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Cw2 {
    pub device: Device,
    pub targeted: bool,
    /// Confidence margin.
    pub kappa: AdvFloat,
    pub lr: AdvFloat,
    pub init_const: AdvFloat,
    pub lower_bound: AdvFloat,
    pub upper_bound: AdvFloat,
    pub max_iter: usize,
    pub binary_search_steps: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Deepfool {
    pub device: Device,
    pub targeted: bool,
    pub overshoot: AdvFloat,
    pub max_iter: usize,
}

/// Elastic-net attack.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Ead {
    pub device: Device,
    pub targeted: bool,
    pub kappa: AdvFloat,
    pub lr: AdvFloat,
    pub init_const: AdvFloat,
    pub lower_bound: AdvFloat,
    pub upper_bound: AdvFloat,
    pub max_iter: usize,
    pub binary_search_steps: usize,
    pub class_type_number: usize,
    /// L1 regularisation weight.
    pub beta: AdvFloat,
    /// Select adversarial examples by elastic-net distance rather than L1.
    pub elastic_net: bool,
}

/// Least-likely class.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Llc {
    pub device: Device,
    pub targeted: bool,
    pub epsilon: AdvFloat,
}

/// Optimization-margin attack.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Om {
    pub device: Device,
    pub targeted: bool,
    pub kappa: AdvFloat,
    pub class_type_number: usize,
    pub lr: AdvFloat,
    pub init_const: AdvFloat,
    pub lower_bound: AdvFloat,
    pub upper_bound: AdvFloat,
    pub max_iter: usize,
    pub binary_search_steps: usize,
    pub noise_count: usize,
    pub noise_magnitude: AdvFloat,
}

/// Jacobian saliency map attack.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Jsm {
    pub device: Device,
    pub targeted: bool,
    /// Change applied to each selected feature.
    pub theta: AdvFloat,
    /// Maximum fraction of features that may be perturbed.
    pub gamma: AdvFloat,
}

macro_rules! impl_attack_spec {
    ($($ty:ident => $name:ident),* $(,)?) => {
        $(
            impl AttackSpec for $ty {
                fn name(&self) -> AttackName {
                    AttackName::$name
                }
            }
        )*
    };
}

macro_rules! impl_attack_spec_on_device {
    ($($ty:ident => $name:ident),* $(,)?) => {
        $(
            impl AttackSpec for $ty {
                fn name(&self) -> AttackName {
                    AttackName::$name
                }

                fn residency(&self) -> Option<Device> {
                    Some(self.device)
                }
            }
        )*
    };
}

impl_attack_spec! {
    PgdLinf => PgdLinf,
    PgdL2 => PgdL2,
    Fgsm => Fgsm,
    AutoattackLinf => AutoattackLinf,
    MimLinf => MimLinf,
    Ba => Ba,
    Bim => Bim,
    Blb => Blb,
}

impl_attack_spec_on_device! {
    Cw2 => Cw2,
    Deepfool => Deepfool,
    Ead => Ead,
    Llc => Llc,
    Om => Om,
    Jsm => Jsm,
}

impl AttackSpec for PgdL1 {
    fn name(&self) -> AttackName {
        AttackName::PgdL1
    }

    /// The estimator library only accepts host arrays.
    fn residency(&self) -> Option<Device> {
        Some(Device::Host)
    }
}

/// Parameters for exactly one attack, tagged by the attack's name.
#[enum_dispatch(AttackSpec)]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "attack", rename_all = "snake_case")]
pub enum AttackParams {
    PgdL1(PgdL1),
    PgdLinf(PgdLinf),
    PgdL2(PgdL2),
    Fgsm(Fgsm),
    AutoattackLinf(AutoattackLinf),
    MimLinf(MimLinf),
    Cw2(Cw2),
    Deepfool(Deepfool),
    Ead(Ead),
    Ba(Ba),
    Bim(Bim),
    Blb(Blb),
    Llc(Llc),
    Om(Om),
    Jsm(Jsm),
}

fn parse<T: DeserializeOwned>(
    attack: AttackName,
    bag: serde_json::Value,
) -> Result<T, AttackError> {
    serde_json::from_value(bag).map_err(|e| AttackError::InvalidParams {
        attack,
        reason: e.to_string(),
    })
}

impl AttackParams {
    /// Builds the parameters of the attack called `name` from a flat
    /// key/value object.
    ///
    /// # Errors
    /// `UnknownAttack` for an unregistered name; `InvalidParams` if a key is
    /// missing, unexpected, or of the wrong type.
    pub fn from_bag(name: &str, bag: serde_json::Value) -> Result<Self, AttackError> {
        let attack: AttackName = name.parse()?;
        Ok(match attack {
            AttackName::PgdL1 => Self::PgdL1(parse(attack, bag)?),
            AttackName::PgdLinf => Self::PgdLinf(parse(attack, bag)?),
            AttackName::PgdL2 => Self::PgdL2(parse(attack, bag)?),
            AttackName::Fgsm => Self::Fgsm(parse(attack, bag)?),
            AttackName::AutoattackLinf => Self::AutoattackLinf(parse(attack, bag)?),
            AttackName::MimLinf => Self::MimLinf(parse(attack, bag)?),
            AttackName::Cw2 => Self::Cw2(parse(attack, bag)?),
            AttackName::Deepfool => Self::Deepfool(parse(attack, bag)?),
            AttackName::Ead => Self::Ead(parse(attack, bag)?),
            AttackName::Ba => Self::Ba(parse(attack, bag)?),
            AttackName::Bim => Self::Bim(parse(attack, bag)?),
            AttackName::Blb => Self::Blb(parse(attack, bag)?),
            AttackName::Llc => Self::Llc(parse(attack, bag)?),
            AttackName::Om => Self::Om(parse(attack, bag)?),
            AttackName::Jsm => Self::Jsm(parse(attack, bag)?),
        })
    }
}
