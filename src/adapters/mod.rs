//! One adapter per registered attack.
//!
//! Adapters share a signature so the registry can hold them side by side.
//! Each one picks its own parameters out of `AttackParams`, builds the native
//! configuration of the library it wraps, runs it, and hands back a batch of
//! the input's shape. Library errors are passed through unchanged.
use crate::backend::Backends;
use crate::classifier::Classifier;
use crate::error::AttackError;
use crate::params::AttackParams;
use crate::tensor::{LabelBatch, SampleBatch};

pub type AttackFn = fn(
    &Backends,
    &dyn Classifier,
    &SampleBatch,
    &LabelBatch,
    &AttackParams,
) -> Result<SampleBatch, AttackError>;

/// Unwraps the adapter's own parameter set, failing on any other.
macro_rules! expect_params {
    ($params:expr, $variant:ident) => {
        match $params {
            $crate::params::AttackParams::$variant(p) => p,
            other => {
                return Err($crate::error::AttackError::ParamsMismatch {
                    attack: $crate::name::AttackName::$variant,
                    given: $crate::params::AttackSpec::name(other),
                })
            }
        }
    };
}

mod bespoke;
mod gradient;

pub use bespoke::{autoattack_linf, ba, bim, blb, cw2, deepfool, ead, jsm, llc, mim_linf, om};
pub use gradient::{fgsm, pgd_l1, pgd_l2, pgd_linf};
