//! Uniform dispatch over adversarial-example attacks on image classifiers.
//!
//! Attacks with very different configurations and calling conventions are
//! registered under a name and run through one signature:
//!
//! ```ignore
//! let registry = Registry::standard();
//! let params = AttackParams::from_bag("pgd_linf", json!({"eps": 0.03, "rel_stepsize": 0.1, "steps": 20}))?;
//! let adv = registry.run("pgd_linf", &backends, &model, &xs, &ys, &params)?;
//! ```
//!
//! The attacks themselves live behind the traits in [`backend`].
#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]
extern crate ndarray;
extern crate ndarray_rand;
extern crate ndarray_stats;
extern crate num;
extern crate rand;

pub mod adapters;
pub mod backend;
pub mod classifier;
pub mod clip;
pub mod config;
pub mod dnn;
pub mod error;
pub mod evaluate;
pub mod logging;
pub mod name;
pub mod params;
pub mod registry;
pub mod tensor;
pub mod tensorshape;
mod test_util;

pub type AdvFloat = f64;

pub use crate::backend::{Backends, BespokeLibrary, EstimatorLibrary, GradientLibrary};
pub use crate::classifier::Classifier;
pub use crate::clip::clip_l2_norm;
pub use crate::config::EvaluationConfig;
pub use crate::error::AttackError;
pub use crate::evaluate::{evaluate, AttackReport};
pub use crate::name::AttackName;
pub use crate::params::{AttackParams, AttackSpec};
pub use crate::registry::Registry;
pub use crate::tensor::{Device, LabelBatch, SampleBatch};
