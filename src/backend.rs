//! Attack libraries the adapters drive.
//!
//! Each trait mirrors the calling convention of one family of attack
//! implementations: a gradient attack library configured per attack and run
//! at a given epsilon, an estimator library that wraps the model before
//! attacking it, and a collection of bespoke attacks configured entirely by
//! their parameters. The crate never implements the attacks; callers plug in
//! implementations of these traits.
//!
//! Every library receives the batches themselves, already placed on the
//! device the attack's parameters require, so an implementation can tell
//! where its inputs are resident and must return its output there.
use crate::classifier::Classifier;
use crate::error::BackendError;
use crate::params::{self, AutoAttackVersion, Norm};
use crate::tensor::{Device, LabelBatch, SampleBatch};
use crate::tensorshape::TensorShape;
use crate::AdvFloat;
use ndarray::{Array1, Array4};
use serde::{Deserialize, Serialize};

/// ImageNet channel statistics the estimator library normalises inputs with.
pub const IMAGENET_MEAN: [AdvFloat; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [AdvFloat; 3] = [0.229, 0.224, 0.225];

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum GradientAttack {
    LinfProjectedGradientDescent { rel_stepsize: AdvFloat, steps: usize },
    L2ProjectedGradientDescent { rel_stepsize: AdvFloat, steps: usize },
    LinfFastGradient,
}

/// What a gradient library run reports: the unclipped and clipped
/// adversarials and a per-sample success flag.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientOutcome {
    pub raw: Array4<AdvFloat>,
    pub clipped: Array4<AdvFloat>,
    pub success: Array1<bool>,
}

pub trait GradientLibrary {
    /// # Errors
    /// Whatever the library raises.
    fn run(
        &self,
        attack: &GradientAttack,
        model: &dyn Classifier,
        xs: &SampleBatch,
        ys: &LabelBatch,
        epsilon: AdvFloat,
    ) -> Result<GradientOutcome, BackendError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Loss {
    CrossEntropy,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Preprocessing {
    pub mean: [AdvFloat; 3],
    pub std: [AdvFloat; 3],
}

/// A model wrapped the way the estimator library expects it.
pub struct Estimator<'a> {
    pub model: &'a dyn Classifier,
    pub loss: Loss,
    /// Expected input shape, `(None, channel, height, width)`.
    pub input_shape: TensorShape,
    pub nb_classes: usize,
    pub clip_values: (AdvFloat, AdvFloat),
    pub preprocessing: Preprocessing,
    /// Device the estimator computes on, independent of where inputs live.
    pub device: Device,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum EstimatorAttack {
    ProjectedGradientDescent {
        norm: Norm,
        eps: AdvFloat,
        eps_step: AdvFloat,
        max_iter: usize,
        num_random_init: usize,
        batch_size: usize,
        verbose: bool,
    },
}

pub trait EstimatorLibrary {
    /// Inputs are host batches and the result is read back as one.
    ///
    /// # Errors
    /// Whatever the library raises.
    fn generate(
        &self,
        estimator: &Estimator,
        attack: &EstimatorAttack,
        x: &SampleBatch,
        y: &LabelBatch,
    ) -> Result<Array4<AdvFloat>, BackendError>;
}

/// Native configuration of a bespoke attack.
///
/// Apart from AutoAttack, whose evaluation batch size is derived from the
/// input, the attacks take their parameters exactly as the caller gave them.
#[derive(Clone, Debug, PartialEq)]
pub enum BespokeAttack<'a> {
    AutoAttack {
        norm: Norm,
        eps: AdvFloat,
        version: AutoAttackVersion,
        verbose: bool,
        batch_size: usize,
    },
    MomentumIterative(&'a params::MimLinf),
    Boundary(&'a params::Ba),
    BasicIterative(&'a params::Bim),
    BoxConstrainedLbfgs(&'a params::Blb),
    CarliniWagnerL2(&'a params::Cw2),
    DeepFool(&'a params::Deepfool),
    ElasticNet(&'a params::Ead),
    LeastLikelyClass(&'a params::Llc),
    OptimizationMargin(&'a params::Om),
    SaliencyMap(&'a params::Jsm),
}

pub trait BespokeLibrary {
    /// # Errors
    /// Whatever the attack raises.
    fn generate(
        &self,
        attack: &BespokeAttack,
        model: &dyn Classifier,
        xs: &SampleBatch,
        ys: &LabelBatch,
    ) -> Result<Array4<AdvFloat>, BackendError>;
}

/// The libraries available to the adapters for one run.
#[derive(Clone, Copy)]
pub struct Backends<'a> {
    pub gradient: &'a dyn GradientLibrary,
    pub estimator: &'a dyn EstimatorLibrary,
    pub bespoke: &'a dyn BespokeLibrary,
}
