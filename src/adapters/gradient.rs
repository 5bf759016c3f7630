//! Perturbation-bounded gradient attacks.
use crate::backend::{
    Backends, Estimator, EstimatorAttack, GradientAttack, Loss, Preprocessing, IMAGENET_MEAN,
    IMAGENET_STD,
};
use crate::classifier::Classifier;
use crate::error::AttackError;
use crate::name::AttackName;
use crate::params::{AttackParams, Norm};
use crate::tensor::{Device, LabelBatch, SampleBatch};
use crate::tensorshape::TensorShape;
use crate::AdvFloat;
use log::debug;

/// Runs a gradient-library attack and keeps only the raw adversarials.
fn run_gradient_library(
    attack_name: AttackName,
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    attack: &GradientAttack,
    eps: AdvFloat,
) -> Result<SampleBatch, AttackError> {
    debug!("{}: {:?} at eps {}", attack_name, attack, eps);
    let outcome = backends
        .gradient
        .run(attack, model, xs, ys, eps)
        .map_err(|source| AttackError::Backend {
            attack: attack_name,
            source,
        })?;
    debug!(
        "{}: library reports {}/{} successful",
        attack_name,
        outcome.success.iter().filter(|&&s| s).count(),
        outcome.success.len()
    );
    Ok(xs.with_data(outcome.raw))
}

/// # Errors
/// `ParamsMismatch` for another attack's parameters, or `Backend` with the
/// library's error.
pub fn pgd_linf(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, PgdLinf);
    let attack = GradientAttack::LinfProjectedGradientDescent {
        rel_stepsize: p.rel_stepsize,
        steps: p.steps,
    };
    run_gradient_library(AttackName::PgdLinf, backends, model, xs, ys, &attack, p.eps)
}

/// L2 counterpart of [`pgd_linf`].
///
/// # Errors
/// As [`pgd_linf`].
pub fn pgd_l2(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, PgdL2);
    let attack = GradientAttack::L2ProjectedGradientDescent {
        rel_stepsize: p.rel_stepsize,
        steps: p.steps,
    };
    run_gradient_library(AttackName::PgdL2, backends, model, xs, ys, &attack, p.eps)
}

/// # Errors
/// As [`pgd_linf`].
pub fn fgsm(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Fgsm);
    run_gradient_library(
        AttackName::Fgsm,
        backends,
        model,
        xs,
        ys,
        &GradientAttack::LinfFastGradient,
        p.eps,
    )
}

/// L1 PGD through the estimator library.
///
/// The model is re-wrapped on every call: cross-entropy loss, RGB square
/// inputs of the configured size, pixel range `[0, 1]` and ImageNet
/// normalisation, computing on the accelerator. The library reads and writes
/// host batches, which the registry arranges through the parameters'
/// residency; the result keeps the residency of `xs`.
///
/// # Errors
/// `ParamsMismatch` for another attack's parameters, `ShapeMismatch` if the
/// samples are not `(3, input_size, input_size)` images, or `Backend` with
/// the library's error.
pub fn pgd_l1(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, PgdL1);
    let estimator = Estimator {
        model,
        loss: Loss::CrossEntropy,
        input_shape: TensorShape::batched(&[3, p.input_size, p.input_size]),
        nb_classes: model.num_classes(),
        clip_values: (0., 1.),
        preprocessing: Preprocessing {
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        },
        device: Device::Accelerator,
    };
    let attack = EstimatorAttack::ProjectedGradientDescent {
        norm: Norm::L1,
        eps: p.eps,
        eps_step: p.eps_step,
        max_iter: p.max_iter,
        num_random_init: 1,
        batch_size: p.batch_size,
        verbose: false,
    };
    if !estimator.input_shape.is_compatible_with(&xs.shape()) {
        return Err(AttackError::ShapeMismatch {
            attack: AttackName::PgdL1,
            expected: estimator.input_shape,
            given: xs.shape(),
        });
    }
    debug!("pgd_l1: {:?} on {}", attack, xs.device());
    let adv = backends
        .estimator
        .generate(&estimator, &attack, xs, ys)
        .map_err(|source| AttackError::Backend {
            attack: AttackName::PgdL1,
            source,
        })?;
    Ok(xs.with_data(adv))
}
