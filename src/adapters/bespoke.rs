//! Attacks implemented outside any shared library, each configured entirely by
//! its own parameters.
use crate::backend::{Backends, BespokeAttack};
use crate::classifier::Classifier;
use crate::error::AttackError;
use crate::name::AttackName;
use crate::params::AttackParams;
use crate::tensor::{LabelBatch, SampleBatch};
use log::debug;

fn run_bespoke(
    attack_name: AttackName,
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    attack: &BespokeAttack,
) -> Result<SampleBatch, AttackError> {
    debug!("{}: {:?}", attack_name, attack);
    let adv = backends
        .bespoke
        .generate(attack, model, xs, ys)
        .map_err(|source| AttackError::Backend {
            attack: attack_name,
            source,
        })?;
    Ok(xs.with_data(adv))
}

/// Standard AutoAttack evaluation over the whole batch at once.
///
/// # Errors
/// `ParamsMismatch` for another attack's parameters, or `Backend` with the
/// attack's error. The remaining adapters here fail the same way.
pub fn autoattack_linf(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, AutoattackLinf);
    let attack = BespokeAttack::AutoAttack {
        norm: p.norm,
        eps: p.eps,
        version: p.version,
        verbose: p.verbose,
        batch_size: xs.len(),
    };
    run_bespoke(AttackName::AutoattackLinf, backends, model, xs, ys, &attack)
}

pub fn mim_linf(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, MimLinf);
    let attack = BespokeAttack::MomentumIterative(p);
    run_bespoke(AttackName::MimLinf, backends, model, xs, ys, &attack)
}

/// Query-only; the model's gradients are never requested.
pub fn ba(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Ba);
    run_bespoke(AttackName::Ba, backends, model, xs, ys, &BespokeAttack::Boundary(p))
}

pub fn bim(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Bim);
    let attack = BespokeAttack::BasicIterative(p);
    run_bespoke(AttackName::Bim, backends, model, xs, ys, &attack)
}

pub fn blb(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Blb);
    let attack = BespokeAttack::BoxConstrainedLbfgs(p);
    run_bespoke(AttackName::Blb, backends, model, xs, ys, &attack)
}

pub fn cw2(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Cw2);
    let attack = BespokeAttack::CarliniWagnerL2(p);
    run_bespoke(AttackName::Cw2, backends, model, xs, ys, &attack)
}

pub fn deepfool(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Deepfool);
    let attack = BespokeAttack::DeepFool(p);
    run_bespoke(AttackName::Deepfool, backends, model, xs, ys, &attack)
}

pub fn ead(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Ead);
    let attack = BespokeAttack::ElasticNet(p);
    run_bespoke(AttackName::Ead, backends, model, xs, ys, &attack)
}

pub fn llc(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Llc);
    let attack = BespokeAttack::LeastLikelyClass(p);
    run_bespoke(AttackName::Llc, backends, model, xs, ys, &attack)
}

pub fn om(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Om);
    let attack = BespokeAttack::OptimizationMargin(p);
    run_bespoke(AttackName::Om, backends, model, xs, ys, &attack)
}

pub fn jsm(
    backends: &Backends,
    model: &dyn Classifier,
    xs: &SampleBatch,
    ys: &LabelBatch,
    params: &AttackParams,
) -> Result<SampleBatch, AttackError> {
    let p = expect_params!(params, Jsm);
    let attack = BespokeAttack::SaliencyMap(p);
    run_bespoke(AttackName::Jsm, backends, model, xs, ys, &attack)
}
