//! Robustness evaluation of a classifier under a list of attacks.
use crate::backend::Backends;
use crate::classifier::Classifier;
use crate::clip::l2_norm;
use crate::config::EvaluationConfig;
use crate::error::AttackError;
use crate::name::AttackName;
use crate::params::AttackSpec;
use crate::registry::Registry;
use crate::tensor::{LabelBatch, SampleBatch};
use crate::AdvFloat;
use log::info;
use ndarray::{Array1, Axis, Zip};
use ordered_float::OrderedFloat;
use std::fmt;
use std::time::{Duration, Instant};

/// Outcome of one attack over the evaluation batch.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackReport {
    pub attack: AttackName,
    pub clean_accuracy: AdvFloat,
    pub adversarial_accuracy: AdvFloat,
    /// Fraction of initially correct samples the attack flipped.
    pub success_rate: AdvFloat,
    pub mean_l2: AdvFloat,
    pub max_l2: AdvFloat,
    pub max_linf: AdvFloat,
    pub duration: Duration,
}

impl fmt::Display for AttackReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: clean acc {:.4}, adv acc {:.4}, success {:.4}, L2 mean {:.4} max {:.4}, Linf max {:.4} ({:.2?})",
            self.attack,
            self.clean_accuracy,
            self.adversarial_accuracy,
            self.success_rate,
            self.mean_l2,
            self.max_l2,
            self.max_linf,
            self.duration
        )
    }
}

fn ratio(count: usize, total: usize) -> AdvFloat {
    if total == 0 {
        0.
    } else {
        count as AdvFloat / total as AdvFloat
    }
}

fn report(
    attack: AttackName,
    xs: &SampleBatch,
    adv: &SampleBatch,
    ys: &LabelBatch,
    clean_preds: &Array1<usize>,
    adv_preds: &Array1<usize>,
    duration: Duration,
) -> AttackReport {
    let n = ys.len();
    let clean_correct = Zip::from(clean_preds)
        .and(ys.view())
        .fold(0, |acc, &p, &y| acc + usize::from(p == y));
    let adv_correct = Zip::from(adv_preds)
        .and(ys.view())
        .fold(0, |acc, &p, &y| acc + usize::from(p == y));
    let flipped = Zip::from(clean_preds)
        .and(adv_preds)
        .and(ys.view())
        .fold(0, |acc, &c, &a, &y| acc + usize::from(c == y && a != y));

    let noise = &adv.view() - &xs.view();
    let l2s: Vec<AdvFloat> = noise.axis_iter(Axis(0)).map(l2_norm).collect();
    let max_l2 = l2s.iter().copied().map(OrderedFloat).max().map_or(0., |x| x.0);
    let max_linf = noise
        .iter()
        .map(|x| OrderedFloat(x.abs()))
        .max()
        .map_or(0., |x| x.0);

    AttackReport {
        attack,
        clean_accuracy: ratio(clean_correct, n),
        adversarial_accuracy: ratio(adv_correct, n),
        success_rate: ratio(flipped, clean_correct),
        mean_l2: if l2s.is_empty() {
            0.
        } else {
            l2s.iter().sum::<AdvFloat>() / l2s.len() as AdvFloat
        },
        max_l2,
        max_linf,
        duration,
    }
}

/// Runs every attack in `config` against `model` over one batch.
///
/// Attacks run in order; the first failure aborts the evaluation.
///
/// # Errors
/// Any error raised while dispatching or running an attack, or while clipping
/// its output.
pub fn evaluate(
    registry: &Registry,
    backends: &Backends,
    model: &dyn Classifier,
    config: &EvaluationConfig,
    xs: &SampleBatch,
    ys: &LabelBatch,
) -> Result<Vec<AttackReport>, AttackError> {
    let clean_preds = model.predict_labels(xs.view());
    let mut reports = Vec::with_capacity(config.attacks.len());
    for params in &config.attacks {
        let name = params.name();
        let start = Instant::now();
        let mut adv = registry.run(name.as_str(), backends, model, xs, ys, params)?;
        if let Some(eps) = config.clip_l2 {
            adv = xs.clip_l2_norm(&adv, eps)?;
        }
        let duration = start.elapsed();
        let adv_preds = model.predict_labels(adv.view());
        let report = report(name, xs, &adv, ys, &clean_preds, &adv_preds, duration);
        info!("{}", report);
        reports.push(report);
    }
    Ok(reports)
}
