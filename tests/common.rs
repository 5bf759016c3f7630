#![allow(dead_code)]
use adversarial_rs::backend::{
    BespokeAttack, BespokeLibrary, Estimator, EstimatorAttack, EstimatorLibrary, GradientAttack,
    GradientLibrary, GradientOutcome, Preprocessing,
};
use adversarial_rs::dnn::DNN;
use adversarial_rs::error::BackendError;
use adversarial_rs::tensor::{Device, LabelBatch, SampleBatch};
use adversarial_rs::tensorshape::TensorShape;
use adversarial_rs::{AdvFloat, AttackParams, Backends, Classifier};
use ndarray::{Array1, Array2, Array4, ArrayView4, Axis};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde_json::json;
use std::cell::RefCell;

pub const SAMPLE_DIMS: [usize; 3] = [3, 4, 4];
pub const NUM_CLASSES: usize = 10;

pub fn make_dnn(seed: u64) -> DNN {
    DNN::random(SAMPLE_DIMS, &[16], NUM_CLASSES, &mut Pcg64::seed_from_u64(seed))
}

pub fn make_batch(n: usize) -> (Array4<AdvFloat>, Array1<usize>) {
    let [c, h, w] = SAMPLE_DIMS;
    let xs = Array4::from_shape_fn((n, c, h, w), |(i, k, y, x)| {
        ((i * 31 + k * 7 + y * 3 + x) % 11) as AdvFloat / 10.
    });
    let ys = Array1::from_shape_fn(n, |i| i % NUM_CLASSES);
    (xs, ys)
}

/// A classifier that only answers queries.
pub struct QueryOnly(pub DNN);

impl Classifier for QueryOnly {
    fn num_classes(&self) -> usize {
        self.0.num_classes()
    }

    fn predict(&self, xs: ArrayView4<AdvFloat>) -> Array2<AdvFloat> {
        self.0.predict(xs)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorCall {
    pub input_shape: TensorShape,
    pub nb_classes: usize,
    pub clip_values: (AdvFloat, AdvFloat),
    pub preprocessing: Preprocessing,
    pub device: Device,
    pub attack: EstimatorAttack,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Gradient { attack: GradientAttack, eps: AdvFloat },
    Estimator(EstimatorCall),
    Bespoke { attack: String, batch_size: Option<usize> },
}

/// Stands in for every attack library: records the native configuration it
/// was called with, and where its inputs were resident, and nudges every
/// pixel by `shift`.
#[derive(Default)]
pub struct Recorder {
    pub calls: RefCell<Vec<Call>>,
    pub devices: RefCell<Vec<(Device, Device)>>,
    pub shift: AdvFloat,
    pub fail_with: Option<String>,
    pub wrong_shape: bool,
}

impl Recorder {
    pub fn shifting(shift: AdvFloat) -> Self {
        Self {
            shift,
            ..Self::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::default()
        }
    }

    pub fn backends(&self) -> Backends {
        Backends {
            gradient: self,
            estimator: self,
            bespoke: self,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Residency of the sample and label batches of every call.
    pub fn devices(&self) -> Vec<(Device, Device)> {
        self.devices.borrow().clone()
    }

    fn respond(&self, xs: &SampleBatch, ys: &LabelBatch) -> Result<Array4<AdvFloat>, BackendError> {
        self.devices.borrow_mut().push((xs.device(), ys.device()));
        if let Some(msg) = &self.fail_with {
            return Err(msg.clone().into());
        }
        let adv = xs.view().mapv(|x| x + self.shift);
        if self.wrong_shape {
            Ok(adv.index_axis(Axis(0), 0).insert_axis(Axis(0)).to_owned())
        } else {
            Ok(adv)
        }
    }
}

impl GradientLibrary for Recorder {
    fn run(
        &self,
        attack: &GradientAttack,
        _model: &dyn Classifier,
        xs: &SampleBatch,
        ys: &LabelBatch,
        epsilon: AdvFloat,
    ) -> Result<GradientOutcome, BackendError> {
        self.calls.borrow_mut().push(Call::Gradient {
            attack: attack.clone(),
            eps: epsilon,
        });
        let raw = self.respond(xs, ys)?;
        let clipped = raw.mapv(|x| x.max(0.).min(1.));
        let success = Array1::from_elem(raw.len_of(Axis(0)), true);
        Ok(GradientOutcome {
            raw,
            clipped,
            success,
        })
    }
}

impl EstimatorLibrary for Recorder {
    fn generate(
        &self,
        estimator: &Estimator,
        attack: &EstimatorAttack,
        x: &SampleBatch,
        y: &LabelBatch,
    ) -> Result<Array4<AdvFloat>, BackendError> {
        self.calls.borrow_mut().push(Call::Estimator(EstimatorCall {
            input_shape: estimator.input_shape.clone(),
            nb_classes: estimator.nb_classes,
            clip_values: estimator.clip_values,
            preprocessing: estimator.preprocessing,
            device: estimator.device,
            attack: attack.clone(),
        }));
        self.respond(x, y)
    }
}

impl BespokeLibrary for Recorder {
    fn generate(
        &self,
        attack: &BespokeAttack,
        _model: &dyn Classifier,
        xs: &SampleBatch,
        ys: &LabelBatch,
    ) -> Result<Array4<AdvFloat>, BackendError> {
        let batch_size = match attack {
            BespokeAttack::AutoAttack { batch_size, .. } => Some(*batch_size),
            _ => None,
        };
        self.calls.borrow_mut().push(Call::Bespoke {
            attack: format!("{:?}", attack),
            batch_size,
        });
        self.respond(xs, ys)
    }
}

/// A complete parameter bag for every registered attack.
pub fn full_bags() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        ("pgd_l1", json!({"eps": 10.0, "input_size": 4, "eps_step": 1.0, "max_iter": 10, "batch_size": 8})),
        ("pgd_linf", json!({"eps": 0.03, "rel_stepsize": 0.1, "steps": 20})),
        ("pgd_l2", json!({"eps": 1.0, "rel_stepsize": 0.025, "steps": 50})),
        ("fgsm", json!({"eps": 0.03})),
        ("autoattack_linf", json!({"norm": "Linf", "eps": 0.0313, "version": "standard", "verbose": false})),
        ("mim_linf", json!({"eps": 0.03, "num_steps": 10, "step_size": 0.003, "decay_factor": 1.0})),
        ("cw2", json!({
            "device": "accelerator", "targeted": false, "kappa": 0.0, "lr": 0.005, "init_const": 0.01,
            "lower_bound": 0.0, "upper_bound": 1.0, "max_iter": 100, "binary_search_steps": 9
        })),
        ("deepfool", json!({"device": "accelerator", "targeted": false, "overshoot": 0.02, "max_iter": 50})),
        ("ead", json!({
            "device": "accelerator", "targeted": false, "kappa": 0.0, "lr": 0.01, "init_const": 0.001,
            "lower_bound": 0.0, "upper_bound": 1.0, "max_iter": 100, "binary_search_steps": 9,
            "class_type_number": 10, "beta": 0.001, "elastic_net": true
        })),
        ("ba", json!({
            "eps": 0.01, "delta": 0.01, "lower_bound": 0.0, "upper_bound": 1.0, "max_iter": 100,
            "binary_search_steps": 20, "batch_size": 8, "step_adapt": 0.667, "sample_size": 20,
            "init_size": 100
        })),
        ("bim", json!({"eps": 0.03, "eps_iter": 0.005, "num_steps": 10})),
        ("blb", json!({"init_const": 0.01, "max_iter": 100, "binary_search_steps": 9})),
        ("llc", json!({"device": "host", "targeted": true, "epsilon": 0.03})),
        ("om", json!({
            "device": "accelerator", "targeted": false, "kappa": 0.0, "class_type_number": 10,
            "lr": 0.005, "init_const": 0.01, "lower_bound": 0.0, "upper_bound": 1.0, "max_iter": 100,
            "binary_search_steps": 9, "noise_count": 20, "noise_magnitude": 0.3
        })),
        ("jsm", json!({"device": "accelerator", "targeted": false, "theta": 1.0, "gamma": 0.1})),
    ]
}

pub fn full_params() -> Vec<(&'static str, AttackParams)> {
    full_bags()
        .into_iter()
        .map(|(name, bag)| (name, AttackParams::from_bag(name, bag).unwrap()))
        .collect()
}
