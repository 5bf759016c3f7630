use crate::classifier::{softmax, Classifier};
use crate::dnn::{Dense, Layer, ReLU};
use crate::tensorshape::TensorShape;
use crate::AdvFloat;
use log::trace;
use ndarray::{Array2, Array4, ArrayView1, ArrayView4, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Feed-forward classifier over flattened `(channel, height, width)` images.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DNN {
    sample_dims: [usize; 3],
    layers: Vec<Box<dyn Layer>>,
}

impl DNN {
    /// # Panics
    /// If consecutive layers disagree on their dimensions, or the first layer
    /// does not accept a flattened sample.
    pub fn new(sample_dims: [usize; 3], layers: Vec<Box<dyn Layer>>) -> Self {
        let mut dims = sample_dims.iter().product::<usize>();
        for layer in &layers {
            assert_eq!(layer.input_dims(), dims, "layer {} has the wrong input", layer);
            dims = layer.output_dims();
        }
        Self {
            sample_dims,
            layers,
        }
    }

    /// Dense/ReLU stack with randomly initialised weights and a linear head.
    pub fn random<R: Rng>(
        sample_dims: [usize; 3],
        hidden: &[usize],
        num_classes: usize,
        rng: &mut R,
    ) -> Self {
        let mut layers: Vec<Box<dyn Layer>> = vec![];
        let mut dims = sample_dims.iter().product::<usize>();
        for &width in hidden {
            layers.push(Box::new(Dense::random(dims, width, rng)));
            layers.push(Box::new(ReLU::new(width)));
            dims = width;
        }
        layers.push(Box::new(Dense::random(dims, num_classes, rng)));
        Self::new(sample_dims, layers)
    }

    pub fn input_shape(&self) -> TensorShape {
        TensorShape::batched(&self.sample_dims)
    }

    fn flatten(xs: ArrayView4<AdvFloat>) -> Array2<AdvFloat> {
        let (n, c, h, w) = xs.dim();
        Array2::from_shape_fn((n, c * h * w), |(i, j)| {
            xs[[i, j / (h * w), (j / w) % h, j % w]]
        })
    }

    fn unflatten(&self, flat: &Array2<AdvFloat>) -> Array4<AdvFloat> {
        let [c, h, w] = self.sample_dims;
        Array4::from_shape_fn((flat.nrows(), c, h, w), |(i, k, y, x)| {
            flat[[i, k * h * w + y * w + x]]
        })
    }

    /// Activations entering each layer, followed by the network's output.
    fn activations(&self, xs: ArrayView4<AdvFloat>) -> Vec<Array2<AdvFloat>> {
        let mut acts = vec![Self::flatten(xs)];
        for layer in &self.layers {
            let next = layer.forward2(&acts[acts.len() - 1]);
            acts.push(next);
        }
        acts
    }
}

impl Classifier for DNN {
    fn num_classes(&self) -> usize {
        self.layers
            .last()
            .map_or_else(|| self.sample_dims.iter().product(), |l| l.output_dims())
    }

    fn predict(&self, xs: ArrayView4<AdvFloat>) -> Array2<AdvFloat> {
        let flat = Self::flatten(xs);
        self.layers.iter().fold(flat, |x, layer| layer.forward2(&x))
    }

    fn loss_gradient(
        &self,
        xs: ArrayView4<AdvFloat>,
        ys: ArrayView1<usize>,
    ) -> Option<Array4<AdvFloat>> {
        let num_classes = self.num_classes();
        if ys.len() != xs.len_of(Axis(0)) || ys.iter().any(|&y| y >= num_classes) {
            return None;
        }
        let mut acts = self.activations(xs);
        let logits = acts.pop()?;
        // d(CE)/d(logits) = softmax - onehot
        let mut grad = softmax(&logits);
        for (mut row, &y) in grad.axis_iter_mut(Axis(0)).zip(ys.iter()) {
            row[y] -= 1.;
        }
        for (layer, input) in self.layers.iter().zip(acts.iter()).rev() {
            trace!("backward through {}", layer);
            grad = layer.backward2(input, &grad);
        }
        Some(self.unflatten(&grad))
    }
}

impl fmt::Display for DNN {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let layers: Vec<String> = self.layers.iter().map(|x| format!("{}", x)).collect();
        write!(f, "Input {} => {}", self.input_shape(), layers.join(" => "))
    }
}
