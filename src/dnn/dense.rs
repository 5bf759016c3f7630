use crate::dnn::layer::Layer;
use crate::AdvFloat;
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully connected layer, `y = x W^T + b` with `W` of shape `(out, in)`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Dense {
    weights: Array2<AdvFloat>,
    bias: Array1<AdvFloat>,
}

impl Dense {
    /// # Panics
    /// If `bias` does not have one entry per output.
    pub fn new(weights: Array2<AdvFloat>, bias: Array1<AdvFloat>) -> Self {
        assert_eq!(weights.nrows(), bias.len());
        Self { weights, bias }
    }

    /// He-style initialisation with a zero bias.
    pub fn random<R: Rng>(input_dims: usize, output_dims: usize, rng: &mut R) -> Self {
        let std_dev = (2. / input_dims.max(1) as AdvFloat).sqrt();
        Self {
            weights: Array2::random_using((output_dims, input_dims), StandardNormal, rng) * std_dev,
            bias: Array1::zeros(output_dims),
        }
    }

    pub fn weights(&self) -> &Array2<AdvFloat> {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<AdvFloat> {
        &self.bias
    }
}

#[typetag::serde]
impl Layer for Dense {
    fn input_dims(&self) -> usize {
        self.weights.ncols()
    }

    fn output_dims(&self) -> usize {
        self.weights.nrows()
    }

    fn forward2(&self, input: &Array2<AdvFloat>) -> Array2<AdvFloat> {
        debug_assert_eq!(input.len_of(Axis(1)), self.input_dims());
        input.dot(&self.weights.t()) + &self.bias
    }

    fn backward2(
        &self,
        _input: &Array2<AdvFloat>,
        grad_output: &Array2<AdvFloat>,
    ) -> Array2<AdvFloat> {
        grad_output.dot(&self.weights)
    }
}

impl fmt::Display for Dense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Dense {}", self.output_dims())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{arr1, arr2};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_forward_and_backward() {
        let dense = Dense::new(arr2(&[[1., 2.], [0., -1.], [3., 0.]]), arr1(&[0.5, 0., -1.]));
        let out = dense.forward2(&arr2(&[[1., 1.]]));
        assert_eq!(out, arr2(&[[3.5, -1., 2.]]));
        let grad = dense.backward2(&arr2(&[[1., 1.]]), &arr2(&[[1., 0., 1.]]));
        assert_eq!(grad, arr2(&[[4., 2.]]));
    }

    #[test]
    fn test_random_shapes() {
        let mut rng = Pcg64::seed_from_u64(7);
        let dense = Dense::random(12, 5, &mut rng);
        assert_eq!(dense.input_dims(), 12);
        assert_eq!(dense.output_dims(), 5);
        assert!(dense.bias().iter().all(|&b| b == 0.));
    }
}
