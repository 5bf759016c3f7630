use crate::dnn::layer::Layer;
use crate::AdvFloat;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ReLU {
    ndims: usize,
}

impl ReLU {
    pub const fn new(ndims: usize) -> Self {
        Self { ndims }
    }
}

impl Display for ReLU {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "ReLU")
    }
}

#[typetag::serde]
impl Layer for ReLU {
    fn input_dims(&self) -> usize {
        self.ndims
    }

    fn output_dims(&self) -> usize {
        self.ndims
    }

    fn forward2(&self, input: &Array2<AdvFloat>) -> Array2<AdvFloat> {
        input.mapv(|x| if x.lt(&0.) { 0. } else { x })
    }

    fn backward2(
        &self,
        input: &Array2<AdvFloat>,
        grad_output: &Array2<AdvFloat>,
    ) -> Array2<AdvFloat> {
        Zip::from(input)
            .and(grad_output)
            .map_collect(|&x, &g| if x > 0. { g } else { 0. })
    }
}
