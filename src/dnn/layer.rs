use crate::AdvFloat;
use dyn_clone::DynClone;
use ndarray::Array2;
use std::fmt::{Debug, Display};

/// A layer acting on flattened samples, `(batch, features)`.
#[typetag::serde(tag = "type")]
pub trait Layer: DynClone + Display + Debug {
    fn input_dims(&self) -> usize;

    fn output_dims(&self) -> usize;

    fn forward2(&self, input: &Array2<AdvFloat>) -> Array2<AdvFloat>;

    /// Pulls `grad_output` (gradient w.r.t. this layer's output) back to the
    /// gradient w.r.t. `input`.
    fn backward2(
        &self,
        input: &Array2<AdvFloat>,
        grad_output: &Array2<AdvFloat>,
    ) -> Array2<AdvFloat>;
}

// This implements `Clone` for the trait
dyn_clone::clone_trait_object!(Layer);
