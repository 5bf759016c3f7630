use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a tensor where any dimension may be left unspecified,
/// e.g. the batch dimension of an estimator's expected input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TensorShape {
    dims: Vec<Option<usize>>,
}

impl TensorShape {
    /// Shape of a single sample with an unspecified leading batch dimension.
    pub fn batched(sample_dims: &[usize]) -> Self {
        let mut dims = vec![None];
        dims.extend(sample_dims.iter().map(|&d| Some(d)));
        Self { dims }
    }

    /// True if both shapes have the same rank and agree on every dimension
    /// known to both.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        if self.dims.len() != other.dims.len() {
            return false;
        }
        self.dims
            .iter()
            .zip(other.dims.iter())
            .all(|(x, y)| match (x, y) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            })
    }
}

impl From<&[usize]> for TensorShape {
    fn from(v: &[usize]) -> Self {
        Self {
            dims: v.iter().map(|&x| Some(x)).collect(),
        }
    }
}

impl From<Vec<usize>> for TensorShape {
    fn from(v: Vec<usize>) -> Self {
        Self::from(v.as_slice())
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dims: Vec<String> = self
            .dims
            .iter()
            .map(|d| d.map_or_else(|| "None".to_string(), |d| d.to_string()))
            .collect();
        write!(f, "({})", dims.join(", "))
    }
}
