//! Sample and label batches with explicit device residency.
use crate::clip::{self, ClipError};
use crate::tensorshape::TensorShape;
use crate::AdvFloat;
use log::trace;
use ndarray::{Array1, Array4, ArrayView1, ArrayView4, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a batch's data is resident.
///
/// Batches are always backed by host memory on the Rust side; the tag records
/// where a backend expects to find (or has produced) the data, so placement
/// decisions are made by whoever calls an adapter instead of inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Host,
    Accelerator,
}

impl Default for Device {
    fn default() -> Self {
        Self::Host
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Accelerator => write!(f, "accelerator"),
        }
    }
}

/// Batch of images, `(batch, channel, height, width)`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SampleBatch {
    data: Array4<AdvFloat>,
    device: Device,
}

impl SampleBatch {
    pub fn new(data: Array4<AdvFloat>, device: Device) -> Self {
        Self { data, device }
    }

    pub fn on_host(data: Array4<AdvFloat>) -> Self {
        Self::new(data, Device::Host)
    }

    pub fn view(&self) -> ArrayView4<AdvFloat> {
        self.data.view()
    }

    pub fn into_inner(self) -> Array4<AdvFloat> {
        self.data
    }

    pub const fn device(&self) -> Device {
        self.device
    }

    pub fn shape(&self) -> TensorShape {
        TensorShape::from(self.data.shape())
    }

    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape of a single sample, `(channel, height, width)`.
    pub fn sample_dims(&self) -> [usize; 3] {
        let (_, c, h, w) = self.data.dim();
        [c, h, w]
    }

    /// Moves the batch to `device`. A no-op if it already lives there.
    pub fn to_device(self, device: Device) -> Self {
        if self.device != device {
            trace!(
                "moving sample batch {} from {} to {}",
                self.shape(),
                self.device,
                device
            );
        }
        Self {
            data: self.data,
            device,
        }
    }

    /// Replaces the batch's data, keeping its residency.
    pub fn with_data(&self, data: Array4<AdvFloat>) -> Self {
        Self::new(data, self.device)
    }

    /// Projects `adv` onto the L2 ball of radius `eps` around this batch.
    ///
    /// # Errors
    /// Fails if the batches differ in shape or device, or if `eps` is invalid.
    pub fn clip_l2_norm(&self, adv: &Self, eps: AdvFloat) -> Result<Self, ClipError> {
        if self.device != adv.device {
            return Err(ClipError::DeviceMismatch);
        }
        let clipped = clip::clip_l2_norm(self.data.view(), adv.data.view(), eps)?;
        Ok(self.with_data(clipped))
    }
}

/// Integer class labels aligned with a `SampleBatch`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelBatch {
    data: Array1<usize>,
    device: Device,
}

impl LabelBatch {
    pub fn new(data: Array1<usize>, device: Device) -> Self {
        Self { data, device }
    }

    pub fn on_host(data: Array1<usize>) -> Self {
        Self::new(data, Device::Host)
    }

    pub fn view(&self) -> ArrayView1<usize> {
        self.data.view()
    }

    pub const fn device(&self) -> Device {
        self.device
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_device(self, device: Device) -> Self {
        if self.device != device {
            trace!(
                "moving {} labels from {} to {}",
                self.len(),
                self.device,
                device
            );
        }
        Self {
            data: self.data,
            device,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sample_batch_accessors() {
        let batch = SampleBatch::on_host(Array4::zeros((2, 3, 5, 5)));
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert_eq!(batch.sample_dims(), [3, 5, 5]);
        assert_eq!(batch.shape(), TensorShape::from(vec![2, 3, 5, 5]));
        assert_eq!(batch.device(), Device::Host);
    }

    #[test]
    fn test_clip_requires_same_device() {
        let clean = SampleBatch::on_host(Array4::zeros((1, 1, 2, 2)));
        let adv = SampleBatch::new(Array4::ones((1, 1, 2, 2)), Device::Accelerator);
        assert_eq!(clean.clip_l2_norm(&adv, 0.5), Err(ClipError::DeviceMismatch));
    }

    #[test]
    fn test_clip_keeps_residency() {
        let clean = SampleBatch::new(Array4::zeros((1, 1, 2, 2)), Device::Accelerator);
        let adv = clean.with_data(Array4::ones((1, 1, 2, 2)));
        let out = clean.clip_l2_norm(&adv, 1.).unwrap();
        assert_eq!(out.device(), Device::Accelerator);
        assert!((clip::l2_norm(out.view()) - 1.).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn test_round_trip_device_preserves_data(from: Device, to: Device) {
            let data = Array4::from_shape_fn((2, 1, 2, 2), |(b, _, h, w)| (b + h * w) as AdvFloat);
            let batch = SampleBatch::new(data.clone(), from);
            let moved = batch.to_device(to);
            prop_assert_eq!(moved.device(), to);
            prop_assert_eq!(moved.to_device(from), SampleBatch::new(data, from));
        }
    }
}
