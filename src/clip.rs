//! L2 projection of adversarial samples back onto a perturbation budget.
use ndarray::{Array, ArrayView, Dimension, ScalarOperand};
use num::{Float, ToPrimitive};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ClipError {
    #[error("clean sample shape {clean:?} does not match adversarial sample shape {adversarial:?}")]
    ShapeMismatch {
        clean: Vec<usize>,
        adversarial: Vec<usize>,
    },
    #[error("clean and adversarial batches live on different devices")]
    DeviceMismatch,
    #[error("perturbation budget must be a non-negative number, got {eps}")]
    InvalidEpsilon { eps: f64 },
}

/// L2 norm over every element of `x`, regardless of its dimensionality.
///
/// Elements are scaled by the largest magnitude before squaring, so finite
/// tensors whose squared sum would overflow still get a finite norm.
pub fn l2_norm<A: Float, D: Dimension>(x: ArrayView<A, D>) -> A {
    let scale = x.iter().fold(A::zero(), |m, &v| m.max(v.abs()));
    if scale.is_zero() || scale.is_infinite() {
        return scale;
    }
    let sum = x.iter().fold(A::zero(), |acc, &v| {
        let r = v / scale;
        acc + r * r
    });
    scale * sum.sqrt()
}

/// Projects `adv` onto the L2 ball of radius `eps` centred on `clean`.
///
/// The norm is taken over the whole tensor, so a batch passed in is treated
/// as a single point. When the perturbation already lies within the ball
/// (including exactly on its boundary) `adv` is returned unchanged.
///
/// # Errors
/// `ShapeMismatch` if the two tensors differ in shape, `InvalidEpsilon` if
/// `eps` is negative or NaN.
pub fn clip_l2_norm<A, D>(
    clean: ArrayView<A, D>,
    adv: ArrayView<A, D>,
    eps: A,
) -> Result<Array<A, D>, ClipError>
where
    A: Float + ScalarOperand,
    D: Dimension,
{
    if clean.shape() != adv.shape() {
        return Err(ClipError::ShapeMismatch {
            clean: clean.shape().to_vec(),
            adversarial: adv.shape().to_vec(),
        });
    }
    if eps.is_nan() || eps < A::zero() {
        return Err(ClipError::InvalidEpsilon {
            eps: eps.to_f64().unwrap_or(f64::NAN),
        });
    }
    let noise = &adv - &clean;
    let norm = l2_norm(noise.view());
    if norm > eps {
        Ok(&clean + &(noise * (eps / norm)))
    } else {
        Ok(adv.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, Array1, Array4, Zip};
    use proptest::prelude::*;

    #[test]
    fn test_within_budget_is_identity() {
        let clean: Array4<f64> = Array4::zeros((1, 3, 4, 4));
        let adv = clean.clone();
        let out = clip_l2_norm(clean.view(), adv.view(), 0.1).unwrap();
        assert_eq!(out, adv);
    }

    #[test]
    fn test_outside_budget_is_rescaled_onto_boundary() {
        let clean: Array1<f64> = Array1::zeros(3);
        let adv = arr1(&[3., 4., 0.]);
        let out = clip_l2_norm(clean.view(), adv.view(), 1.).unwrap();
        assert_abs_diff_eq!(l2_norm((&out - &clean).view()), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(out[0], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(out[2], 0., epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_is_not_rescaled() {
        let clean = arr1(&[1., 1.]);
        let adv = arr1(&[4., 5.]);
        let out = clip_l2_norm(clean.view(), adv.view(), 5.).unwrap();
        assert_eq!(out, adv);
    }

    #[test]
    fn test_norm_spans_the_whole_batch() {
        // Each sample alone is within budget, the batch as a whole is not.
        let clean: Array1<f32> = Array1::zeros(4);
        let adv = arr1(&[0.5f32, 0.5, 0.5, 0.5]);
        let out = clip_l2_norm(clean.view(), adv.view(), 0.5).unwrap();
        assert_abs_diff_eq!(l2_norm(out.view()), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_norm_of_huge_perturbation_is_finite() {
        let x = arr1(&[3e200, 4e200]);
        assert_abs_diff_eq!(l2_norm(x.view()) / 5e200, 1., epsilon = 1e-12);
        assert_eq!(l2_norm(arr1(&[1., f64::INFINITY]).view()), f64::INFINITY);
    }

    #[test]
    fn test_huge_perturbation_is_rescaled_onto_boundary() {
        let clean: Array1<f64> = Array1::zeros(4);
        let adv = arr1(&[1e200, -1e200, 1e200, -1e200]);
        let out = clip_l2_norm(clean.view(), adv.view(), 1.).unwrap();
        assert_abs_diff_eq!(l2_norm(out.view()), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let clean: Array1<f64> = Array1::zeros(3);
        let adv: Array1<f64> = Array1::zeros(4);
        assert_eq!(
            clip_l2_norm(clean.view(), adv.view(), 1.),
            Err(ClipError::ShapeMismatch {
                clean: vec![3],
                adversarial: vec![4]
            })
        );
    }

    #[test]
    fn test_invalid_epsilon() {
        let x: Array1<f64> = Array1::zeros(3);
        assert!(matches!(
            clip_l2_norm(x.view(), x.view(), -1.),
            Err(ClipError::InvalidEpsilon { .. })
        ));
        assert!(clip_l2_norm(x.view(), x.view(), f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn test_clipped_norm_never_exceeds_eps(
            (clean, adv) in clean_adv_pair(2, 3, 4, 4),
            eps in 0.01f64..5.,
        ) {
            let out = clip_l2_norm(clean.view(), adv.view(), eps).unwrap();
            let norm = l2_norm((&out - &clean).view());
            prop_assert!(norm <= eps + 1e-9, "norm {} > eps {}", norm, eps);
        }

        #[test]
        fn test_clipped_perturbation_is_colinear(
            (clean, adv) in clean_adv_pair(1, 3, 2, 2),
            eps in 0.01f64..5.,
        ) {
            let before = &adv - &clean;
            let out = clip_l2_norm(clean.view(), adv.view(), eps).unwrap();
            let after = &out - &clean;
            let before_norm = l2_norm(before.view());
            if before_norm > eps {
                let scale = eps / before_norm;
                prop_assert!(Zip::from(&before)
                    .and(&after)
                    .all(|&b, &a| (b * scale - a).abs() < 1e-9));
            } else {
                prop_assert_eq!(out, adv);
            }
        }
    }
}
