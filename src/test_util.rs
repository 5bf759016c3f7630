#![cfg(test)]
use crate::AdvFloat;
use ndarray::{Array1, Array2, Array4, ArrayView1, Axis};
use proptest::arbitrary::functor::ArbitraryF1;
use proptest::prelude::*;
use proptest::sample::SizeRange;

prop_compose! {
    pub fn array1(len: usize)(v in Vec::lift1_with(-10. .. 10., SizeRange::new(len..=len))) -> Array1<AdvFloat> {
        Array1::from_vec(v)
    }
}

prop_compose! {
    pub fn array2(rows: usize, cols: usize)(v in Vec::lift1_with(array1(cols), SizeRange::new(rows..=rows))) -> Array2<AdvFloat> {
        assert!(rows > 0);
        ndarray::stack(Axis(0), &v.iter().map(|x| x.view()).collect::<Vec<ArrayView1<AdvFloat>>>()).unwrap()
    }
}

prop_compose! {
    /// Image batch with pixels in `[0, 1]`.
    pub fn sample_batch4(n: usize, c: usize, h: usize, w: usize)(v in Vec::lift1_with(0. ..=1., SizeRange::new(n * c * h * w..=n * c * h * w))) -> Array4<AdvFloat> {
        Array4::from_shape_vec((n, c, h, w), v).unwrap()
    }
}

prop_compose! {
    /// A clean batch and a perturbed copy whose perturbation is in `[-1, 1]` per pixel.
    pub fn clean_adv_pair(n: usize, c: usize, h: usize, w: usize)(
        clean in sample_batch4(n, c, h, w),
        noise in Vec::lift1_with(-1. ..=1., SizeRange::new(n * c * h * w..=n * c * h * w)),
    ) -> (Array4<AdvFloat>, Array4<AdvFloat>) {
        let noise = Array4::from_shape_vec((n, c, h, w), noise).unwrap();
        let adv = &clean + &noise;
        (clean, adv)
    }
}
