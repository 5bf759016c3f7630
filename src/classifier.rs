//! The model handle every attack is run against.
use crate::AdvFloat;
use ndarray::{s, Array1, Array2, Array4, ArrayView1, ArrayView4, Axis};
use ndarray_stats::QuantileExt;

/// An image classifier as seen by the attacks.
///
/// Decision-based attacks only need `predict`. White-box attacks additionally
/// need `loss_gradient`; classifiers that cannot differentiate keep the
/// default, which returns `None`. Gradient access is judged from
/// `loss_gradient` alone, see [`exposes_gradients`].
pub trait Classifier {
    fn num_classes(&self) -> usize;

    /// Class scores (logits), `(batch, num_classes)`.
    fn predict(&self, xs: ArrayView4<AdvFloat>) -> Array2<AdvFloat>;

    /// Gradient of each sample's cross-entropy loss with respect to its input.
    ///
    /// `None` if the classifier cannot differentiate, or if `ys` does not
    /// hold one known class per sample.
    fn loss_gradient(
        &self,
        _xs: ArrayView4<AdvFloat>,
        _ys: ArrayView1<usize>,
    ) -> Option<Array4<AdvFloat>> {
        None
    }

    /// Most likely class per sample. Rows containing NaN map to class 0.
    fn predict_labels(&self, xs: ArrayView4<AdvFloat>) -> Array1<usize> {
        self.predict(xs)
            .axis_iter(Axis(0))
            .map(|row| row.argmax().unwrap_or(0))
            .collect()
    }
}

/// Whether `model` returns input gradients for samples shaped like `xs`.
///
/// Asks for the gradient of an empty batch, so no forward pass over real data
/// is paid for.
pub fn exposes_gradients(model: &dyn Classifier, xs: ArrayView4<AdvFloat>) -> bool {
    let none = xs.slice(s![..0, .., .., ..]);
    model
        .loss_gradient(none, Array1::<usize>::zeros(0).view())
        .is_some()
}

/// Numerically stable row-wise softmax.
pub fn softmax(logits: &Array2<AdvFloat>) -> Array2<AdvFloat> {
    let mut out = logits.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.fold(AdvFloat::NEG_INFINITY, |m, &x| m.max(x));
        row.mapv_inplace(|x| (x - max).exp());
        let total = row.sum();
        row.mapv_inplace(|x| x / total);
    }
    out
}
