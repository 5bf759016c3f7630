//! Immutable mapping from attack name to adapter.
use crate::adapters::{self, AttackFn};
use crate::backend::Backends;
use crate::classifier::{exposes_gradients, Classifier};
use crate::error::AttackError;
use crate::name::{AttackCategory, AttackName, ModelAccess};
use crate::params::{AttackParams, AttackSpec};
use crate::tensor::{Device, LabelBatch, SampleBatch};
use log::{debug, warn};
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Clone, Copy)]
pub struct AttackEntry {
    name: AttackName,
    adapter: AttackFn,
}

fn place<'b, T: Clone>(
    batch: &'b T,
    current: Device,
    required: Option<Device>,
    move_to: impl FnOnce(T, Device) -> T,
) -> Cow<'b, T> {
    match required {
        Some(device) if device != current => Cow::Owned(move_to(batch.clone(), device)),
        _ => Cow::Borrowed(batch),
    }
}

impl AttackEntry {
    pub const fn name(&self) -> AttackName {
        self.name
    }

    pub const fn category(&self) -> AttackCategory {
        self.name.category()
    }

    pub const fn access(&self) -> ModelAccess {
        self.name.access()
    }

    pub fn adapter(&self) -> AttackFn {
        self.adapter
    }

    /// True when this attack needs gradients `model` does not provide.
    fn lacks_gradients(&self, model: &dyn Classifier, xs: &SampleBatch) -> bool {
        self.access() == ModelAccess::Gradient && !exposes_gradients(model, xs.view())
    }

    /// Runs the adapter with the batches placed where its parameters require,
    /// returning the adversarial batch on the caller's device.
    ///
    /// # Errors
    /// `LabelMismatch` if `ys` is not aligned with `xs`, `ShapeMismatch` if the
    /// attack returns a batch of another shape, and anything the adapter
    /// itself raises.
    pub fn run(
        &self,
        backends: &Backends,
        model: &dyn Classifier,
        xs: &SampleBatch,
        ys: &LabelBatch,
        params: &AttackParams,
    ) -> Result<SampleBatch, AttackError> {
        if xs.len() != ys.len() {
            return Err(AttackError::LabelMismatch {
                samples: xs.len(),
                labels: ys.len(),
            });
        }
        if self.lacks_gradients(model, xs) {
            warn!(
                "{} needs gradients but the classifier does not expose them",
                self.name
            );
        }
        let residency = params.residency();
        let placed_xs = place(xs, xs.device(), residency, SampleBatch::to_device);
        let placed_ys = place(ys, ys.device(), residency, LabelBatch::to_device);
        debug!(
            "running {} on {} samples ({})",
            self.name,
            xs.len(),
            placed_xs.device()
        );
        let adv = (self.adapter)(backends, model, &placed_xs, &placed_ys, params)?;
        if adv.shape() != xs.shape() {
            return Err(AttackError::ShapeMismatch {
                attack: self.name,
                expected: xs.shape(),
                given: adv.shape(),
            });
        }
        Ok(adv.to_device(xs.device()))
    }
}

pub struct Registry {
    entries: BTreeMap<AttackName, AttackEntry>,
}

impl Registry {
    /// Every attack the crate knows how to dispatch to.
    pub fn standard() -> Self {
        let table: [(AttackName, AttackFn); 15] = [
            (AttackName::PgdL1, adapters::pgd_l1),
            (AttackName::PgdLinf, adapters::pgd_linf),
            (AttackName::PgdL2, adapters::pgd_l2),
            (AttackName::Fgsm, adapters::fgsm),
            (AttackName::AutoattackLinf, adapters::autoattack_linf),
            (AttackName::MimLinf, adapters::mim_linf),
            (AttackName::Cw2, adapters::cw2),
            (AttackName::Deepfool, adapters::deepfool),
            (AttackName::Ead, adapters::ead),
            (AttackName::Ba, adapters::ba),
            (AttackName::Bim, adapters::bim),
            (AttackName::Blb, adapters::blb),
            (AttackName::Llc, adapters::llc),
            (AttackName::Om, adapters::om),
            (AttackName::Jsm, adapters::jsm),
        ];
        Self {
            entries: table
                .into_iter()
                .map(|(name, adapter)| (name, AttackEntry { name, adapter }))
                .collect(),
        }
    }

    /// # Errors
    /// `UnknownAttack` if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<&AttackEntry, AttackError> {
        let attack: AttackName = name.parse()?;
        self.entry(attack).ok_or_else(|| AttackError::UnknownAttack {
            name: name.to_string(),
        })
    }

    pub fn entry(&self, name: AttackName) -> Option<&AttackEntry> {
        self.entries.get(&name)
    }

    pub fn names(&self) -> impl Iterator<Item = AttackName> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks `name` up and runs it.
    ///
    /// # Errors
    /// See `AttackEntry::run`.
    pub fn run(
        &self,
        name: &str,
        backends: &Backends,
        model: &dyn Classifier,
        xs: &SampleBatch,
        ys: &LabelBatch,
        params: &AttackParams,
    ) -> Result<SampleBatch, AttackError> {
        self.get(name)?.run(backends, model, xs, ys, params)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
