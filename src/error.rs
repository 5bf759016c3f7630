use crate::clip::ClipError;
use crate::name::AttackName;
use crate::tensorshape::TensorShape;
use itertools::Itertools;
use thiserror::Error;

/// Errors raised by an attack library, surfaced to the caller untouched.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum AttackError {
    #[error("unknown attack `{name}`, expected one of: {}", AttackName::ALL.iter().join(", "))]
    UnknownAttack { name: String },
    /// A parameter bag that is missing keys, has extra keys, or has values of
    /// the wrong type.
    #[error("invalid parameters for `{attack}`: {reason}")]
    InvalidParams { attack: AttackName, reason: String },
    /// An adapter was handed another attack's parameters.
    #[error("`{attack}` adapter was given parameters for `{given}`")]
    ParamsMismatch { attack: AttackName, given: AttackName },
    #[error("{labels} labels given for a batch of {samples} samples")]
    LabelMismatch { samples: usize, labels: usize },
    #[error("`{attack}` got or returned a batch of shape {given}, expected {expected}")]
    ShapeMismatch {
        attack: AttackName,
        expected: TensorShape,
        given: TensorShape,
    },
    #[error("{source}")]
    Backend {
        attack: AttackName,
        source: BackendError,
    },
    #[error("{err}")]
    Clip {
        #[from]
        err: ClipError,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_backend_errors_surface_verbatim() {
        let err = AttackError::Backend {
            attack: AttackName::Cw2,
            source: "CUDA out of memory".into(),
        };
        assert_eq!(err.to_string(), "CUDA out of memory");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_clip_errors_convert() {
        let err = AttackError::from(ClipError::DeviceMismatch);
        assert_eq!(
            err.to_string(),
            "clean and adversarial batches live on different devices"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_params_mismatch_names_both_attacks() {
        let err = AttackError::ParamsMismatch {
            attack: AttackName::Fgsm,
            given: AttackName::Bim,
        };
        assert_eq!(err.to_string(), "`fgsm` adapter was given parameters for `bim`");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_unknown_attack_lists_choices() {
        let msg = AttackError::UnknownAttack {
            name: "nope".to_string(),
        }
        .to_string();
        assert!(msg.starts_with("unknown attack `nope`, expected one of: pgd_l1, pgd_linf"));
        assert!(msg.ends_with("om, jsm"));
    }
}
