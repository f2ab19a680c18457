//! Configuration errors raised when building domains, projections, or the
//! sampling engine. Construction is the only fallible surface of this crate:
//! once a [`crate::engine::SamplingEngine`] exists, sampling itself never
//! returns an error (an exhausted iteration cap shows up as an under-filled
//! [`crate::engine::SampleRun`] instead).

use thiserror::Error;

/// Returned by the `new` constructors when a configuration is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A string tag (distribution kind, strategy, projection kind) did not
    /// match any recognized value.
    #[error("unknown {what}: {got:?}")]
    UnknownKind { what: &'static str, got: String },

    /// Two vectors or spaces that must share a dimension do not.
    #[error("{what}: expected dimension {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A domain was declared with dimension zero.
    #[error("domain dimension must be at least 1")]
    EmptyDomain,

    /// A lower bound exceeds the matching upper bound.
    #[error("lower bound exceeds upper bound at axis {index}")]
    InvalidBounds { index: usize },

    /// A length scale or scale multiplier is zero, negative, or non-finite.
    #[error("{what} must be finite and strictly positive")]
    NonPositiveScale { what: &'static str },

    /// The embedded dimension exceeds the ambient dimension; the projection
    /// is supposed to compress.
    #[error("embedded dimension {embedded} exceeds ambient dimension {ambient}")]
    EmbeddingTooLarge { embedded: usize, ambient: usize },

    /// The SVD underlying the Moore-Penrose pseudo-inverse did not converge.
    #[error("pseudo-inverse computation failed: {0}")]
    PseudoInverse(&'static str),
}
