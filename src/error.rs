//! Error types for the size estimator and the cache
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use thiserror::Error;

// == Kind ==
/// Value kinds the estimator refuses to size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A closure or function body held by value behind a trait object
    Func,
    /// A type-erased value with no sizing capability (`dyn Any`)
    Any,
    /// A raw pointer, which cannot be followed safely
    RawPtr,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Func => "func",
            Kind::Any => "any",
            Kind::RawPtr => "raw pointer",
        };
        f.write_str(name)
    }
}

// == Size Error ==
/// Error raised while walking a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    /// The walker reached a kind it has no sizing rule for
    #[error("unsupported kind `{kind}` in {type_name}")]
    UnsupportedKind {
        kind: Kind,
        type_name: &'static str,
    },
}

impl SizeError {
    /// Builds an `UnsupportedKind` error naming `T`.
    pub fn unsupported<T: ?Sized>(kind: Kind) -> Self {
        SizeError::UnsupportedKind {
            kind,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the offending kind.
    pub fn kind(&self) -> Kind {
        match self {
            SizeError::UnsupportedKind { kind, .. } => *kind,
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The value type, or a value's dynamic content, cannot be sized
    #[error("cannot estimate value size: {0}")]
    Unsupported(#[from] SizeError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
