//! Error types for the binding layer.
//!
//! Three disjoint failure families plus the lookup-miss case, combined by
//! [`Error`]: binding-side validation (raised before the engine is touched),
//! engine-reported failures (message pulled from and clearing the engine's
//! error flag), and dead-handle usage. No variant is ever retried by the
//! binding and none is fatal to the process.

use std::error::Error as StdError;
use std::fmt;

use crate::types::DataType;

/// Top-level error returned by every fallible operation in this crate.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The handle has been closed (or was never validly opened). The engine
    /// is not reachable through it and never will be again.
    Closed,
    /// A binding-side precondition failed. The engine was not called and its
    /// state is untouched.
    Validation(ValidationError),
    /// The engine reported a failure. Its error flag has been consumed.
    Engine(EngineError),
    /// A name failed to resolve in a lookup the binding performs itself
    /// (pair-style neighbor lists, groups, categories). Distinct from
    /// [`Error::Engine`]: there is no engine error flag to consume.
    NotFound {
        /// What namespace was searched ("pair style", "group", ...).
        kind: &'static str,
        /// The name that did not resolve.
        name: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "engine handle is closed and cannot be used"),
            Self::Validation(e) => write!(f, "validation failed: {e}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::NotFound { kind, name } => write!(f, "{kind} '{name}' not found"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

/// Binding-side precondition failures.
///
/// Every variant is raised before any engine call, so engine state is never
/// left inconsistent by a validation failure.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// Requested element type does not match the engine-reported one.
    TypeMismatch {
        /// Quantity name.
        name: String,
        /// Type the caller asked for.
        requested: DataType,
        /// Type the engine reports for this quantity.
        actual: DataType,
    },
    /// The engine-reported shape does not match the requested access pattern
    /// (e.g. a scalar accessor used on a per-atom array).
    ShapeMismatch {
        /// Quantity name.
        name: String,
        /// Description of the shape the accessor expected.
        expected: &'static str,
        /// Description of the engine-reported shape.
        actual: String,
    },
    /// A subset atom ID is outside `[1, natoms]`.
    IdOutOfRange {
        /// The offending 1-based atom ID.
        id: i32,
        /// Current total atom count.
        natoms: i64,
    },
    /// Caller buffer length does not match `width * count`.
    LengthMismatch {
        /// Quantity name.
        name: String,
        /// Required element count.
        expected: usize,
        /// Provided element count.
        actual: usize,
    },
    /// Ghost-extended access requested for a quantity the engine does not
    /// communicate to ghost atoms.
    GhostsUnsupported {
        /// Quantity name.
        name: String,
    },
    /// An image flag component is outside the representable range.
    ImageFlagOutOfRange {
        /// The offending flag value.
        flag: i32,
    },
    /// A name or argument contains an interior NUL byte and cannot cross
    /// the C boundary.
    InteriorNul {
        /// The offending string.
        text: String,
    },
    /// New box bounds are inverted or degenerate.
    InvalidBoxBounds {
        /// Dimension index (0 = x, 1 = y, 2 = z).
        dimension: usize,
        /// Lower bound.
        lo: f64,
        /// Upper bound.
        hi: f64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch {
                name,
                requested,
                actual,
            } => write!(
                f,
                "'{name}' holds {actual} elements but {requested} was requested"
            ),
            Self::ShapeMismatch {
                name,
                expected,
                actual,
            } => write!(f, "'{name}' is {actual}, but the accessor expects {expected}"),
            Self::IdOutOfRange { id, natoms } => {
                write!(f, "atom ID {id} outside valid range [1, {natoms}]")
            }
            Self::LengthMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "buffer for '{name}' holds {actual} elements, {expected} required"
            ),
            Self::GhostsUnsupported { name } => {
                write!(f, "'{name}' is not communicated to ghost atoms")
            }
            Self::ImageFlagOutOfRange { flag } => {
                write!(f, "image flag {flag} outside representable range")
            }
            Self::InteriorNul { text } => {
                write!(f, "string '{text}' contains an interior NUL byte")
            }
            Self::InvalidBoxBounds { dimension, lo, hi } => {
                let axis = ["x", "y", "z"][*dimension];
                write!(f, "box bounds inverted in {axis}: lo {lo} >= hi {hi}")
            }
        }
    }
}

impl StdError for ValidationError {}

/// Severity the engine attaches to a reported error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// The instance survives and further commands may be issued.
    Recoverable,
    /// The instance is in an undefined state and should be closed.
    Fatal,
}

impl Severity {
    pub(crate) fn from_code(code: i32) -> Self {
        if code >= 2 {
            Self::Fatal
        } else {
            Self::Recoverable
        }
    }
}

/// A failure reported by the engine itself.
///
/// Constructed only by draining the engine's pending error message, which
/// clears the flag: an `EngineError` in hand means no error is left behind
/// to be double-reported or silently swallowed.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineError {
    /// The engine's message text.
    pub message: String,
    /// Severity the engine attached.
    pub severity: Severity,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Recoverable => write!(f, "engine error: {}", self.message),
            Severity::Fatal => write!(f, "fatal engine error: {}", self.message),
        }
    }
}

impl StdError for EngineError {}

/// Shorthand result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            Error::Closed.to_string(),
            "engine handle is closed and cannot be used"
        );
        let e = Error::NotFound {
            kind: "pair style",
            name: "lj/cut".into(),
        };
        assert_eq!(e.to_string(), "pair style 'lj/cut' not found");
    }

    #[test]
    fn validation_wraps_into_error() {
        let v = ValidationError::IdOutOfRange { id: 0, natoms: 8 };
        let e = Error::from(v.clone());
        assert_eq!(e, Error::Validation(v));
        assert!(e.to_string().contains("[1, 8]"));
    }

    #[test]
    fn severity_codes_map() {
        assert_eq!(Severity::from_code(1), Severity::Recoverable);
        assert_eq!(Severity::from_code(2), Severity::Fatal);
    }
}
