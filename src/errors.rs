//! Error management module

use crate::encoding::Encoding;
use crate::events::attributes::Attribute;
use crate::events::Event;
use crate::name::QName;

/// The error type used by this crate.
///
/// All errors are fatal to the pipeline that raised them: once a stage
/// returns an `Error`, no further items are produced. The combinator
/// layer distinguishes an error from a plain *not matched* outcome,
/// which is `Ok(None)` and never an `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input bytes are not valid for the detected encoding
    Decode {
        /// Encoding chosen by auto-detection
        encoding: Encoding,
        /// What exactly was wrong with the bytes
        message: String,
    },
    /// Malformed input or a failed expectation
    Syntax {
        /// Human readable description of the failure
        message: String,
        /// The event that provoked the failure, when one was available
        event: Option<Event>,
    },
    /// End tag does not match the open begin tag
    EndEventMismatch {
        /// Found end event
        found: QName,
    },
    /// An entity other than the five predefined ones was rejected
    UnresolvedEntity(String),
    /// The attribute parser finished with unconsumed attributes
    UnparsedAttributes(Vec<Attribute>),
}

impl Error {
    /// Creates a new `Error::Syntax` without event context
    #[inline]
    pub(crate) fn syntax<M: Into<String>>(message: M) -> Error {
        Error::Syntax {
            message: message.into(),
            event: None,
        }
    }

    /// Creates a new `Error::Syntax` carrying the offending event
    #[inline]
    pub(crate) fn expected<M: Into<String>>(message: M, event: Option<Event>) -> Error {
        Error::Syntax {
            message: message.into(),
            event,
        }
    }
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Decode { encoding, message } => {
                write!(f, "decode error ({}): {}", encoding, message)
            }
            Error::Syntax {
                message,
                event: Some(event),
            } => write!(f, "{} (at {:?})", message, event),
            Error::Syntax {
                message,
                event: None,
            } => f.write_str(message),
            Error::EndEventMismatch { found } => write!(f, "unexpected end tag </{}>", found),
            Error::UnresolvedEntity(name) => write!(f, "unresolved entity &{};", name),
            Error::UnparsedAttributes(attrs) => {
                write!(f, "element has unparsed attributes:")?;
                for a in attrs {
                    write!(f, " {}=\"{}\"", a.name, a.text())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}
