use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Occurs when a schema descriptor names a type this library doesn't know about. Raised
    /// while compiling a schema, never during encode/decode.
    UnknownType(String),
    /// Occurs when a descriptor is shaped wrong: an array with no `items`, an object with
    /// neither `schema` nor `items`, a `size` on a kind whose payload width is load-bearing,
    /// too many fields, or nesting past the depth limit.
    InvalidSchema(String),
    /// Occurs when a value's runtime type can't be serialized as the kind its field declares.
    BadValue {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A field or array-element payload was larger than its length prefix can express.
    LengthTooLong { max: usize, actual: usize },
    /// The buffer ended partway through a field.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// A payload's bytes don't form a valid value for its kind, e.g. a number payload with a
    /// width outside {1, 2, 4, 8}.
    BadEncode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnknownType(ref name) => write!(f, "Unrecognized type {}", name),
            Error::InvalidSchema(ref err) => write!(f, "Invalid schema: {}", err),
            Error::BadValue {
                ref field,
                expected,
                found,
            } => write!(
                f,
                "Field [{}] expects a {}, but the value is a {}",
                field, expected, found
            ),
            Error::LengthTooLong { max, actual } => write!(
                f,
                "Payload too long: was {} bytes, maximum allowed is {}",
                actual, max
            ),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected {} more bytes, but got {} on step [{}]",
                expected, actual, step
            ),
            Error::BadEncode(ref err) => write!(f, "Bad payload encoding: {}", err),
        }
    }
}

impl std::error::Error for Error {}
