use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_index(name: impl Into<String>, index: usize, bound: usize) -> Error {
        ErrorKind::InvalidIndex {
            name: name.into(),
            index,
            bound,
        }
        .into()
    }

    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Error {
        ErrorKind::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
        .into()
    }

    pub fn invalid_state(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidState {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn capacity_overflow(name: impl Into<String>, requested: usize, capacity: usize) -> Error {
        ErrorKind::CapacityOverflow {
            name: name.into(),
            requested,
            capacity,
        }
        .into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidFormat {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    /// Returns `true` if this is an [`ErrorKind::InvalidIndex`] error.
    pub fn is_invalid_index(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidIndex { .. })
    }

    /// Returns `true` if this is an [`ErrorKind::SizeMismatch`] error.
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::SizeMismatch { .. })
    }

    /// Returns `true` if this is an [`ErrorKind::InvalidState`] error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidState { .. })
    }

    /// Returns `true` if this is an [`ErrorKind::CapacityOverflow`] error.
    pub fn is_capacity_overflow(&self) -> bool {
        matches!(self.kind(), ErrorKind::CapacityOverflow { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A field index, bit index or scan start index lies outside `[0, bound)`.
    #[error("invalid index for {name}: {index} (bound: {bound})")]
    InvalidIndex {
        name: String,
        index: usize,
        bound: usize,
    },

    /// Layout width sum, field width or operand length does not match.
    #[error("size mismatch for {name}: expected {expected}, actual {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// The operation requires an assigned buffer or layout, or got empty input.
    #[error("invalid state for {name}: {message}")]
    InvalidState { name: String, message: String },

    /// The requested bit width exceeds the capacity of the target integer.
    #[error("capacity overflow for {name}: {requested} bits requested, {capacity} available")]
    CapacityOverflow {
        name: String,
        requested: usize,
        capacity: usize,
    },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_predicates() {
        assert!(Error::invalid_index("field", 7, 3).is_invalid_index());
        assert!(Error::size_mismatch("layout", 16, 15).is_size_mismatch());
        assert!(Error::invalid_state("buffer", "empty").is_invalid_state());
        assert!(Error::capacity_overflow("convert", 40, 32).is_capacity_overflow());
        assert!(!Error::invalid_arg("widths", "zero").is_invalid_index());
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_index("field", 7, 3);
        assert_eq!(err.to_string(), "invalid index for field: 7 (bound: 3)");

        let err = Error::capacity_overflow("convert", 40, 32);
        assert_eq!(
            err.to_string(),
            "capacity overflow for convert: 40 bits requested, 32 available"
        );
    }

    #[test]
    fn test_into_kind() {
        let err = Error::size_mismatch("set_field", 2, 4);
        match err.into_kind() {
            ErrorKind::SizeMismatch {
                name,
                expected,
                actual,
            } => {
                assert_eq!(name, "set_field");
                assert_eq!(expected, 2);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
