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

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn malformed_layout(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::MalformedLayout {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn capacity_exceeded(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::CapacityExceeded {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Error {
        Error(
            ErrorKind::TypeMismatch {
                expected: expected.into(),
                actual: actual.into(),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("malformed layout in '{element}': {message}")]
    MalformedLayout { element: String, message: String },

    #[error("capacity exceeded for '{name}': {message}")]
    CapacityExceeded { name: String, message: String },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
