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

    pub fn allocation_failure(requested: usize, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::AllocationFailure {
                requested,
                message: message.into(),
            }
            .into(),
        )
    }

    /// Returns `true` if this error was raised for an out-of-domain argument.
    pub fn is_invalid_arg(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }

    /// Returns `true` if this error was raised because storage could not be obtained.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::AllocationFailure { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("failed to allocate {requested} elements: {message}")]
    AllocationFailure { requested: usize, message: String },
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
    fn test_error_kinds() {
        let e = Error::invalid_arg("count", "must not be negative");
        assert!(e.is_invalid_arg());
        assert!(!e.is_allocation_failure());
        assert_eq!(
            e.to_string(),
            "invalid argument count: must not be negative"
        );

        let e = Error::allocation_failure(42, "pool exhausted");
        assert!(e.is_allocation_failure());
        match e.into_kind() {
            ErrorKind::AllocationFailure { requested, .. } => assert_eq!(requested, 42),
            kind => panic!("unexpected kind {kind:?}"),
        }
    }
}
