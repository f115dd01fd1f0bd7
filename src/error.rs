/// Failure categories surfaced by the research pipeline.
///
/// Only `ConfigInvalid` and `Output` abort a run. `SourceUnavailable` and
/// `IdentityInvalid` are absorbed per company by the pipeline. A missing single
/// fact never becomes an error at all; it is `FactValue::Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigInvalid,
    SourceUnavailable,
    IdentityInvalid,
    Output,
}

impl ErrorKind {
    fn exit_code(self) -> u8 {
        match self {
            ErrorKind::ConfigInvalid | ErrorKind::Output => 2,
            ErrorKind::IdentityInvalid => 3,
            ErrorKind::SourceUnavailable => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.exit_code(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceUnavailable, message)
    }

    pub fn identity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IdentityInvalid, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Output, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_and_output_errors_share_usage_exit_code() {
        assert_eq!(AppError::config("bad").exit_code(), 2);
        assert_eq!(AppError::output("disk").exit_code(), 2);
        assert_eq!(AppError::identity("blank").exit_code(), 3);
        assert_eq!(AppError::unavailable("down").exit_code(), 4);
        assert_eq!(AppError::unavailable("down").kind(), ErrorKind::SourceUnavailable);
    }
}
