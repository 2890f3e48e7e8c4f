use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpiError` and maps to other errors to
/// convert to an `EpiError`
///
/// Simulation steps never fail; every variant here is raised either while a
/// configuration is loaded and validated or by the collaborators that read
/// and write files around the core.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A parameter is malformed: a probability table that does not cover the
    /// full age range, a non-positive grid dimension, a negative rate, ...
    ConfigurationError(String),
    /// Two measures scale the same probability field during overlapping
    /// windows and the configuration asked for this to be rejected.
    InvariantViolation(String),
    ReportError(String),
}

impl From<io::Error> for EpiError {
    fn from(error: io::Error) -> Self {
        EpiError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiError {
    fn from(error: serde_json::Error) -> Self {
        EpiError::JsonError(error)
    }
}

impl From<csv::Error> for EpiError {
    fn from(error: csv::Error) -> Self {
        EpiError::CSVError(error)
    }
}

impl std::error::Error for EpiError {}

impl Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiError::ConfigurationError(message) => {
                write!(f, "Error: invalid configuration: {message}")
            }
            EpiError::InvariantViolation(message) => {
                write!(f, "Error: invariant violation: {message}")
            }
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display() {
        let error = EpiError::ConfigurationError("grid width must be positive".to_string());
        assert_eq!(
            error.to_string(),
            "Error: invalid configuration: grid width must be positive"
        );
    }

    #[test]
    fn converts_io_error() {
        let error: EpiError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, EpiError::IoError(_)));
    }

    #[test]
    fn converts_json_error() {
        let json_error = serde_json::from_str::<u32>("not a number").unwrap_err();
        let error: EpiError = json_error.into();
        assert!(matches!(error, EpiError::JsonError(_)));
        assert!(error.to_string().starts_with("Error: JsonError"));
    }
}
