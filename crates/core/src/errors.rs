use thiserror::Error;

use crate::emoji::OracleError;
use crate::ledger::StoreError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Infrastructure failures raised while processing a valid command.
///
/// User-facing command errors never take this path; see
/// [`crate::command::CommandError`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("known-emoji oracle unavailable: {0}")]
    OracleUnavailable(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(error) => Self::Domain(error),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<OracleError> for ApplicationError {
    fn from(value: OracleError) -> Self {
        Self::OracleUnavailable(value.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable { .. } => {
                "Mog is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::StorageUnavailable(message)
            | ApplicationError::OracleUnavailable(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Domain(error) => {
                Self::Internal { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::emoji::OracleError;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::ledger::StoreError;

    #[test]
    fn storage_error_maps_to_service_unavailable() {
        let interface = ApplicationError::from(StoreError::Unavailable("pool timed out".to_owned()))
            .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::ServiceUnavailable { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "Mog is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn oracle_error_maps_to_service_unavailable() {
        let error = ApplicationError::from(OracleError::Timeout { timeout_secs: 5 });
        assert!(matches!(error, ApplicationError::OracleUnavailable(_)));

        let interface = error.into_interface("req-2");
        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn corrupt_rows_map_to_internal() {
        let interface = ApplicationError::from(StoreError::Domain(
            DomainError::InvariantViolation("unknown desire status code `9`".to_owned()),
        ))
        .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
