use thiserror::Error;

/// Core domain errors
///
/// The first two variants originate inside the domain layer (value object
/// construction and business rule checks); the rest are raised by the
/// lifecycle orchestrators or the collaborator adapters.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid value object ({component}): {message}")]
    InvalidValueObject { message: String, component: String },

    #[error("Business rule violated ({component}): {message}")]
    BusinessRuleViolation { message: String, component: String },

    #[error("Not found: {message}")]
    EntityNotFound { message: String },

    #[error("Duplicate: {message}")]
    DuplicateEntity { message: String },

    #[error("User '{user_id}' is not active")]
    UserNotActive { user_id: String },

    #[error("Inconsistent state: {message}")]
    Inconsistency { message: String },

    #[error("Transaction failed: {message}")]
    TransactionFailed {
        message: String,
        #[source]
        cause: Box<DomainError>,
    },

    #[error("Credentials rejected: {message}")]
    CredentialsRejected { message: String },

    #[error("Identity provider error: {message}")]
    Provider { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Messaging error: {message}")]
    Messaging { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn invalid_value_object(
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValueObject {
            message: message.into(),
            component: component.into(),
        }
    }

    pub fn business_rule_violation(
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BusinessRuleViolation {
            message: message.into(),
            component: component.into(),
        }
    }

    /// Lookup miss where the identifier must stay hidden from the caller.
    pub fn entity_not_found(entity: impl Into<String>) -> Self {
        Self::EntityNotFound {
            message: format!("{} not found", entity.into()),
        }
    }

    /// Lookup miss where the identifier is safe to echo back.
    pub fn entity_not_found_by(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::EntityNotFound {
            message: format!(
                "{} with {} '{}' not found",
                entity.into(),
                field.into(),
                value.into()
            ),
        }
    }

    pub fn duplicate_entity(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::DuplicateEntity {
            message: format!(
                "{} with {} '{}' is already registered",
                entity.into(),
                field.into(),
                value.into()
            ),
        }
    }

    pub fn user_not_active(user_id: impl Into<String>) -> Self {
        Self::UserNotActive {
            user_id: user_id.into(),
        }
    }

    pub fn inconsistency(message: impl Into<String>) -> Self {
        Self::Inconsistency {
            message: message.into(),
        }
    }

    pub fn transaction_failed(message: impl Into<String>, cause: DomainError) -> Self {
        Self::TransactionFailed {
            message: message.into(),
            cause: Box::new(cause),
        }
    }

    pub fn credentials_rejected(message: impl Into<String>) -> Self {
        Self::CredentialsRejected {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn messaging(message: impl Into<String>) -> Self {
        Self::Messaging {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
