//! User domain
//!
//! The aggregate root, its value objects, the business rules gating state
//! transitions, the password-changed domain event and the store collaborator
//! contracts.

mod entity;
mod events;
mod repository;
mod rules;
mod validation;
mod value_objects;

pub use entity::User;
pub use events::PasswordChanged;
pub use repository::{
    UserExistenceChecker, UserListQuery, UserPage, UserReader, UserRecord, UserUpdate, UserWriter,
};
pub use rules::{
    check_rule, BusinessRule, UserMustBeActiveToDeactivate, UserMustBePendingToActivate,
};
pub use validation::{
    validate_email, validate_external_auth_id, validate_full_name, UserValidationError,
};
pub use value_objects::{Email, ExternalAuthId, FullName, UserId, UserStatus};

#[cfg(test)]
pub use repository::{MockUserExistenceChecker, MockUserReader, MockUserWriter};
