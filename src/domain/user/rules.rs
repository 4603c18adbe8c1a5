//! Business rules gating user state transitions
//!
//! Rules are the only transition-gating mechanism: orchestrators never set
//! the status directly, they invoke the aggregate methods that check these.

use super::value_objects::UserStatus;
use crate::domain::DomainError;

/// A named predicate evaluated before a state transition
pub trait BusinessRule {
    /// Whether the rule is currently violated
    fn is_broken(&self) -> bool;

    /// Human-readable description of the violation
    fn message(&self) -> String;

    /// Name of the originating rule
    fn component(&self) -> &'static str;
}

/// Fail with `BusinessRuleViolation` when the given rule is broken
pub fn check_rule(rule: &dyn BusinessRule) -> Result<(), DomainError> {
    if rule.is_broken() {
        return Err(DomainError::business_rule_violation(
            rule.component(),
            rule.message(),
        ));
    }

    Ok(())
}

/// A user may only be activated from the pending state
pub struct UserMustBePendingToActivate {
    status: UserStatus,
}

impl UserMustBePendingToActivate {
    pub fn new(status: UserStatus) -> Self {
        Self { status }
    }
}

impl BusinessRule for UserMustBePendingToActivate {
    fn is_broken(&self) -> bool {
        !self.status.is_pending()
    }

    fn message(&self) -> String {
        "User must be pending before it can be activated".to_string()
    }

    fn component(&self) -> &'static str {
        "UserMustBePendingToActivate"
    }
}

/// A user may only be deactivated from the active state
pub struct UserMustBeActiveToDeactivate {
    status: UserStatus,
}

impl UserMustBeActiveToDeactivate {
    pub fn new(status: UserStatus) -> Self {
        Self { status }
    }
}

impl BusinessRule for UserMustBeActiveToDeactivate {
    fn is_broken(&self) -> bool {
        !self.status.is_active()
    }

    fn message(&self) -> String {
        "User must be active before it can be deactivated".to_string()
    }

    fn component(&self) -> &'static str {
        "UserMustBeActiveToDeactivate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_to_activate_rule() {
        assert!(!UserMustBePendingToActivate::new(UserStatus::Pending).is_broken());
        assert!(UserMustBePendingToActivate::new(UserStatus::Active).is_broken());
        assert!(UserMustBePendingToActivate::new(UserStatus::Inactive).is_broken());
    }

    #[test]
    fn test_active_to_deactivate_rule() {
        assert!(!UserMustBeActiveToDeactivate::new(UserStatus::Active).is_broken());
        assert!(UserMustBeActiveToDeactivate::new(UserStatus::Pending).is_broken());
        assert!(UserMustBeActiveToDeactivate::new(UserStatus::Inactive).is_broken());
    }

    #[test]
    fn test_check_rule_reports_component_and_message() {
        let rule = UserMustBePendingToActivate::new(UserStatus::Inactive);
        let error = check_rule(&rule).unwrap_err();

        match error {
            DomainError::BusinessRuleViolation { message, component } => {
                assert_eq!(component, "UserMustBePendingToActivate");
                assert!(message.contains("pending"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_rule_passes_when_not_broken() {
        let rule = UserMustBeActiveToDeactivate::new(UserStatus::Active);
        assert!(check_rule(&rule).is_ok());
    }
}
