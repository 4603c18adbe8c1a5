//! Identity-provider collaborator contract

mod provider;

pub use provider::{
    AuthUserLookup, AuthenticationOutput, CreateAuthUser, CreatedAuthUser, Credentials,
    IdentityProvider, NewPasswordChallenge, UpdateAuthUser,
};

#[cfg(test)]
pub use provider::MockIdentityProvider;
