//! User lifecycle orchestration and store implementations

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresUserStore;
pub use repository::InMemoryUserStore;
pub use service::{
    IssuedTokens, ListUsersRequest, Pagination, RefreshedTokens, RegisterUserRequest,
    RegisteredUser, StatusChange, UpdateProfileRequest, UpdatedProfile, UserDetails, UserList,
    UserService, UserSummary,
};
