//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CognitoConfig, DatabaseConfig, LogFormat, LoggingConfig, MessagingConfig,
    ServerConfig,
};
