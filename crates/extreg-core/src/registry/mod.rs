//! Extension registry and its init configuration.

mod config;
mod extension;
mod loader;

pub use config::RegistryConfig;
pub use extension::Registry;
