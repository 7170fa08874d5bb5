//! # Extreg Core
//!
//! Extension registry for the extreg coordinator.
//!
//! ## Components
//!
//! - [`Registry`] - Initializes extensions, tracks their completion handles and
//!   publishes the aggregate `ready` handle
//! - [`RegistryConfig`] - Base object plus the ordered extension descriptors
//!   passed to [`Registry::init`]
//!
//! A registry must be initialized from inside a tokio runtime; every
//! continuation it attaches runs as a spawned task.

pub mod registry;

pub use registry::{Registry, RegistryConfig};
