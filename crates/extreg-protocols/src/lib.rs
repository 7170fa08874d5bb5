//! # Extreg Protocols
//!
//! Protocol definitions for the extreg extension coordinator.
//! Contains only interface definitions and the completion handle primitive.
//!
//! ## Core Types
//!
//! - [`Extension`] - Trait implemented by every loadable extension
//! - [`Deferred`] / [`CompletionHandle`] - Settle-once completion pair
//! - [`LoadMessage`] - Informational record of one extension outcome

pub mod error;
pub mod extension;

pub use error::ExtensionError;
pub use extension::{
    CompletionHandle, Deferred, Extension, ExtensionClone, FnExtension, LoadMessage, MessageCode,
    Settlement,
};
