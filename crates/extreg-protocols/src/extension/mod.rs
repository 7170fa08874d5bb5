//! Extension protocol definitions.
//!
//! Extensions initialize themselves against a shared base object and report
//! completion through the [`Deferred`] they are handed.

mod handle;
mod message;
mod traits;

pub use handle::*;
pub use message::*;
pub use traits::*;
