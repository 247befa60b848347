//! Asset governance domain logic.
//!
//! Everything here is storage-agnostic: the lifecycle table and transition
//! validator are pure functions, and the governance service reaches storage
//! and People/Department data only through the traits in [`store`] and
//! [`relationship`].

pub mod asset;
pub mod error;
pub mod governance;
pub mod lifecycle;
pub mod modules;
pub mod relationship;
pub mod store;
pub mod types;
pub mod usage;
