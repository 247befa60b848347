//! Request handlers.
//!
//! Handlers parse the request, delegate to the [`AssetGovernance`] service
//! in [`AppState`] and map errors via [`AppError`].
//!
//! [`AssetGovernance`]: sanctum_core::governance::AssetGovernance
//! [`AppState`]: crate::state::AppState
//! [`AppError`]: crate::error::AppError

pub mod assets;
pub mod lifecycle;
pub mod usage_requests;
