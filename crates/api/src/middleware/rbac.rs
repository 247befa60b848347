//! Module-capability access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose module does
//! not hold the required capability.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sanctum_core::error::CoreError;
use sanctum_core::modules::is_asset_governance;
use sanctum_core::usage::RequestingModule;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the Assets module. Only Asset Governance may register, lock,
/// value, audit or close assets and decide usage requests.
///
/// ```ignore
/// async fn governed(RequireAssets(user): RequireAssets) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAssets(pub AuthUser);

impl FromRequestParts<AppState> for RequireAssets {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_asset_governance(&user.module) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Assets module capability required".into(),
            )));
        }
        Ok(RequireAssets(user))
    }
}

/// Requires a module that may borrow assets (Operations, Projects, Finance).
/// Carries the parsed module so handlers never trust a body-supplied tag.
pub struct RequireRequester(pub AuthUser, pub RequestingModule);

impl FromRequestParts<AppState> for RequireRequester {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let module = RequestingModule::from_module_tag(&user.module).ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Only Operations, Projects or Finance may request asset usage".into(),
            ))
        })?;
        Ok(RequireRequester(user, module))
    }
}
