//! Permission extractors.
//!
//! Safe methods on the catalog only need [`AuthUser`]; writes go through
//! [`RequireStaff`], which rejects authenticated non-staff users with 403.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, Method};
use std::sync::Arc;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::AppState;

pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<Arc<AppState>> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !has_catalog_access(&parts.method, &user) {
            return Err(AppError::Forbidden);
        }
        Ok(RequireStaff(user))
    }
}

/// Read-only for everyone authenticated, full access for staff.
pub fn has_catalog_access(method: &Method, user: &AuthUser) -> bool {
    is_safe_method(method) || user.is_staff
}

pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_staff: bool) -> AuthUser {
        AuthUser {
            user_id: 1,
            email: "test@test.com".into(),
            is_staff,
        }
    }

    #[test]
    fn non_staff_can_only_read() {
        assert!(has_catalog_access(&Method::GET, &user(false)));
        assert!(!has_catalog_access(&Method::POST, &user(false)));
        assert!(!has_catalog_access(&Method::DELETE, &user(false)));
    }

    #[test]
    fn staff_can_write() {
        for m in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(has_catalog_access(&m, &user(true)));
        }
    }
}
