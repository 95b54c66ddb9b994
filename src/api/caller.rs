use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::{convert::Infallible, sync::Arc};

use super::{error::ApiError, handlers::AppState};

/// リクエストの呼び出し元
///
/// `Authorization: Bearer <token>`が設定のスタッフトークンと一致すればスタッフ。
/// それ以外（ヘッダなし、不一致、トークン未設定）は匿名として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Staff,
}

impl Caller {
    pub fn is_staff(&self) -> bool {
        matches!(self, Caller::Staff)
    }

    /// スタッフ以外は403
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        Ok(match (presented, state.staff_token.as_deref()) {
            (Some(presented), Some(expected)) if presented == expected => Caller::Staff,
            _ => Caller::Anonymous,
        })
    }
}
