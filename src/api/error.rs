use crate::application::ApplicationError;
use crate::domain::BorrowRefusal;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーと貸出拒否をHTTPレスポンスにマッピングする。
#[derive(Debug)]
pub enum ApiError {
    Application(ApplicationError),
    /// 貸出ルールによる拒否（422、理由コード付き）
    Refused(BorrowRefusal),
    /// リクエストの形式・値が不正
    BadRequest(String),
    /// スタッフ専用のエンドポイント
    Forbidden,
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 404 Not Found
            ApiError::Application(ApplicationError::NotFound(entity)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", entity),
            ),

            // 409 Conflict - 一意制約違反
            ApiError::Application(ApplicationError::Duplicate(field)) => (
                StatusCode::CONFLICT,
                "DUPLICATE",
                format!("A record with this {} already exists", field),
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            ApiError::Refused(refusal) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                refusal_code(refusal),
                refusal.to_string(),
            ),
            ApiError::Application(ApplicationError::LoanAlreadyReturned) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "LOAN_ALREADY_RETURNED",
                "Loan already returned".to_string(),
            ),

            // 400 Bad Request
            ApiError::Application(ApplicationError::Validation(e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),

            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Staff credentials required".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Application(ApplicationError::Store(e)) => {
                tracing::error!(error = %e, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}

fn refusal_code(refusal: BorrowRefusal) -> &'static str {
    match refusal {
        BorrowRefusal::NotLoanable => "NOT_LOANABLE",
        BorrowRefusal::MediaUnavailable => "MEDIA_UNAVAILABLE",
        BorrowRefusal::MemberBlocked => "MEMBER_BLOCKED",
        BorrowRefusal::LoanLimitReached => "LOAN_LIMIT_REACHED",
    }
}
