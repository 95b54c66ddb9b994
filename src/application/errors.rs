use crate::domain::ValidationError;
use crate::ports::StoreError;
use thiserror::Error;

/// アプリケーション層のエラー
///
/// 貸出ルール違反はここには含まれない（`BorrowOutcome::Refused`として通常の結果で返す）。
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 対象が見つからない（"item", "member", "loan"）
    #[error("{0} not found")]
    NotFound(&'static str),

    /// 一意制約違反（"email", "isbn"）
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// 既に返却済みの貸出を返却しようとした
    #[error("Loan already returned")]
    LoanAlreadyReturned,

    /// 入力値が不正
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// ストアのエラー
    #[error("Store error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => ApplicationError::NotFound(entity),
            StoreError::Duplicate(field) => ApplicationError::Duplicate(field),
            other => ApplicationError::Store(other),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
