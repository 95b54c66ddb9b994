use thiserror::Error;

/// ストアポート共通のエラー
///
/// 一意制約違反と未検出だけは呼び出し側が区別する必要があるため、
/// それ以外のバックエンド障害はボックス化して運ぶ。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 一意制約違反（例: email, isbn）
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),

    /// 参照先のレコードが存在しない
    #[error("{0} not found")]
    NotFound(&'static str),

    /// ストアの障害
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Backend(err.into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
