use serde::{Deserialize, Serialize};
use std::fmt;

/// 貸出が拒否された理由
///
/// 例外ではなく通常の否定的な結果。貸出は作成されず、副作用もない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowRefusal {
    /// 貸出対象外の所蔵品（ボードゲーム）
    NotLoanable,
    /// 既に貸出中
    MediaUnavailable,
    /// 会員がブロックされている
    MemberBlocked,
    /// 未返却の貸出が上限に達している
    LoanLimitReached,
}

impl BorrowRefusal {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowRefusal::NotLoanable => "not_loanable",
            BorrowRefusal::MediaUnavailable => "media_unavailable",
            BorrowRefusal::MemberBlocked => "member_blocked",
            BorrowRefusal::LoanLimitReached => "loan_limit_reached",
        }
    }
}

impl fmt::Display for BorrowRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            BorrowRefusal::NotLoanable => "Board games cannot be loaned",
            BorrowRefusal::MediaUnavailable => "Media is not available for loan",
            BorrowRefusal::MemberBlocked => "Member is blocked",
            BorrowRefusal::LoanLimitReached => "Loan limit reached (max 3 open loans)",
        };
        f.write_str(message)
    }
}

/// 返却のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnRefusal {
    /// 既に返却済み
    AlreadyReturned,
}

/// 登録時の入力エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("invalid player range: {min}..={max}")]
    InvalidPlayerRange { min: i32, max: i32 },
}

impl ValidationError {
    /// 空でなく、`max`文字以内であることを確認する
    pub fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), Self> {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField(field));
        }
        if value.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
        Ok(())
    }
}
