use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

use super::{BorrowRefusal, MemberId, ValidationError};

/// 会員1人あたりの未返却貸出の上限
pub const MAX_OPEN_LOANS: usize = 3;

/// 会員名の最大文字数
pub const MAX_NAME_LEN: usize = 100;
/// メールアドレスの最大文字数
pub const MAX_EMAIL_LEN: usize = 254;

/// 会員
///
/// 連絡先（email）は会員間で一意。ブロック中は貸出不可。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub registered_on: NaiveDate,
    pub blocked: bool,
}

impl Member {
    /// 会員を登録する（登録日は`today`、ブロックなし）
    pub fn register(
        name: impl Into<String>,
        email: impl Into<String>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let email = email.into().trim().to_string();
        ValidationError::check_len("name", &name, MAX_NAME_LEN)?;
        ValidationError::check_len("email", &email, MAX_EMAIL_LEN)?;

        if !email.validate_email() {
            return Err(ValidationError::InvalidEmail(email));
        }

        Ok(Self {
            id: MemberId::new(),
            name,
            email,
            registered_on: today,
            blocked: false,
        })
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.email)
    }
}

/// 純粋関数：会員の貸出資格を判定する
///
/// ビジネスルール：
/// - ブロック中の会員は貸出不可（貸出数に関わらず）
/// - 未返却の貸出が3件以上なら貸出不可
///
/// `open_loans`は呼び出し側が台帳から都度数えた値を渡すこと（キャッシュしない）。
pub fn borrow_eligibility(member: &Member, open_loans: usize) -> Result<(), BorrowRefusal> {
    if member.blocked {
        return Err(BorrowRefusal::MemberBlocked);
    }
    if open_loans >= MAX_OPEN_LOANS {
        return Err(BorrowRefusal::LoanLimitReached);
    }
    Ok(())
}

/// 純粋関数：会員が貸出可能か
pub fn can_borrow(member: &Member, open_loans: usize) -> bool {
    borrow_eligibility(member, open_loans).is_ok()
}
