use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    BorrowRefusal, CatalogItem, ItemId, LoanId, Member, MemberId, ReturnRefusal,
    member::borrow_eligibility,
};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: u64 = 7;

/// 貸出ステータス（導出値）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 貸出 - 1件のメディアの1回の貸出
///
/// `returned_on`がNoneの間は未返却（open）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }

    /// 返却期限を過ぎてから返却されたか
    pub fn returned_late(&self) -> bool {
        self.returned_on.is_some_and(|returned_on| returned_on > self.due_on)
    }

    pub fn status(&self, today: NaiveDate) -> LoanStatus {
        if !self.is_open() {
            LoanStatus::Returned
        } else if is_overdue(self, today) {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }
}

/// 返却期限を計算する（貸出日 + 7日）
pub fn due_date_for(borrowed_on: NaiveDate) -> NaiveDate {
    borrowed_on
        .checked_add_days(Days::new(LOAN_PERIOD_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// 純粋関数：貸出を評価する
///
/// ビジネスルール（すべて満たす必要がある）：
/// - 貸出対象の所蔵品であること（ボードゲームは不可）
/// - メディアが貸出可能であること
/// - 会員がブロックされていないこと
/// - 会員の未返却貸出が3件未満であること
///
/// 副作用なし。新しいLoanを返すだけで、貸出可否フラグの更新と
/// 貸出の保存は呼び出し側（台帳）が同一トランザクションで行う。
pub fn evaluate_borrow(
    item: &CatalogItem,
    member: &Member,
    open_loans: usize,
    today: NaiveDate,
) -> Result<Loan, BorrowRefusal> {
    let media = match item {
        CatalogItem::Media(media) => media,
        CatalogItem::BoardGame(_) => return Err(BorrowRefusal::NotLoanable),
    };

    if !media.available {
        return Err(BorrowRefusal::MediaUnavailable);
    }

    borrow_eligibility(member, open_loans)?;

    Ok(Loan {
        loan_id: LoanId::new(),
        item_id: media.id,
        member_id: member.id,
        borrowed_on: today,
        due_on: due_date_for(today),
        returned_on: None,
    })
}

/// 純粋関数：返却する
///
/// 延滞していても返却は受け付ける（延滞料金なし）。
pub fn return_loan(loan: &Loan, today: NaiveDate) -> Result<Loan, ReturnRefusal> {
    if !loan.is_open() {
        return Err(ReturnRefusal::AlreadyReturned);
    }

    Ok(Loan {
        returned_on: Some(today),
        ..loan.clone()
    })
}

/// 純粋関数：延滞判定
///
/// 返却済みなら常にfalse。未返却なら返却期限を過ぎていればtrue。
pub fn is_overdue(loan: &Loan, today: NaiveDate) -> bool {
    loan.is_open() && today > loan.due_on
}
