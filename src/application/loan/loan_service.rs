use crate::domain::{
    self, BorrowRefusal, Loan, LoanStatus, ReturnRefusal, commands::*, value_objects::*,
};

use crate::application::{ApplicationError, Result, ServiceDependencies};

/// 貸出の試行結果
///
/// 貸出ルールによる拒否はエラーではなく、理由付きの「貸出なし」として返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// 貸出が作成された
    Borrowed(Loan),
    /// 貸出ルールにより拒否された（貸出は作成されず、副作用なし）
    Refused(BorrowRefusal),
}

impl BorrowOutcome {
    pub fn loan(&self) -> Option<&Loan> {
        match self {
            BorrowOutcome::Borrowed(loan) => Some(loan),
            BorrowOutcome::Refused(_) => None,
        }
    }

    pub fn into_loan(self) -> Option<Loan> {
        match self {
            BorrowOutcome::Borrowed(loan) => Some(loan),
            BorrowOutcome::Refused(_) => None,
        }
    }

    pub fn refusal(&self) -> Option<BorrowRefusal> {
        match self {
            BorrowOutcome::Borrowed(_) => None,
            BorrowOutcome::Refused(refusal) => Some(*refusal),
        }
    }
}

/// メディアを貸し出す
///
/// ビジネスルール：
/// - 貸出対象の所蔵品であること（ボードゲームは不可）
/// - メディアが貸出可能であること
/// - 会員がブロックされていないこと
/// - 会員の未返却貸出が3件未満であること
///
/// ルールの判定自体は`domain::loan::evaluate_borrow`が行い、
/// 台帳がロック下で判定・貸出の保存・貸出可否フラグの更新を一括で行う。
/// 同じメディアへの同時貸出は1件だけ成功する。
///
/// # エラー
/// - NotFound: 所蔵品または会員が存在しない
/// - Store: ストアのI/Oエラー
pub async fn attempt_borrow(
    deps: &ServiceDependencies,
    cmd: BorrowMedia,
) -> Result<BorrowOutcome> {
    let today = deps.clock.today();

    match deps
        .loan_ledger
        .borrow(cmd.item_id, cmd.member_id, today)
        .await?
    {
        Ok(loan) => {
            tracing::info!(
                loan_id = %loan.loan_id,
                item_id = %loan.item_id,
                member_id = %loan.member_id,
                due_on = %loan.due_on,
                "Media borrowed"
            );
            Ok(BorrowOutcome::Borrowed(loan))
        }
        Err(refusal) => {
            tracing::info!(
                item_id = %cmd.item_id,
                member_id = %cmd.member_id,
                reason = refusal.as_str(),
                "Borrow refused"
            );
            Ok(BorrowOutcome::Refused(refusal))
        }
    }
}

/// メディアを返却する
///
/// 返却日は今日。延滞していても受け付け、メディアは再び貸出可能になる。
///
/// # エラー
/// - NotFound: 貸出が存在しない
/// - LoanAlreadyReturned: 既に返却済み
pub async fn return_media(deps: &ServiceDependencies, cmd: ReturnMedia) -> Result<Loan> {
    let today = deps.clock.today();

    match deps.loan_ledger.close(cmd.loan_id, today).await? {
        Ok(loan) => {
            tracing::info!(
                loan_id = %loan.loan_id,
                item_id = %loan.item_id,
                late = loan.returned_late(),
                "Media returned"
            );
            Ok(loan)
        }
        Err(ReturnRefusal::AlreadyReturned) => Err(ApplicationError::LoanAlreadyReturned),
    }
}

/// 会員が貸出可能か
///
/// 未返却の貸出数は台帳から都度数える。
pub async fn can_borrow(deps: &ServiceDependencies, member_id: MemberId) -> Result<bool> {
    let member = deps
        .membership
        .get_member(member_id)
        .await?
        .ok_or(ApplicationError::NotFound("member"))?;
    let open_loans = deps.loan_ledger.count_open_for_member(member_id).await?;

    Ok(domain::member::can_borrow(&member, open_loans))
}

/// 貸出が延滞しているか（今日時点）
pub fn is_overdue(deps: &ServiceDependencies, loan: &Loan) -> bool {
    domain::loan::is_overdue(loan, deps.clock.today())
}

pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loan_ledger
        .get_by_id(loan_id)
        .await?
        .ok_or(ApplicationError::NotFound("loan"))
}

/// 会員の貸出一覧（新しい順）
///
/// `status`を指定した場合は今日時点のステータスで絞り込む。
/// 会員が存在しない場合はNotFound。
pub async fn list_member_loans(
    deps: &ServiceDependencies,
    member_id: MemberId,
    status: Option<LoanStatus>,
) -> Result<Vec<Loan>> {
    deps.membership
        .get_member(member_id)
        .await?
        .ok_or(ApplicationError::NotFound("member"))?;

    let today = deps.clock.today();
    let loans = deps.loan_ledger.find_by_member_id(member_id).await?;

    Ok(match status {
        Some(status) => loans
            .into_iter()
            .filter(|loan| loan.status(today) == status)
            .collect(),
        None => loans,
    })
}
