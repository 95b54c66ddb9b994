use crate::domain::{BorrowRefusal, ItemId, Loan, LoanId, MemberId, ReturnRefusal};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use super::errors::Result;

/// 貸出台帳ポート
///
/// 貸出と返却は、貸出の記録とメディアの貸出可否フラグの更新を
/// 単一のトランザクションで行う。判定そのものは
/// `domain::loan::evaluate_borrow` / `domain::loan::return_loan` に委ね、
/// 実装はそれをロック下で呼び出すだけ。
#[async_trait]
pub trait LoanLedger: Send + Sync {
    /// 貸出を試みる
    ///
    /// 所蔵品と会員をロックし、会員の未返却貸出数を数えてから判定する。
    /// 許可された場合のみ、貸出を記録しメディアを貸出不可にする。
    /// 拒否された場合は何も書き込まない。
    ///
    /// 所蔵品・会員が存在しない場合は`StoreError::NotFound`。
    async fn borrow(
        &self,
        item_id: ItemId,
        member_id: MemberId,
        today: NaiveDate,
    ) -> Result<std::result::Result<Loan, BorrowRefusal>>;

    /// 貸出を返却する
    ///
    /// 返却日を記録し、メディアを再び貸出可能にする。
    /// 貸出が存在しない場合は`StoreError::NotFound`。
    async fn close(
        &self,
        loan_id: LoanId,
        today: NaiveDate,
    ) -> Result<std::result::Result<Loan, ReturnRefusal>>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 会員の全貸出を貸出日の新しい順で取得する
    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>>;

    /// 会員の未返却貸出数（都度数える）
    async fn count_open_for_member(&self, member_id: MemberId) -> Result<usize>;

    /// 会員ごとの未返却貸出数（未返却がない会員は含まない）
    async fn count_open_by_member(&self) -> Result<HashMap<MemberId, usize>>;

    /// 未返却貸出の総数
    async fn count_open(&self) -> Result<usize>;

    /// 延滞候補を検索する
    ///
    /// 返却期限が`today`より前の未返却貸出を返却期限順で返す。
    async fn find_overdue_candidates(&self, today: NaiveDate) -> Result<Vec<Loan>>;
}
