use crate::domain::{self, Loan};

use crate::application::{Result, ServiceDependencies};

/// 延滞中の貸出を検出する
///
/// 台帳から候補（返却期限が今日より前の未返却貸出）を取得し、
/// `domain::loan::is_overdue`で最終判定する。返却期限の古い順。
///
/// 状態は変更しない。延滞は保存された状態ではなく、今日の日付から導出される。
pub async fn find_overdue_loans(deps: &ServiceDependencies) -> Result<Vec<Loan>> {
    let today = deps.clock.today();

    let overdue: Vec<Loan> = deps
        .loan_ledger
        .find_overdue_candidates(today)
        .await?
        .into_iter()
        .filter(|loan| domain::loan::is_overdue(loan, today))
        .collect();

    tracing::debug!(count = overdue.len(), %today, "Overdue loans detected");
    Ok(overdue)
}
