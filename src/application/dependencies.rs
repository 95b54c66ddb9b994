use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞いは持たず、ユースケース関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub catalog: Arc<dyn Catalog>,
    pub membership: Arc<dyn Membership>,
    pub loan_ledger: Arc<dyn LoanLedger>,
    pub clock: Arc<dyn Clock>,
}

impl ServiceDependencies {
    /// 3つのストアを1つの実装で兼ねる場合の組み立て
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: Catalog + Membership + LoanLedger + 'static,
    {
        Self {
            catalog: store.clone(),
            membership: store.clone(),
            loan_ledger: store,
            clock,
        }
    }
}
