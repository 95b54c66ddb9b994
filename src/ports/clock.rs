use chrono::NaiveDate;

/// 「今日」の日付を提供するポート
///
/// 返却期限の計算と延滞判定はこの値だけを使う。
/// 本番ではシステム時刻、テストでは固定日付を注入する。
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
