pub mod catalog;
pub mod loan_ledger;
pub mod membership;

use crate::ports::errors::StoreError;

// パブリックに型を再エクスポート
pub use catalog::Catalog as PostgresCatalog;
pub use loan_ledger::LoanLedger as PostgresLoanLedger;
pub use membership::Membership as PostgresMembership;

/// Map sqlx errors onto the store error taxonomy
///
/// Unique violations are reported by the name of the field they protect,
/// everything else is an opaque backend failure.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some("members_email_key") => "email",
                    Some("media_isbn_key") => "isbn",
                    Some("loans_one_open_per_media") => "open loan",
                    _ => "key",
                };
                return StoreError::Duplicate(field);
            }
        }
        StoreError::backend(err)
    }
}

/// Convert a COUNT(*) result into usize
fn count_to_usize(count: i64) -> Result<usize, StoreError> {
    usize::try_from(count)
        .map_err(|_| StoreError::backend(format!("count out of range: {}", count)))
}
