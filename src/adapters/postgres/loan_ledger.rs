use crate::domain::{BorrowRefusal, ItemId, Loan, LoanId, MemberId, ReturnRefusal, loan};
use crate::ports::errors::{Result, StoreError};
use crate::ports::loan_ledger::LoanLedger as LoanLedgerTrait;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::collections::HashMap;

use super::{catalog::fetch_item, count_to_usize, membership::fetch_member_for_update};

fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    Ok(Loan {
        loan_id: LoanId::from_uuid(row.try_get("id")?),
        item_id: ItemId::from_uuid(row.try_get("media_id")?),
        member_id: MemberId::from_uuid(row.try_get("member_id")?),
        borrowed_on: row.try_get("borrowed_on")?,
        due_on: row.try_get("due_on")?,
        returned_on: row.try_get("returned_on")?,
    })
}

async fn count_open_on(conn: &mut PgConnection, member_id: MemberId) -> Result<usize> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM loans
        WHERE member_id = $1 AND returned_on IS NULL
        "#,
    )
    .bind(member_id.value())
    .fetch_one(&mut *conn)
    .await?;

    count_to_usize(count)
}

/// PostgreSQL implementation of the loan ledger
///
/// Borrow and return each run in a single transaction that also updates the
/// media availability flag.
pub struct LoanLedger {
    pool: PgPool,
}

impl LoanLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanLedgerTrait for LoanLedger {
    /// Borrow inside one transaction
    ///
    /// Locks the media row, then the member row, counts the member's open
    /// loans and lets the domain decide. A concurrent borrow of the same item
    /// waits on the media lock and then sees it unavailable.
    async fn borrow(
        &self,
        item_id: ItemId,
        member_id: MemberId,
        today: NaiveDate,
    ) -> Result<std::result::Result<Loan, BorrowRefusal>> {
        let mut tx = self.pool.begin().await?;

        let item = fetch_item(&mut tx, item_id, true)
            .await?
            .ok_or(StoreError::NotFound("item"))?;
        let member = fetch_member_for_update(&mut tx, member_id)
            .await?
            .ok_or(StoreError::NotFound("member"))?;
        let open_loans = count_open_on(&mut tx, member_id).await?;

        let new_loan = match loan::evaluate_borrow(&item, &member, open_loans, today) {
            Ok(new_loan) => new_loan,
            Err(refusal) => {
                tx.rollback().await?;
                return Ok(Err(refusal));
            }
        };

        sqlx::query(
            r#"
            INSERT INTO loans (id, media_id, member_id, borrowed_on, due_on, returned_on)
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(new_loan.loan_id.value())
        .bind(new_loan.item_id.value())
        .bind(new_loan.member_id.value())
        .bind(new_loan.borrowed_on)
        .bind(new_loan.due_on)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE media SET available = FALSE WHERE id = $1")
            .bind(new_loan.item_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Ok(new_loan))
    }

    /// Return inside one transaction, restoring the media availability
    async fn close(
        &self,
        loan_id: LoanId,
        today: NaiveDate,
    ) -> Result<std::result::Result<Loan, ReturnRefusal>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, media_id, member_id, borrowed_on, due_on, returned_on
            FROM loans
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("loan"))?;
        let current = map_row_to_loan(&row)?;

        let returned = match loan::return_loan(&current, today) {
            Ok(returned) => returned,
            Err(refusal) => {
                tx.rollback().await?;
                return Ok(Err(refusal));
            }
        };

        sqlx::query("UPDATE loans SET returned_on = $2 WHERE id = $1")
            .bind(loan_id.value())
            .bind(returned.returned_on)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE media SET available = TRUE WHERE id = $1")
            .bind(returned.item_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Ok(returned))
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, media_id, member_id, borrowed_on, due_on, returned_on
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, media_id, member_id, borrowed_on, due_on, returned_on
            FROM loans
            WHERE member_id = $1
            ORDER BY borrowed_on DESC
            "#,
        )
        .bind(member_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn count_open_for_member(&self, member_id: MemberId) -> Result<usize> {
        let mut conn = self.pool.acquire().await?;
        count_open_on(&mut conn, member_id).await
    }

    async fn count_open_by_member(&self) -> Result<HashMap<MemberId, usize>> {
        let rows = sqlx::query(
            r#"
            SELECT member_id, COUNT(*) AS open_loans
            FROM loans
            WHERE returned_on IS NULL
            GROUP BY member_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<(MemberId, usize)> {
                Ok((
                    MemberId::from_uuid(row.try_get("member_id")?),
                    count_to_usize(row.try_get("open_loans")?)?,
                ))
            })
            .collect()
    }

    async fn count_open(&self) -> Result<usize> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE returned_on IS NULL")
                .fetch_one(&self.pool)
                .await?;

        count_to_usize(count)
    }

    /// Open loans whose due date is before `today`, oldest due date first
    async fn find_overdue_candidates(&self, today: NaiveDate) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, media_id, member_id, borrowed_on, due_on, returned_on
            FROM loans
            WHERE returned_on IS NULL AND due_on < $1
            ORDER BY due_on ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}
