use crate::domain::{
    BorrowRefusal, CatalogItem, ItemId, Loan, LoanId, MemberId, ReturnRefusal, loan,
};
use crate::ports::errors::{Result, StoreError};
use crate::ports::loan_ledger::LoanLedger;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use super::{InMemoryStore, Tables};

fn open_loans_for(tables: &Tables, member_id: MemberId) -> usize {
    tables
        .loans
        .values()
        .filter(|l| l.member_id == member_id && l.is_open())
        .count()
}

#[async_trait]
impl LoanLedger for InMemoryStore {
    /// Evaluate and record a borrow under the store lock
    async fn borrow(
        &self,
        item_id: ItemId,
        member_id: MemberId,
        today: NaiveDate,
    ) -> Result<std::result::Result<Loan, BorrowRefusal>> {
        let mut tables = self.tables()?;

        let item = match (tables.media.get(&item_id), tables.board_games.get(&item_id)) {
            (Some(media), _) => CatalogItem::Media(media.clone()),
            (None, Some(game)) => CatalogItem::BoardGame(game.clone()),
            (None, None) => return Err(StoreError::NotFound("item")),
        };
        let member = tables
            .members
            .get(&member_id)
            .cloned()
            .ok_or(StoreError::NotFound("member"))?;
        let open_loans = open_loans_for(&tables, member_id);

        let new_loan = match loan::evaluate_borrow(&item, &member, open_loans, today) {
            Ok(new_loan) => new_loan,
            Err(refusal) => return Ok(Err(refusal)),
        };

        if let Some(media) = tables.media.get_mut(&item_id) {
            media.available = false;
        }
        tables.loans.insert(new_loan.loan_id, new_loan.clone());

        Ok(Ok(new_loan))
    }

    /// Close a loan and make its media available again
    async fn close(
        &self,
        loan_id: LoanId,
        today: NaiveDate,
    ) -> Result<std::result::Result<Loan, ReturnRefusal>> {
        let mut tables = self.tables()?;

        let current = tables
            .loans
            .get(&loan_id)
            .cloned()
            .ok_or(StoreError::NotFound("loan"))?;

        let returned = match loan::return_loan(&current, today) {
            Ok(returned) => returned,
            Err(refusal) => return Ok(Err(refusal)),
        };

        if let Some(media) = tables.media.get_mut(&returned.item_id) {
            media.available = true;
        }
        tables.loans.insert(loan_id, returned.clone());

        Ok(Ok(returned))
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self.tables()?.loans.get(&loan_id).cloned())
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        let tables = self.tables()?;

        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|l| l.member_id == member_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.borrowed_on.cmp(&a.borrowed_on));
        Ok(loans)
    }

    async fn count_open_for_member(&self, member_id: MemberId) -> Result<usize> {
        let tables = self.tables()?;
        Ok(open_loans_for(&tables, member_id))
    }

    async fn count_open_by_member(&self) -> Result<HashMap<MemberId, usize>> {
        let tables = self.tables()?;

        let mut counts = HashMap::new();
        for open in tables.loans.values().filter(|l| l.is_open()) {
            *counts.entry(open.member_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_open(&self) -> Result<usize> {
        Ok(self.tables()?.loans.values().filter(|l| l.is_open()).count())
    }

    async fn find_overdue_candidates(&self, today: NaiveDate) -> Result<Vec<Loan>> {
        let tables = self.tables()?;

        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|l| l.is_open() && l.due_on < today)
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.due_on.cmp(&b.due_on));
        Ok(loans)
    }
}
