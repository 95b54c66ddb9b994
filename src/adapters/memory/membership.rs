use crate::domain::{Member, MemberId};
use crate::ports::errors::{Result, StoreError};
use crate::ports::membership::Membership;
use async_trait::async_trait;

use super::InMemoryStore;

#[async_trait]
impl Membership for InMemoryStore {
    /// Insert a member, enforcing email uniqueness
    async fn insert_member(&self, member: Member) -> Result<()> {
        let mut tables = self.tables()?;

        if tables.members.values().any(|m| m.email == member.email) {
            return Err(StoreError::Duplicate("email"));
        }
        if tables.members.contains_key(&member.id) {
            return Err(StoreError::Duplicate("id"));
        }

        tables.members.insert(member.id, member);
        Ok(())
    }

    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        Ok(self.tables()?.members.get(&member_id).cloned())
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        let tables = self.tables()?;

        let mut members: Vec<Member> = tables.members.values().cloned().collect();
        members.sort_by(|a, b| a.name.cmp(&b.name).then(a.email.cmp(&b.email)));
        Ok(members)
    }

    async fn count_members(&self) -> Result<usize> {
        let tables = self.tables()?;
        Ok(tables.members.len())
    }

    async fn set_blocked(&self, member_id: MemberId, blocked: bool) -> Result<Option<Member>> {
        let mut tables = self.tables()?;

        Ok(tables.members.get_mut(&member_id).map(|member| {
            member.blocked = blocked;
            member.clone()
        }))
    }
}
