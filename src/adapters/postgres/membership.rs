use crate::domain::{Member, MemberId};
use crate::ports::errors::Result;
use crate::ports::membership::Membership as MembershipTrait;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use super::count_to_usize;

fn map_row_to_member(row: &PgRow) -> Result<Member> {
    Ok(Member {
        id: MemberId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        registered_on: row.try_get("registered_on")?,
        blocked: row.try_get("blocked")?,
    })
}

/// Load and lock a member row until the surrounding transaction ends
///
/// Locking the member serializes concurrent borrows by the same member,
/// so the open-loan count read afterwards cannot go stale.
pub(super) async fn fetch_member_for_update(
    conn: &mut PgConnection,
    member_id: MemberId,
) -> Result<Option<Member>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, registered_on, blocked
        FROM members
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(member_id.value())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(map_row_to_member).transpose()
}

/// PostgreSQL implementation of the membership store
pub struct Membership {
    pool: PgPool,
}

impl Membership {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipTrait for Membership {
    /// Insert a member; a duplicate email surfaces as `StoreError::Duplicate("email")`
    async fn insert_member(&self, member: Member) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (id, name, email, registered_on, blocked)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(member.id.value())
        .bind(&member.name)
        .bind(&member.email)
        .bind(member.registered_on)
        .bind(member.blocked)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, registered_on, blocked
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_member).transpose()
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, registered_on, blocked
            FROM members
            ORDER BY name ASC, email ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_member).collect()
    }

    async fn count_members(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        count_to_usize(count)
    }

    async fn set_blocked(&self, member_id: MemberId, blocked: bool) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            UPDATE members
            SET blocked = $2
            WHERE id = $1
            RETURNING id, name, email, registered_on, blocked
            "#,
        )
        .bind(member_id.value())
        .bind(blocked)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_member).transpose()
    }
}
