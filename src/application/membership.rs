use crate::domain::{self, Member, MemberId, commands::*};
use serde::Serialize;

use super::{ApplicationError, Result, ServiceDependencies};

/// 会員とその貸出状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStanding {
    #[serde(flatten)]
    pub member: Member,
    pub open_loans: usize,
    pub can_borrow: bool,
}

impl MemberStanding {
    fn new(member: Member, open_loans: usize) -> Self {
        let can_borrow = domain::member::can_borrow(&member, open_loans);
        Self {
            member,
            open_loans,
            can_borrow,
        }
    }
}

/// 会員名簿（スタッフ向け）
#[derive(Debug, Clone, Serialize)]
pub struct MemberDirectory {
    pub members: Vec<MemberStanding>,
    pub total: usize,
    /// ブロックされていない会員の数
    pub active: usize,
    pub blocked: usize,
    pub open_loans: usize,
}

/// 会員を登録する
///
/// 登録日は今日、ブロックなし。emailが重複する場合は`Duplicate("email")`。
pub async fn register_member(deps: &ServiceDependencies, cmd: RegisterMember) -> Result<Member> {
    let member = Member::register(cmd.name, cmd.email, deps.clock.today())?;
    deps.membership.insert_member(member.clone()).await?;

    tracing::info!(member_id = %member.id, "Member registered");
    Ok(member)
}

pub async fn get_member_standing(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<MemberStanding> {
    let member = deps
        .membership
        .get_member(member_id)
        .await?
        .ok_or(ApplicationError::NotFound("member"))?;
    let open_loans = deps.loan_ledger.count_open_for_member(member_id).await?;

    Ok(MemberStanding::new(member, open_loans))
}

/// 会員をブロック／ブロック解除する
///
/// 既存の貸出には影響しない。ブロック中は新たな貸出のみ拒否される。
pub async fn set_blocked(
    deps: &ServiceDependencies,
    member_id: MemberId,
    blocked: bool,
) -> Result<Member> {
    let member = deps
        .membership
        .set_blocked(member_id, blocked)
        .await?
        .ok_or(ApplicationError::NotFound("member"))?;

    tracing::info!(member_id = %member.id, blocked, "Member block status changed");
    Ok(member)
}

/// 会員名簿を作成する（名前順）
pub async fn member_directory(deps: &ServiceDependencies) -> Result<MemberDirectory> {
    let members = deps.membership.list_members().await?;
    let open_counts = deps.loan_ledger.count_open_by_member().await?;

    let members: Vec<MemberStanding> = members
        .into_iter()
        .map(|member| {
            let open_loans = open_counts.get(&member.id).copied().unwrap_or(0);
            MemberStanding::new(member, open_loans)
        })
        .collect();

    let blocked = members.iter().filter(|s| s.member.blocked).count();
    Ok(MemberDirectory {
        total: members.len(),
        active: members.len() - blocked,
        blocked,
        open_loans: members.iter().map(|s| s.open_loans).sum(),
        members,
    })
}
