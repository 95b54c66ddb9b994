use crate::domain::{Member, MemberId};
use async_trait::async_trait;

use super::errors::Result;

/// 会員ストアポート
///
/// emailは一意（違反時は`StoreError::Duplicate("email")`）。
#[async_trait]
pub trait Membership: Send + Sync {
    /// 会員を登録する
    async fn insert_member(&self, member: Member) -> Result<()>;

    /// IDで会員を取得する
    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// 全会員を名前順で取得する
    async fn list_members(&self) -> Result<Vec<Member>>;

    /// 会員数
    async fn count_members(&self) -> Result<usize>;

    /// ブロック状態を変更する
    ///
    /// 会員が存在しない場合はNoneを返す。
    async fn set_blocked(&self, member_id: MemberId, blocked: bool) -> Result<Option<Member>>;
}
