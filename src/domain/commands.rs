use serde::{Deserialize, Serialize};

use super::{ItemId, LoanId, MediaKind, MemberId};

/// コマンド：メディアを借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowMedia {
    pub item_id: ItemId,
    pub member_id: MemberId,
}

/// コマンド：メディアを返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnMedia {
    pub loan_id: LoanId,
}

/// コマンド：メディアを登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMedia {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub kind: MediaKind,
}

/// コマンド：ボードゲームを登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBoardGame {
    pub title: String,
    pub creator: String,
    pub min_players: i32,
    pub max_players: i32,
}

/// コマンド：会員を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMember {
    pub name: String,
    pub email: String,
}
