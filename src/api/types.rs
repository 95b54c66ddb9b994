use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    BoardGame, CatalogItem, ItemId, Loan, Media, MediaKind, MediaType, MemberId,
    commands::{BorrowMedia, RegisterBoardGame, RegisterMedia, RegisterMember},
    loan,
};

// ============================================================================
// Requests
// ============================================================================

/// メディア登録の共通項目
#[derive(Debug, Deserialize, Validate)]
pub struct MediaFields {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: String,
    #[validate(range(min = 0, max = 9999, message = "year must be between 0 and 9999"))]
    pub year: i32,
}

impl MediaFields {
    fn into_command(self, kind: MediaKind) -> RegisterMedia {
        RegisterMedia {
            title: self.title,
            author: self.author,
            year: self.year,
            kind,
        }
    }
}

/// POST /media/books
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBookRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: MediaFields,
    #[validate(length(max = 13, message = "isbn must be at most 13 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 1))]
    pub pages: Option<i32>,
}

impl RegisterBookRequest {
    pub fn to_command(self) -> RegisterMedia {
        let kind = MediaKind::Book {
            isbn: self.isbn,
            pages: self.pages,
        };
        self.common.into_command(kind)
    }
}

/// POST /media/dvds
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterDvdRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: MediaFields,
    #[validate(length(min = 1, max = 100, message = "director must be 1-100 characters"))]
    pub director: String,
    #[validate(range(min = 1))]
    pub duration_minutes: Option<i32>,
}

impl RegisterDvdRequest {
    pub fn to_command(self) -> RegisterMedia {
        let kind = MediaKind::Dvd {
            director: self.director,
            duration_minutes: self.duration_minutes,
        };
        self.common.into_command(kind)
    }
}

/// POST /media/cds
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterCdRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: MediaFields,
    #[validate(length(min = 1, max = 100, message = "artist must be 1-100 characters"))]
    pub artist: String,
    #[validate(range(min = 1))]
    pub tracks: Option<i32>,
}

impl RegisterCdRequest {
    pub fn to_command(self) -> RegisterMedia {
        let kind = MediaKind::Cd {
            artist: self.artist,
            tracks: self.tracks,
        };
        self.common.into_command(kind)
    }
}

/// POST /board-games
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBoardGameRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "creator must be 1-100 characters"))]
    pub creator: String,
    #[validate(range(min = 1))]
    pub min_players: Option<i32>,
    #[validate(range(min = 1))]
    pub max_players: Option<i32>,
}

impl RegisterBoardGameRequest {
    pub fn to_command(self) -> RegisterBoardGame {
        RegisterBoardGame {
            title: self.title,
            creator: self.creator,
            min_players: self.min_players.unwrap_or(BoardGame::DEFAULT_MIN_PLAYERS),
            max_players: self.max_players.unwrap_or(BoardGame::DEFAULT_MAX_PLAYERS),
        }
    }
}

/// POST /members
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterMemberRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

impl RegisterMemberRequest {
    pub fn to_command(self) -> RegisterMember {
        RegisterMember {
            name: self.name,
            email: self.email,
        }
    }
}

/// POST /loans
#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub item_id: Uuid,
    pub member_id: Uuid,
}

impl BorrowRequest {
    pub fn to_command(&self) -> BorrowMedia {
        BorrowMedia {
            item_id: ItemId::from_uuid(self.item_id),
            member_id: MemberId::from_uuid(self.member_id),
        }
    }
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// 会員IDでフィルタリング（必須）
    pub member_id: Option<Uuid>,
    /// ステータスでフィルタリング
    pub status: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// 貸出レスポンス
///
/// ステータスと延滞フラグはレスポンス作成時点の「今日」から導出する。
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub item_id: Uuid,
    pub member_id: Uuid,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status: String,
    pub overdue: bool,
    pub returned_late: bool,
}

impl LoanResponse {
    pub fn new(loan: &Loan, today: NaiveDate) -> Self {
        Self {
            loan_id: loan.loan_id.value(),
            item_id: loan.item_id.value(),
            member_id: loan.member_id.value(),
            borrowed_on: loan.borrowed_on,
            due_on: loan.due_on,
            returned_on: loan.returned_on,
            status: loan.status(today).as_str().to_string(),
            overdue: loan::is_overdue(loan, today),
            returned_late: loan.returned_late(),
        }
    }
}

/// 所蔵品レスポンス（GET /items/:id）
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ItemResponse {
    Media {
        #[serde(flatten)]
        media: Media,
        loanable: bool,
    },
    BoardGame {
        media_type: MediaType,
        #[serde(flatten)]
        game: BoardGame,
        loanable: bool,
    },
}

impl From<CatalogItem> for ItemResponse {
    fn from(item: CatalogItem) -> Self {
        let loanable = item.is_loanable();
        match item {
            CatalogItem::Media(media) => ItemResponse::Media { media, loanable },
            CatalogItem::BoardGame(game) => ItemResponse::BoardGame {
                media_type: MediaType::BoardGame,
                game,
                loanable,
            },
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
