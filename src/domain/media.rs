use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ItemId, ValidationError};

/// タイトルの最大文字数
pub const MAX_TITLE_LEN: usize = 200;
/// 著者・監督・アーティスト名の最大文字数
pub const MAX_CREATOR_LEN: usize = 100;
/// ISBNの最大文字数
pub const MAX_ISBN_LEN: usize = 13;

/// 所蔵品の種別タグ
///
/// メディアの種別は`MediaKind`から導出され、単独では設定できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Book,
    Dvd,
    Cd,
    BoardGame,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Book => "book",
            MediaType::Dvd => "dvd",
            MediaType::Cd => "cd",
            MediaType::BoardGame => "board_game",
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(MediaType::Book),
            "dvd" => Ok(MediaType::Dvd),
            "cd" => Ok(MediaType::Cd),
            "board_game" => Ok(MediaType::BoardGame),
            _ => Err(format!("Invalid media type: {}", s)),
        }
    }
}

/// メディア種別ごとの固有データ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "snake_case")]
pub enum MediaKind {
    Book {
        isbn: Option<String>,
        pages: Option<i32>,
    },
    Dvd {
        director: String,
        duration_minutes: Option<i32>,
    },
    Cd {
        artist: String,
        tracks: Option<i32>,
    },
}

impl MediaKind {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaKind::Book { .. } => MediaType::Book,
            MediaKind::Dvd { .. } => MediaType::Dvd,
            MediaKind::Cd { .. } => MediaType::Cd,
        }
    }
}

/// 貸出可能なメディア（書籍・DVD・CD）
///
/// 不変条件：`available`は、このメディアを参照する未返却の貸出が
/// ちょうど1件存在する場合にのみfalseとなる。
/// この値を書き換えるのは貸出台帳の貸出・返却トランザクションだけ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: ItemId,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub available: bool,
    #[serde(flatten)]
    pub kind: MediaKind,
}

impl Media {
    /// 新しいメディアを登録用に作成する（貸出可能な状態）
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
        kind: MediaKind,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let author = author.into();
        ValidationError::check_len("title", &title, MAX_TITLE_LEN)?;
        ValidationError::check_len("author", &author, MAX_CREATOR_LEN)?;

        // 空のISBNは未設定として扱う
        let kind = match kind {
            MediaKind::Book { isbn, pages } => {
                let isbn = isbn
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                if let Some(isbn) = &isbn {
                    ValidationError::check_len("isbn", isbn, MAX_ISBN_LEN)?;
                }
                MediaKind::Book { isbn, pages }
            }
            MediaKind::Dvd {
                director,
                duration_minutes,
            } => {
                ValidationError::check_len("director", &director, MAX_CREATOR_LEN)?;
                MediaKind::Dvd {
                    director,
                    duration_minutes,
                }
            }
            MediaKind::Cd { artist, tracks } => {
                ValidationError::check_len("artist", &artist, MAX_CREATOR_LEN)?;
                MediaKind::Cd { artist, tracks }
            }
        };

        Ok(Self {
            id: ItemId::new(),
            title,
            author,
            year,
            available: true,
            kind,
        })
    }

    pub fn media_type(&self) -> MediaType {
        self.kind.media_type()
    }

    pub fn isbn(&self) -> Option<&str> {
        match &self.kind {
            MediaKind::Book { isbn, .. } => isbn.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.title, self.author, self.year)
    }
}

/// ボードゲーム
///
/// メディアではなく、貸出可否フラグを持たない。貸出は常に拒否される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardGame {
    pub id: ItemId,
    pub title: String,
    pub creator: String,
    pub min_players: i32,
    pub max_players: i32,
}

impl BoardGame {
    pub const DEFAULT_MIN_PLAYERS: i32 = 1;
    pub const DEFAULT_MAX_PLAYERS: i32 = 4;

    pub fn new(
        title: impl Into<String>,
        creator: impl Into<String>,
        min_players: i32,
        max_players: i32,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let creator = creator.into();
        ValidationError::check_len("title", &title, MAX_TITLE_LEN)?;
        ValidationError::check_len("creator", &creator, MAX_CREATOR_LEN)?;

        if min_players < 1 || min_players > max_players {
            return Err(ValidationError::InvalidPlayerRange {
                min: min_players,
                max: max_players,
            });
        }

        Ok(Self {
            id: ItemId::new(),
            title,
            creator,
            min_players,
            max_players,
        })
    }
}

impl fmt::Display for BoardGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (created by {})", self.title, self.creator)
    }
}

/// カタログの所蔵品（メディアまたはボードゲーム）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogItem {
    Media(Media),
    BoardGame(BoardGame),
}

impl CatalogItem {
    pub fn id(&self) -> ItemId {
        match self {
            CatalogItem::Media(media) => media.id,
            CatalogItem::BoardGame(game) => game.id,
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            CatalogItem::Media(media) => media.media_type(),
            CatalogItem::BoardGame(_) => MediaType::BoardGame,
        }
    }

    /// 貸出対象になりうるか（ボードゲームは常にfalse）
    pub fn is_loanable(&self) -> bool {
        matches!(self, CatalogItem::Media(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(isbn: Option<&str>) -> Result<Media, ValidationError> {
        Media::new(
            "Python pour débutants",
            "Jean Dupont",
            2023,
            MediaKind::Book {
                isbn: isbn.map(str::to_string),
                pages: Some(300),
            },
        )
    }

    #[test]
    fn test_new_book_is_available_and_tagged_book() {
        let media = book(Some("9781234567890")).unwrap();
        assert!(media.available);
        assert_eq!(media.media_type(), MediaType::Book);
        assert_eq!(media.isbn(), Some("9781234567890"));
    }

    #[test]
    fn test_dvd_tag_is_derived_from_kind() {
        let dvd = Media::new(
            "Inception",
            "Christopher Nolan",
            2010,
            MediaKind::Dvd {
                director: "Christopher Nolan".into(),
                duration_minutes: Some(148),
            },
        )
        .unwrap();
        assert_eq!(dvd.media_type(), MediaType::Dvd);
        assert_eq!(dvd.isbn(), None);
    }

    #[test]
    fn test_blank_isbn_is_treated_as_absent() {
        let media = book(Some("   ")).unwrap();
        assert_eq!(media.isbn(), None);
    }

    #[test]
    fn test_isbn_longer_than_13_is_rejected() {
        let err = book(Some("97812345678901")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "isbn",
                max: MAX_ISBN_LEN
            }
        );
    }

    #[test]
    fn test_empty_title_is_rejected() {
        let err = Media::new(
            "",
            "Artist",
            1999,
            MediaKind::Cd {
                artist: "Artist".into(),
                tracks: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("title"));
    }

    #[test]
    fn test_media_serializes_type_tag_from_kind() {
        let media = book(None).unwrap();
        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["media_type"], "book");
        assert_eq!(json["pages"], 300);
        assert_eq!(json["available"], true);
    }

    #[test]
    fn test_media_display() {
        let media = book(None).unwrap();
        assert_eq!(media.to_string(), "Python pour débutants (Jean Dupont, 2023)");
    }

    #[test]
    fn test_board_game_is_not_loanable() {
        let game = BoardGame::new("Monopoly", "Charles Darrow", 2, 8).unwrap();
        assert_eq!(game.to_string(), "Monopoly (created by Charles Darrow)");

        let item = CatalogItem::BoardGame(game);
        assert!(!item.is_loanable());
        assert_eq!(item.media_type(), MediaType::BoardGame);
    }

    #[test]
    fn test_media_item_is_loanable() {
        let item = CatalogItem::Media(book(None).unwrap());
        assert!(item.is_loanable());
    }

    #[test]
    fn test_board_game_player_range_must_be_ordered() {
        let err = BoardGame::new("Catan", "Klaus Teuber", 5, 3).unwrap_err();
        assert_eq!(err, ValidationError::InvalidPlayerRange { min: 5, max: 3 });

        let err = BoardGame::new("Catan", "Klaus Teuber", 0, 3).unwrap_err();
        assert_eq!(err, ValidationError::InvalidPlayerRange { min: 0, max: 3 });
    }

    #[test]
    fn test_media_type_round_trips_through_str() {
        for t in [MediaType::Book, MediaType::Dvd, MediaType::Cd, MediaType::BoardGame] {
            assert_eq!(t.as_str().parse::<MediaType>().unwrap(), t);
        }
        assert!("vinyl".parse::<MediaType>().is_err());
    }
}
