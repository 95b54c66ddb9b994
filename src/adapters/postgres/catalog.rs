use crate::domain::{BoardGame, CatalogItem, ItemId, Media, MediaKind, MediaType};
use crate::ports::catalog::{Catalog as CatalogTrait, MediaCounts};
use crate::ports::errors::{Result, StoreError};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::str::FromStr;

use super::count_to_usize;

/// Map a media row onto the domain sum type
///
/// The variant columns that do not belong to the row's media_type are ignored.
fn map_row_to_media(row: &PgRow) -> Result<Media> {
    let media_type: String = row.try_get("media_type")?;
    let kind = match MediaType::from_str(&media_type).map_err(StoreError::backend)? {
        MediaType::Book => MediaKind::Book {
            isbn: row.try_get("isbn")?,
            pages: row.try_get("pages")?,
        },
        MediaType::Dvd => MediaKind::Dvd {
            director: row
                .try_get::<Option<String>, _>("director")?
                .unwrap_or_default(),
            duration_minutes: row.try_get("duration_minutes")?,
        },
        MediaType::Cd => MediaKind::Cd {
            artist: row
                .try_get::<Option<String>, _>("artist")?
                .unwrap_or_default(),
            tracks: row.try_get("tracks")?,
        },
        MediaType::BoardGame => {
            return Err(StoreError::backend("board_game row found in media table"));
        }
    };

    Ok(Media {
        id: ItemId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        year: row.try_get("publication_year")?,
        available: row.try_get("available")?,
        kind,
    })
}

fn map_row_to_board_game(row: &PgRow) -> Result<BoardGame> {
    Ok(BoardGame {
        id: ItemId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        creator: row.try_get("creator")?,
        min_players: row.try_get("min_players")?,
        max_players: row.try_get("max_players")?,
    })
}

/// Load a catalog item on an existing connection
///
/// With `lock_media` the media row is locked (`FOR UPDATE`) until the
/// surrounding transaction ends. Board games are immutable and never locked.
pub(super) async fn fetch_item(
    conn: &mut PgConnection,
    item_id: ItemId,
    lock_media: bool,
) -> Result<Option<CatalogItem>> {
    let sql = if lock_media {
        r#"
        SELECT id, title, author, publication_year, media_type, available,
               isbn, pages, director, duration_minutes, artist, tracks
        FROM media
        WHERE id = $1
        FOR UPDATE
        "#
    } else {
        r#"
        SELECT id, title, author, publication_year, media_type, available,
               isbn, pages, director, duration_minutes, artist, tracks
        FROM media
        WHERE id = $1
        "#
    };

    let row = sqlx::query(sql)
        .bind(item_id.value())
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(row) = row {
        return map_row_to_media(&row).map(|media| Some(CatalogItem::Media(media)));
    }

    let row = sqlx::query(
        r#"
        SELECT id, title, creator, min_players, max_players
        FROM board_games
        WHERE id = $1
        "#,
    )
    .bind(item_id.value())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref()
        .map(|row| map_row_to_board_game(row).map(CatalogItem::BoardGame))
        .transpose()
}

/// PostgreSQL implementation of the catalog store
pub struct Catalog {
    pool: PgPool,
}

impl Catalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogTrait for Catalog {
    /// Insert media; a duplicate ISBN surfaces as `StoreError::Duplicate("isbn")`
    async fn insert_media(&self, media: Media) -> Result<()> {
        let (isbn, pages, director, duration_minutes, artist, tracks) = match &media.kind {
            MediaKind::Book { isbn, pages } => (isbn.clone(), *pages, None, None, None, None),
            MediaKind::Dvd {
                director,
                duration_minutes,
            } => (None, None, Some(director.clone()), *duration_minutes, None, None),
            MediaKind::Cd { artist, tracks } => {
                (None, None, None, None, Some(artist.clone()), *tracks)
            }
        };

        sqlx::query(
            r#"
            INSERT INTO media (
                id,
                title,
                author,
                publication_year,
                media_type,
                available,
                isbn,
                pages,
                director,
                duration_minutes,
                artist,
                tracks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(media.id.value())
        .bind(&media.title)
        .bind(&media.author)
        .bind(media.year)
        .bind(media.media_type().as_str())
        .bind(media.available)
        .bind(isbn)
        .bind(pages)
        .bind(director)
        .bind(duration_minutes)
        .bind(artist)
        .bind(tracks)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_board_game(&self, game: BoardGame) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO board_games (id, title, creator, min_players, max_players)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(game.id.value())
        .bind(&game.title)
        .bind(&game.creator)
        .bind(game.min_players)
        .bind(game.max_players)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_item(&self, item_id: ItemId) -> Result<Option<CatalogItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_item(&mut conn, item_id, false).await
    }

    async fn list_media(&self) -> Result<Vec<Media>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, publication_year, media_type, available,
                   isbn, pages, director, duration_minutes, artist, tracks
            FROM media
            ORDER BY title ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_media).collect()
    }

    async fn list_board_games(&self) -> Result<Vec<BoardGame>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, creator, min_players, max_players
            FROM board_games
            ORDER BY title ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_board_game).collect()
    }

    async fn count_media(&self) -> Result<MediaCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE available) AS available
            FROM media
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(MediaCounts {
            total: count_to_usize(row.try_get("total")?)?,
            available: count_to_usize(row.try_get("available")?)?,
        })
    }
}
