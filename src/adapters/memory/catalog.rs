use crate::domain::{BoardGame, CatalogItem, ItemId, Media};
use crate::ports::catalog::{Catalog, MediaCounts};
use crate::ports::errors::{Result, StoreError};
use async_trait::async_trait;

use super::InMemoryStore;

#[async_trait]
impl Catalog for InMemoryStore {
    /// Insert media, enforcing ISBN uniqueness among books
    async fn insert_media(&self, media: Media) -> Result<()> {
        let mut tables = self.tables()?;

        if let Some(isbn) = media.isbn() {
            if tables.media.values().any(|m| m.isbn() == Some(isbn)) {
                return Err(StoreError::Duplicate("isbn"));
            }
        }
        if tables.media.contains_key(&media.id) || tables.board_games.contains_key(&media.id) {
            return Err(StoreError::Duplicate("id"));
        }

        tables.media.insert(media.id, media);
        Ok(())
    }

    async fn insert_board_game(&self, game: BoardGame) -> Result<()> {
        let mut tables = self.tables()?;

        if tables.media.contains_key(&game.id) || tables.board_games.contains_key(&game.id) {
            return Err(StoreError::Duplicate("id"));
        }

        tables.board_games.insert(game.id, game);
        Ok(())
    }

    async fn get_item(&self, item_id: ItemId) -> Result<Option<CatalogItem>> {
        let tables = self.tables()?;

        if let Some(media) = tables.media.get(&item_id) {
            return Ok(Some(CatalogItem::Media(media.clone())));
        }
        Ok(tables
            .board_games
            .get(&item_id)
            .cloned()
            .map(CatalogItem::BoardGame))
    }

    async fn list_media(&self) -> Result<Vec<Media>> {
        let tables = self.tables()?;

        let mut media: Vec<Media> = tables.media.values().cloned().collect();
        media.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.value().cmp(&b.id.value())));
        Ok(media)
    }

    async fn list_board_games(&self) -> Result<Vec<BoardGame>> {
        let tables = self.tables()?;

        let mut games: Vec<BoardGame> = tables.board_games.values().cloned().collect();
        games.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.value().cmp(&b.id.value())));
        Ok(games)
    }

    async fn count_media(&self) -> Result<MediaCounts> {
        let tables = self.tables()?;

        Ok(MediaCounts {
            total: tables.media.len(),
            available: tables.media.values().filter(|m| m.available).count(),
        })
    }
}
