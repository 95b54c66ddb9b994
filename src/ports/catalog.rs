use crate::domain::{BoardGame, CatalogItem, ItemId, Media};
use async_trait::async_trait;

use super::errors::Result;

/// メディア件数の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaCounts {
    pub total: usize,
    pub available: usize,
}

/// カタログストアポート
///
/// メディア（書籍・DVD・CD）とボードゲームの永続化を抽象化する。
/// ISBNは設定されている場合に一意（違反時は`StoreError::Duplicate("isbn")`）。
#[async_trait]
pub trait Catalog: Send + Sync {
    /// メディアを登録する
    async fn insert_media(&self, media: Media) -> Result<()>;

    /// ボードゲームを登録する
    async fn insert_board_game(&self, game: BoardGame) -> Result<()>;

    /// IDで所蔵品を取得する（メディアまたはボードゲーム）
    async fn get_item(&self, item_id: ItemId) -> Result<Option<CatalogItem>>;

    /// 全メディアをタイトル順で取得する
    async fn list_media(&self) -> Result<Vec<Media>>;

    /// 全ボードゲームをタイトル順で取得する
    async fn list_board_games(&self) -> Result<Vec<BoardGame>>;

    /// メディアの総数と貸出可能数
    async fn count_media(&self) -> Result<MediaCounts>;
}
