use crate::domain::{BoardGame, CatalogItem, ItemId, Media, commands::*};
use serde::Serialize;

use super::{ApplicationError, Result, ServiceDependencies};

/// メディア一覧（公開ビュー）
#[derive(Debug, Clone, Serialize)]
pub struct MediaListing {
    pub media: Vec<Media>,
    /// 貸出可能なメディアの数
    pub available: usize,
}

/// メディア（書籍・DVD・CD）を登録する
///
/// 種別は`MediaKind`のバリアントで決まる。登録直後は貸出可能。
pub async fn register_media(deps: &ServiceDependencies, cmd: RegisterMedia) -> Result<Media> {
    let media = Media::new(cmd.title, cmd.author, cmd.year, cmd.kind)?;
    deps.catalog.insert_media(media.clone()).await?;

    tracing::info!(
        item_id = %media.id,
        media_type = media.media_type().as_str(),
        title = %media.title,
        "Media registered"
    );
    Ok(media)
}

/// ボードゲームを登録する（貸出対象外）
pub async fn register_board_game(
    deps: &ServiceDependencies,
    cmd: RegisterBoardGame,
) -> Result<BoardGame> {
    let game = BoardGame::new(cmd.title, cmd.creator, cmd.min_players, cmd.max_players)?;
    deps.catalog.insert_board_game(game.clone()).await?;

    tracing::info!(item_id = %game.id, title = %game.title, "Board game registered");
    Ok(game)
}

pub async fn get_item(deps: &ServiceDependencies, item_id: ItemId) -> Result<CatalogItem> {
    deps.catalog
        .get_item(item_id)
        .await?
        .ok_or(ApplicationError::NotFound("item"))
}

/// タイトル順のメディア一覧と貸出可能数
pub async fn list_media(deps: &ServiceDependencies) -> Result<MediaListing> {
    let media = deps.catalog.list_media().await?;
    let available = media.iter().filter(|m| m.available).count();

    Ok(MediaListing { media, available })
}

pub async fn list_board_games(deps: &ServiceDependencies) -> Result<Vec<BoardGame>> {
    Ok(deps.catalog.list_board_games().await?)
}
