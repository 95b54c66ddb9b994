use crate::application::{
    ServiceDependencies,
    catalog::{self, MediaListing},
    loan,
    membership::{self, MemberDirectory, MemberStanding},
    stats::{self, LibraryOverview},
};
use crate::domain::{
    BoardGame, ItemId, LoanId, LoanStatus, Media, Member, MemberId, commands::ReturnMedia,
};
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{
    caller::Caller,
    error::ApiError,
    extract::{JsonBody, PathParam, QueryParams},
    types::{
        BorrowRequest, ItemResponse, ListLoansQuery, LoanResponse, RegisterBoardGameRequest,
        RegisterBookRequest, RegisterCdRequest, RegisterDvdRequest, RegisterMemberRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    /// スタッフ認証用トークン（未設定ならスタッフ操作はすべて403）
    pub staff_token: Option<String>,
}

impl AppState {
    pub fn new(service_deps: ServiceDependencies, staff_token: Option<String>) -> Self {
        Self {
            service_deps,
            staff_token: staff_token.filter(|token| !token.is_empty()),
        }
    }
}

// ============================================================================
// Public queries
// ============================================================================

/// GET / - 図書館の概要
pub async fn overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LibraryOverview>, ApiError> {
    Ok(Json(stats::library_overview(&state.service_deps).await?))
}

/// GET /media - メディア一覧（タイトル順）と貸出可能数
pub async fn list_media(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MediaListing>, ApiError> {
    Ok(Json(catalog::list_media(&state.service_deps).await?))
}

/// GET /items/:id - 所蔵品（メディアまたはボードゲーム）
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    PathParam(item_id): PathParam<Uuid>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = catalog::get_item(&state.service_deps, ItemId::from_uuid(item_id)).await?;
    Ok(Json(ItemResponse::from(item)))
}

/// GET /board-games
pub async fn list_board_games(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BoardGame>>, ApiError> {
    Ok(Json(catalog::list_board_games(&state.service_deps).await?))
}

// ============================================================================
// Catalog commands (staff)
// ============================================================================

/// POST /media/books
pub async fn register_book(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    JsonBody(req): JsonBody<RegisterBookRequest>,
) -> Result<(StatusCode, Json<Media>), ApiError> {
    caller.require_staff()?;
    req.validate()?;

    let media = catalog::register_media(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// POST /media/dvds
pub async fn register_dvd(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    JsonBody(req): JsonBody<RegisterDvdRequest>,
) -> Result<(StatusCode, Json<Media>), ApiError> {
    caller.require_staff()?;
    req.validate()?;

    let media = catalog::register_media(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// POST /media/cds
pub async fn register_cd(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    JsonBody(req): JsonBody<RegisterCdRequest>,
) -> Result<(StatusCode, Json<Media>), ApiError> {
    caller.require_staff()?;
    req.validate()?;

    let media = catalog::register_media(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// POST /board-games
pub async fn register_board_game(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    JsonBody(req): JsonBody<RegisterBoardGameRequest>,
) -> Result<(StatusCode, Json<BoardGame>), ApiError> {
    caller.require_staff()?;
    req.validate()?;

    let game = catalog::register_board_game(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

// ============================================================================
// Members (staff)
// ============================================================================

/// GET /members - 会員名簿
///
/// スタッフ以外はメディア一覧にリダイレクトする。
pub async fn member_directory(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Response, ApiError> {
    if !caller.is_staff() {
        return Ok((StatusCode::FOUND, [(header::LOCATION, "/media")]).into_response());
    }

    let directory: MemberDirectory = membership::member_directory(&state.service_deps).await?;
    Ok(Json(directory).into_response())
}

/// POST /members
pub async fn register_member(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    JsonBody(req): JsonBody<RegisterMemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    caller.require_staff()?;
    req.validate()?;

    let member = membership::register_member(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /members/:id - 会員と貸出可否
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    PathParam(member_id): PathParam<Uuid>,
) -> Result<Json<MemberStanding>, ApiError> {
    caller.require_staff()?;

    let standing =
        membership::get_member_standing(&state.service_deps, MemberId::from_uuid(member_id))
            .await?;
    Ok(Json(standing))
}

/// POST /members/:id/block
pub async fn block_member(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    PathParam(member_id): PathParam<Uuid>,
) -> Result<Json<Member>, ApiError> {
    caller.require_staff()?;

    let member =
        membership::set_blocked(&state.service_deps, MemberId::from_uuid(member_id), true).await?;
    Ok(Json(member))
}

/// POST /members/:id/unblock
pub async fn unblock_member(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    PathParam(member_id): PathParam<Uuid>,
) -> Result<Json<Member>, ApiError> {
    caller.require_staff()?;

    let member =
        membership::set_blocked(&state.service_deps, MemberId::from_uuid(member_id), false)
            .await?;
    Ok(Json(member))
}

// ============================================================================
// Loans (staff)
// ============================================================================

/// POST /loans - 貸出を試みる
///
/// 貸出ルールにより拒否された場合は422と理由コードを返す。
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    JsonBody(req): JsonBody<BorrowRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    caller.require_staff()?;

    let outcome = loan::attempt_borrow(&state.service_deps, req.to_command()).await?;
    match outcome {
        loan::BorrowOutcome::Borrowed(created) => {
            let today = state.service_deps.clock.today();
            Ok((StatusCode::CREATED, Json(LoanResponse::new(&created, today))))
        }
        loan::BorrowOutcome::Refused(refusal) => Err(ApiError::Refused(refusal)),
    }
}

/// POST /loans/:id/return - 返却
///
/// 延滞中の貸出も返却可能。`returned_late`で延滞返却かを示す。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    PathParam(loan_id): PathParam<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    caller.require_staff()?;

    let cmd = ReturnMedia {
        loan_id: LoanId::from_uuid(loan_id),
    };
    let returned = loan::return_media(&state.service_deps, cmd).await?;

    let today = state.service_deps.clock.today();
    Ok(Json(LoanResponse::new(&returned, today)))
}

/// GET /loans/:id - 貸出詳細
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    PathParam(loan_id): PathParam<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    caller.require_staff()?;

    let found = loan::get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;
    let today = state.service_deps.clock.today();
    Ok(Json(LoanResponse::new(&found, today)))
}

/// GET /loans - 会員の貸出一覧
///
/// クエリパラメータ:
/// - member_id: 会員ID（必須）
/// - status: active, overdue, returned（オプション）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    QueryParams(query): QueryParams<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    caller.require_staff()?;

    let member_id = query
        .member_id
        .map(MemberId::from_uuid)
        .ok_or_else(|| ApiError::BadRequest("member_id query parameter is required".into()))?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<LoanStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let loans = loan::list_member_loans(&state.service_deps, member_id, status).await?;
    let today = state.service_deps.clock.today();
    Ok(Json(loans.iter().map(|l| LoanResponse::new(l, today)).collect()))
}

/// GET /loans/overdue - 延滞中の貸出（返却期限の古い順）
pub async fn list_overdue_loans(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    caller.require_staff()?;

    let overdue = loan::find_overdue_loans(&state.service_deps).await?;
    let today = state.service_deps.clock.today();
    Ok(Json(overdue.iter().map(|l| LoanResponse::new(l, today)).collect()))
}
