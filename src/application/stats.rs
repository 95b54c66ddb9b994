use serde::Serialize;

use super::{Result, ServiceDependencies};

/// 図書館の概要（トップページ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LibraryOverview {
    pub total_members: usize,
    pub total_media: usize,
    pub available_media: usize,
    pub open_loans: usize,
}

pub async fn library_overview(deps: &ServiceDependencies) -> Result<LibraryOverview> {
    let total_members = deps.membership.count_members().await?;
    let media = deps.catalog.count_media().await?;
    let open_loans = deps.loan_ledger.count_open().await?;

    Ok(LibraryOverview {
        total_members,
        total_media: media.total,
        available_media: media.available,
        open_loans,
    })
}
