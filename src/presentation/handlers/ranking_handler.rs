// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    application::dto::ranking_response::RankingHistoryDto,
    domain::repositories::ranking_repository::RankingRepository,
    infrastructure::repositories::ranking_repo_impl::RankingRepositoryImpl,
    presentation::errors::AppError,
};

/// 排名历史查询参数
#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    /// 返回的最大记录数
    pub limit: Option<u64>,
}

/// 查询关键词的排名历史
///
/// 按检查时间倒序返回，失败的检查不产生记录，
/// 序列中的缺口即是它们的痕迹。
pub async fn get_rankings(
    Path(keyword_id): Path<i64>,
    Query(params): Query<RankingQuery>,
    Extension(repository): Extension<Arc<RankingRepositoryImpl>>,
) -> Result<Json<RankingHistoryDto>, AppError> {
    let limit = params.limit.unwrap_or(100).min(1000);

    let records = repository.find_by_keyword(keyword_id, limit).await?;

    Ok(Json(RankingHistoryDto {
        success: true,
        keyword_id,
        rankings: records.into_iter().map(Into::into).collect(),
    }))
}
