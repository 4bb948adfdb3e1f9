// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::check_request::CheckRequestDto,
    application::dto::check_response::{CheckResponseDto, CheckStatusDto},
    domain::repositories::check_repository::{CheckRepository, RepositoryError},
    infrastructure::repositories::check_repo_impl::CheckRepositoryImpl,
    presentation::errors::AppError,
    queue::check_queue::{CheckQueue, DatabaseCheckQueue},
};

/// 调度一次排名检查
///
/// 入队即返回，检查由后台工作器异步执行。
pub async fn create_check(
    Extension(queue): Extension<Arc<DatabaseCheckQueue<CheckRepositoryImpl>>>,
    Json(payload): Json<CheckRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let check = queue.enqueue(payload.into_domain()).await?;
    info!(
        check_id = %check.id,
        keyword_id = check.keyword_id,
        "Rank check scheduled"
    );

    let response = CheckResponseDto {
        success: true,
        id: check.id,
        status: check.status.to_string(),
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// 查询检查的执行状态
pub async fn get_check(
    Path(id): Path<Uuid>,
    Extension(repository): Extension<Arc<CheckRepositoryImpl>>,
) -> Result<Json<CheckStatusDto>, AppError> {
    let check = repository
        .find_by_id(id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    Ok(Json(CheckStatusDto {
        success: true,
        id: check.id,
        keyword_id: check.keyword_id,
        status: check.status.to_string(),
        phase: check.phase.name().to_string(),
        attempt_count: check.attempt_count,
        max_retries: check.max_retries,
        last_error: check.last_error,
        created_at: check.created_at,
        completed_at: check.completed_at,
    }))
}
