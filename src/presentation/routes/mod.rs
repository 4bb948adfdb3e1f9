// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::{check_handler, ranking_handler};
use axum::{
    routing::{get, post},
    Router,
};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let check_routes = Router::new()
        .route("/v1/checks", post(check_handler::create_check))
        .route("/v1/checks/{id}", get(check_handler::get_check))
        .route(
            "/v1/keywords/{keyword_id}/rankings",
            get(ranking_handler::get_rankings),
        );

    Router::new().merge(public_routes).merge(check_routes)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
