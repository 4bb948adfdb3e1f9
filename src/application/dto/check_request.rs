// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::check::CheckRequest;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 排名检查请求数据传输对象
///
/// 用于封装客户端发起的排名检查请求的相关参数
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CheckRequestDto {
    /// 关键词标识符
    pub keyword_id: i64,
    /// 搜索查询文本
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,
    /// 要在结果中定位的目标URL
    #[validate(length(min = 1, message = "Target URL cannot be empty"))]
    pub target_url: String,
    /// 地区代码，缺省为 "RU"
    #[validate(length(min = 2, max = 8, message = "Region must be 2 to 8 characters"))]
    pub region: Option<String>,
}

impl CheckRequestDto {
    /// 转换为领域检查请求，填充缺省地区
    pub fn into_domain(self) -> CheckRequest {
        CheckRequest {
            keyword_id: self.keyword_id,
            query: self.query,
            target_url: self.target_url,
            region: self.region.unwrap_or_else(|| "RU".to_string()),
        }
    }
}
