// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 搜索结果条目
///
/// 解码后的单条搜索结果。条目顺序即供应商给出的排名顺序，
/// 本系统从不重新排序或打分。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpItem {
    /// 结果URL，缺失时容忍为空字符串
    #[serde(default)]
    pub url: String,
}

/// 搜索结果快照
///
/// 一次异步搜索操作解码后的结构化结果集，构造后不可变。
/// 同一份快照既被写入缓存，也被排名提取器消费。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpSnapshot {
    /// 按供应商排名顺序排列的结果条目
    #[serde(default)]
    pub items: Vec<SerpItem>,
}

impl SerpSnapshot {
    /// 本次检查的结果总数
    pub fn total_results(&self) -> i32 {
        self.items.len() as i32
    }
}
