// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::serp::SerpSnapshot;

/// 目标URL在结果集中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPlacement {
    /// 从1开始的排名位置
    pub position: i32,
    /// 命中条目的原始URL（未做任何规范化）
    pub url: String,
}

/// 在结果快照中提取目标URL的排名
///
/// 纯函数。对目标与每个候选URL做相同的规范化（转小写并去掉
/// 末尾斜杠），按供应商给出的顺序扫描，返回规范化候选包含
/// 规范化目标的第一个位置（从1开始）以及该条目的原始URL。
/// 没有任何条目命中时返回 None——"未命中"是合法结果而非错误。
///
/// 并列裁决：首个命中者胜出，本函数从不重新排序或打分，
/// 供应商的结果顺序就是权威顺序。
///
/// # 参数
///
/// * `snapshot` - 解码后的搜索结果快照
/// * `target_url` - 要定位的目标URL
///
/// # 返回值
///
/// 第一个命中条目的位置与原始URL；未命中时为 None
pub fn extract_rank(snapshot: &SerpSnapshot, target_url: &str) -> Option<RankPlacement> {
    let target = normalize_url(target_url);

    snapshot.items.iter().enumerate().find_map(|(idx, item)| {
        if normalize_url(&item.url).contains(&target) {
            Some(RankPlacement {
                position: idx as i32 + 1,
                url: item.url.clone(),
            })
        } else {
            None
        }
    })
}

/// 排名匹配所用的URL规范化：转小写并去掉全部末尾斜杠
pub fn normalize_url(url: &str) -> String {
    url.to_lowercase().trim_end_matches('/').to_string()
}
