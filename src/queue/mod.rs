// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供检查队列和维护调度功能
/// 负责检查的排队、租约领取和卡死回收
pub mod check_queue;
pub mod scheduler;
