// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供后台检查处理和工作器管理功能
/// 包括阶段执行、工作器生命周期管理和并发控制
pub mod check_worker;
pub mod manager;
