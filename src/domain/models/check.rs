// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 排名检查请求
///
/// 一次流水线执行的不可变输入，由 Web 层在调度检查时创建，
/// 被调度器消费一次。keyword_id 对本核心是不透明标识。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// 关键词标识符，由排除在外的 CRUD 层分配
    pub keyword_id: i64,
    /// 搜索查询文本
    pub query: String,
    /// 要在结果中定位的目标URL
    pub target_url: String,
    /// 地区代码，如 "RU"
    pub region: String,
}

/// 排名检查任务
///
/// 表示队列中一个待执行的排名检查，携带检查请求本身、
/// 可恢复的执行阶段、重试计数和工作器租约信息。
/// 状态转换遵循 Queued → Active → Completed/Failed，
/// 重试和轮询重新入队会使任务回到 Queued。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankCheck {
    /// 检查唯一标识符
    pub id: Uuid,
    /// 关键词标识符
    pub keyword_id: i64,
    /// 搜索查询文本
    pub query: String,
    /// 目标URL
    pub target_url: String,
    /// 地区代码
    pub region: String,
    /// 检查状态
    pub status: CheckStatus,
    /// 当前执行阶段，持久化后轮询可以在任意工作器上恢复
    pub phase: CheckPhase,
    /// 已消耗的提交周期次数（轮询重新入队不计入）
    pub attempt_count: i32,
    /// 最大重试次数
    pub max_retries: i32,
    /// 最近一次失败的原因
    pub last_error: Option<String>,
    /// 计划执行时间，轮询与重试都通过它延迟执行
    pub scheduled_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 首次开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 终态时间（完成或永久失败）
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
    /// 工作器租约令牌
    pub lock_token: Option<Uuid>,
    /// 租约过期时间，过期的 active 检查会被维护循环重新入队
    pub lock_expires_at: Option<DateTime<FixedOffset>>,
}

/// 检查状态枚举
///
/// 状态转换遵循以下流程：
/// Queued → Active → Completed/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// 已入队，等待工作器领取（含轮询与重试的延迟等待）
    #[default]
    Queued,
    /// 活跃中，某个工作器持有租约正在执行一个阶段
    Active,
    /// 已完成，排名记录已写入
    Completed,
    /// 已失败，不会再产生排名记录，历史序列在此留下缺口
    Failed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CheckStatus::Queued => write!(f, "queued"),
            CheckStatus::Active => write!(f, "active"),
            CheckStatus::Completed => write!(f, "completed"),
            CheckStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for CheckStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(CheckStatus::Queued),
            "active" => Ok(CheckStatus::Active),
            "completed" => Ok(CheckStatus::Completed),
            "failed" => Ok(CheckStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 检查执行阶段
///
/// 提交/轮询状态机的持久化形式。外部供应商的操作是异步的，
/// 工作器不在进程内等待轮询间隔，而是把阶段连同
/// next-due 时间写回数据库后释放自己；下一次轮询
/// 由任何一个工作器在到期后领取执行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CheckPhase {
    /// 尚未向供应商提交，先查缓存，未命中则提交
    Submit,
    /// 已提交，持有操作句柄，按固定间隔轮询其状态
    Poll {
        /// 供应商返回的操作句柄
        operation_id: String,
        /// 已经执行过的轮询次数（出错的轮询同样计入）
        polls_done: u32,
    },
}

impl CheckPhase {
    /// 阶段名称，用于日志与指标标签
    pub fn name(&self) -> &'static str {
        match self {
            CheckPhase::Submit => "submit",
            CheckPhase::Poll { .. } => "poll",
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当检查状态转换不符合业务规则时发生
    #[error("Invalid state transition")]
    InvalidStateTransition,

    /// 验证错误，当输入数据不符合领域规则时发生
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl RankCheck {
    /// 从检查请求创建一个新的排名检查
    ///
    /// # 参数
    ///
    /// * `request` - 检查请求
    ///
    /// # 返回值
    ///
    /// 返回处于 Queued 状态、Submit 阶段的新检查
    pub fn new(request: CheckRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            keyword_id: request.keyword_id,
            query: request.query,
            target_url: request.target_url,
            region: request.region,
            status: CheckStatus::Queued,
            phase: CheckPhase::Submit,
            attempt_count: 0,
            max_retries: 3,
            last_error: None,
            scheduled_at: None,
            created_at: Utc::now().into(),
            started_at: None,
            completed_at: None,
            updated_at: Utc::now().into(),
            lock_token: None,
            lock_expires_at: None,
        }
    }

    /// 启动检查
    ///
    /// 将检查状态从Queued变更为Active
    ///
    /// # 返回值
    ///
    /// * `Ok(RankCheck)` - 成功启动的检查
    /// * `Err(DomainError)` - 状态转换失败
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            CheckStatus::Queued => {
                self.status = CheckStatus::Active;
                if self.started_at.is_none() {
                    self.started_at = Some(Utc::now().into());
                }
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 完成检查
    ///
    /// 将检查状态从Active变更为Completed
    pub fn complete(mut self) -> Result<Self, DomainError> {
        match self.status {
            CheckStatus::Active => {
                self.status = CheckStatus::Completed;
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 标记检查失败
    ///
    /// 将检查状态从Active变更为Failed
    pub fn fail(mut self) -> Result<Self, DomainError> {
        match self.status {
            CheckStatus::Active => {
                self.status = CheckStatus::Failed;
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 进入轮询阶段
    ///
    /// 提交成功后调用：记录操作句柄，回到 Queued 并安排首次轮询。
    ///
    /// # 参数
    ///
    /// * `operation_id` - 供应商返回的操作句柄
    /// * `next_due` - 首次轮询的到期时间
    pub fn begin_polling(&mut self, operation_id: String, next_due: DateTime<Utc>) {
        self.phase = CheckPhase::Poll {
            operation_id,
            polls_done: 0,
        };
        self.status = CheckStatus::Queued;
        self.scheduled_at = Some(next_due.into());
        self.lock_token = None;
        self.lock_expires_at = None;
        self.updated_at = Utc::now().into();
    }

    /// 安排下一次轮询
    ///
    /// 消耗一次轮询预算并回到 Queued。出错的轮询同样经由此处
    /// 计入预算，预算耗尽由调用方判定为超时。
    ///
    /// # 返回值
    ///
    /// * `Err(DomainError)` - 当前不在轮询阶段
    pub fn continue_polling(&mut self, next_due: DateTime<Utc>) -> Result<(), DomainError> {
        match &mut self.phase {
            CheckPhase::Poll { polls_done, .. } => {
                *polls_done += 1;
                self.status = CheckStatus::Queued;
                self.scheduled_at = Some(next_due.into());
                self.lock_token = None;
                self.lock_expires_at = None;
                self.updated_at = Utc::now().into();
                Ok(())
            }
            CheckPhase::Submit => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 安排一次重试
    ///
    /// 消耗一个重试名额，回到 Submit 阶段从头提交。
    /// 轮询重新入队不经过此处，因此重试预算只统计提交周期。
    ///
    /// # 参数
    ///
    /// * `reason` - 触发重试的失败原因
    /// * `next_attempt_at` - 重试的到期时间
    pub fn schedule_retry(&mut self, reason: String, next_attempt_at: DateTime<Utc>) {
        self.attempt_count += 1;
        self.phase = CheckPhase::Submit;
        self.status = CheckStatus::Queued;
        self.last_error = Some(reason);
        self.scheduled_at = Some(next_attempt_at.into());
        self.lock_token = None;
        self.lock_expires_at = None;
        self.updated_at = Utc::now().into();
    }

    /// 判断检查是否还有重试名额
    pub fn can_retry(&self) -> bool {
        self.attempt_count < self.max_retries
    }

    /// 判断检查是否已到达终态
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, CheckStatus::Completed | CheckStatus::Failed)
    }

    /// 当前请求对应的不可变输入
    pub fn request(&self) -> CheckRequest {
        CheckRequest {
            keyword_id: self.keyword_id,
            query: self.query.clone(),
            target_url: self.target_url.clone(),
            region: self.region.clone(),
        }
    }
}
