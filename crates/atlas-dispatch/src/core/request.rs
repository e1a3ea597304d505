//! # 在途请求与生命周期状态机
//!
//! ## 核心意图（Why）
//! - 每个请求从发起到终态只允许一条合法路径：`Issued → Pending → {Completed | Cancelled}`；
//!   两个终态互斥，先认领者胜出，另一方的后续动作必须退化为无操作；
//! - 在途请求持有调度枢纽的强引用：只要存在未终结的请求，
//!   枢纽就不会被释放，悬挂的回调因此永远有家可回。
//!
//! ## 状态机约束（What）
//! - 合法跃迁：`Issued → Pending`、`Pending → Completed`、`Pending → Cancelled`；
//! - 终态不再接受任何跃迁；非法跃迁由 [`PendingRequest::transition`] 校验并拒绝。

use std::sync::Arc;

use atlas_core::engine::RequestId;
use atlas_core::options::RequestKind;

use crate::core::dispatcher::DispatcherCore;
use crate::error::DispatchError;

/// 请求生命周期阶段。
///
/// # 教案式说明
/// - **契约 (What)**：阶段间跃迁受 [`RequestPhase::can_transition_to`] 限制；
/// - **风险 (Trade-offs)**：登记表中只会存在 `Pending` 阶段的条目，
///   终态阶段仅在认领后的瞬时校验中出现。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RequestPhase {
    /// 引擎已受理，标识已分配，尚未写入登记表。
    Issued,
    /// 已登记，等待引擎回调或调用方取消。
    Pending,
    /// 完成回调认领成功，结果已交付或交付在途。
    Completed,
    /// 取消操作认领成功，不会再有结果交付。
    Cancelled,
}

impl RequestPhase {
    /// 判断阶段是否允许跃迁至 `target`。
    pub fn can_transition_to(self, target: RequestPhase) -> bool {
        matches!(
            (self, target),
            (RequestPhase::Issued, RequestPhase::Pending)
                | (RequestPhase::Pending, RequestPhase::Completed)
                | (RequestPhase::Pending, RequestPhase::Cancelled)
        )
    }

    /// 阶段是否为终态。
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestPhase::Completed | RequestPhase::Cancelled)
    }
}

/// 登记表中的在途请求实体。
///
/// # 教案式说明
/// - **契约 (What)**：
///   - `id`：引擎分配的请求标识，同时是登记表键；
///   - `kind`：请求种类，供快照诊断与日志使用；
///   - `owner`：对调度枢纽的强引用，条目存续期间保持枢纽存活，
///     随条目终结一并释放；
/// - **风险 (Trade-offs)**：`owner` 与枢纽内的登记表构成有意的引用环，
///   依赖「条目必然被完成或取消移除」来断开；引擎回执契约保证了这一点。
pub struct PendingRequest {
    id: RequestId,
    kind: RequestKind,
    phase: RequestPhase,
    owner: Arc<DispatcherCore>,
}

impl PendingRequest {
    /// 构造处于 `Issued` 阶段的在途请求。
    pub(crate) fn new(id: RequestId, kind: RequestKind, owner: Arc<DispatcherCore>) -> Self {
        Self {
            id,
            kind,
            phase: RequestPhase::Issued,
            owner,
        }
    }

    /// 请求标识。
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// 请求种类。
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// 当前阶段。
    #[must_use]
    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    /// 状态机跃迁。
    ///
    /// # 教案式注释
    /// - **契约 (What)**：
    ///   - `next`：目标阶段；
    ///   - **前置条件**：调用方持有可变引用，确保无并发写；
    ///   - **后置条件**：成功时 `phase` 更新为 `next`；
    ///   - **错误**：非法跃迁返回 [`DispatchError::InvalidPhaseTransition`]。
    pub(crate) fn transition(&mut self, next: RequestPhase) -> Result<(), DispatchError> {
        if self.phase == next {
            return Ok(());
        }

        if !self.phase.can_transition_to(next) {
            return Err(DispatchError::InvalidPhaseTransition {
                id: self.id,
                from: self.phase,
                to: next,
            });
        }

        self.phase = next;
        Ok(())
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
