//! # RequestRegistry：在途请求登记表
//!
//! ## 核心意图（Why）
//! - 提供基于 `DashMap` 的并发安全存储，确保完成回调与取消操作在多线程环境下
//!   对同一条目的「认领」具备原子语义：`remove` 的返回值即认领凭据，先到先得；
//! - 作为调度枢纽的唯一共享可变状态，由枢纽独占修改，外部仅可读。
//!
//! ## 行为契约（What）
//! - `register`：同名标识已存在时返回
//!   [`DispatchError::DuplicateRequest`](crate::error::DispatchError::DuplicateRequest)，
//!   这是引擎或调用方的缺陷信号；
//! - `remove`：原子移除并返回条目；标识不存在时返回 `None`，是良性无操作，
//!   因为回调天然可能与取消竞速；
//! - `contains` / `len` / `is_empty` / `snapshot`：只读诊断口；
//! - 所有方法只做内存表更新，绝不等待任何在途网络操作。
//!
//! ## 风险提示（Trade-offs）
//! - `DashMap` guard 在持有期间会阻塞同分片写操作，本模块不向外借出 guard，
//!   以免调用方长期持有；
//! - 条目未提供自动过期策略，悬挂条目的回收依赖引擎「至多一次回执」契约。

use dashmap::{DashMap, mapref::entry::Entry};

use atlas_core::engine::RequestId;
use atlas_core::options::RequestKind;

use crate::core::request::{PendingRequest, RequestPhase};
use crate::error::DispatchError;

/// 登记表条目的只读快照。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RequestSnapshot {
    pub id: RequestId,
    pub kind: RequestKind,
    pub phase: RequestPhase,
}

/// `RequestRegistry` 负责集中管理在途请求。
///
/// # 教案式注释
/// - **意图 (Why)**：封装并发安全存储，避免上层直接操作 `DashMap`；
/// - **契约 (What)**：键为引擎分配的 [`RequestId`]，条目登记时跃迁至 `Pending` 阶段；
/// - **风险 (Trade-offs)**：当前未内建指标统计，后续可结合分片视图暴露监控。
#[derive(Debug, Default)]
pub struct RequestRegistry {
    entries: DashMap<RequestId, PendingRequest>,
}

impl RequestRegistry {
    /// 创建空的登记表。
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 将新的在途请求写入登记表。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：原子地插入新条目，阻止重复标识覆盖已有请求；
    /// - **契约 (What)**：
    ///   - `request`：处于 `Issued` 阶段的在途请求；
    ///   - **前置条件**：同名标识不应已存在；若存在则返回 `DuplicateRequest`；
    ///   - **后置条件**：成功时条目阶段为 `Pending`，并出现在登记表中。
    pub(crate) fn register(&self, mut request: PendingRequest) -> Result<(), DispatchError> {
        match self.entries.entry(request.id()) {
            Entry::Occupied(_) => Err(DispatchError::DuplicateRequest { id: request.id() }),
            Entry::Vacant(slot) => {
                request.transition(RequestPhase::Pending)?;
                slot.insert(request);
                Ok(())
            }
        }
    }

    /// 原子移除并返回条目；这是完成与取消之间的「认领」操作。
    ///
    /// - **契约 (What)**：返回 `Some` 表示认领成功，调用方独占该条目的终结权；
    ///   返回 `None` 表示条目已被另一方认领或从未存在，属于良性无操作。
    pub(crate) fn remove(&self, id: RequestId) -> Option<PendingRequest> {
        self.entries.remove(&id).map(|(_, request)| request)
    }

    /// 标识是否仍在登记表中。
    #[must_use]
    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.contains_key(&id)
    }

    /// 当前在途请求数量。
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 登记表是否为空。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 导出全部条目的只读快照，供诊断与测试使用。
    ///
    /// - **风险 (Trade-offs)**：快照逐分片读取，与并发写之间无全表一致性保证；
    ///   仅应用于观测，不应参与调度决策。
    #[must_use]
    pub fn snapshot(&self) -> Vec<RequestSnapshot> {
        self.entries
            .iter()
            .map(|entry| RequestSnapshot {
                id: entry.id(),
                kind: entry.kind(),
                phase: entry.phase(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatcher::test_util::test_core;

    fn pending(id: u64) -> PendingRequest {
        PendingRequest::new(RequestId::new(id), RequestKind::Route, test_core())
    }

    #[test]
    fn register_inserts_and_marks_pending() {
        let registry = RequestRegistry::new();
        registry.register(pending(1)).expect("fresh id registers");

        assert!(registry.contains(RequestId::new(1)));
        assert_eq!(registry.len(), 1);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].phase, RequestPhase::Pending);
        assert_eq!(snapshot[0].kind, RequestKind::Route);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = RequestRegistry::new();
        registry.register(pending(9)).expect("fresh id registers");

        let err = registry
            .register(pending(9))
            .expect_err("duplicate id must be rejected");
        assert!(matches!(err, DispatchError::DuplicateRequest { id } if id == RequestId::new(9)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = RequestRegistry::new();
        registry.register(pending(3)).expect("fresh id registers");

        assert!(registry.remove(RequestId::new(3)).is_some());
        assert!(registry.remove(RequestId::new(3)).is_none());
        assert!(registry.remove(RequestId::new(404)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_lists_every_pending_entry() {
        let registry = RequestRegistry::new();
        for id in 1..=4 {
            registry.register(pending(id)).expect("fresh id registers");
        }
        registry.remove(RequestId::new(2));

        let mut ids: Vec<u64> = registry
            .snapshot()
            .iter()
            .map(|snapshot| snapshot.id.value())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3, 4]);
    }
}
