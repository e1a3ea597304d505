//! 登记表一致性的性质验证。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：并发发起 N 个请求后并发取消任一子集，登记表必须恰好剩下
//!   未取消、未完成的补集：条目既不丢失也不重复。该性质直接约束登记/认领路径的
//!   原子性，防止新实现在发起护栏或认领语义上走样。
//! - **设计手法 (How)**：Proptest 负责生成请求规模与取消子集（以种子位图表达），
//!   每个用例真实地从多线程发起与取消，最终对快照、计数与逐标识成员关系做三重断言。
//! - **边界 (What)**：用例不触发任何完成回执；完成与取消的竞态属于
//!   `tests/dispatcher.rs` 的场景测试，此处聚焦登记表本身的集合语义。

mod support;

use std::collections::BTreeSet;
use std::thread;

use proptest::prelude::*;

use atlas_core::engine::RequestId;
use atlas_dispatch::{RequestPhase, RouteHandler};

use support::MockEngine;

/// 以种子位图决定某个标识是否进入取消子集。
fn should_cancel(seed: u64, id: RequestId) -> bool {
    (seed >> (id.value() % 64)) & 1 == 1
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn cancelled_subset_leaves_exactly_the_complement(
        total in 1usize..16,
        cancel_seed in any::<u64>(),
    ) {
        let engine = MockEngine::new();
        let dispatcher = support::dispatcher(&engine);

        // 并发发起。
        let mut issuers = Vec::new();
        for _ in 0..total {
            let dispatcher = dispatcher.clone();
            issuers.push(thread::spawn(move || {
                let handler: RouteHandler = Box::new(|_, _| {});
                dispatcher.request_route(support::route_options(), handler)
            }));
        }
        let ids: Vec<RequestId> = issuers
            .into_iter()
            .map(|worker| worker.join().expect("issuer thread finishes"))
            .collect();

        // 标识在悬挂期间必须唯一。
        let unique: BTreeSet<u64> = ids.iter().map(|id| id.value()).collect();
        prop_assert_eq!(unique.len(), ids.len());

        // 并发取消种子选中的子集。
        let mut cancellers = Vec::new();
        for id in ids.iter().copied().filter(|id| should_cancel(cancel_seed, *id)) {
            let dispatcher = dispatcher.clone();
            cancellers.push(thread::spawn(move || dispatcher.cancel(id)));
        }
        for worker in cancellers {
            worker.join().expect("cancel thread finishes");
        }

        let expected: BTreeSet<u64> = ids
            .iter()
            .filter(|id| !should_cancel(cancel_seed, **id))
            .map(|id| id.value())
            .collect();

        let snapshot = dispatcher.registry().snapshot();
        let observed: BTreeSet<u64> = snapshot.iter().map(|entry| entry.id.value()).collect();
        prop_assert_eq!(&observed, &expected);
        prop_assert_eq!(dispatcher.registry().len(), expected.len());
        prop_assert!(snapshot.iter().all(|entry| entry.phase == RequestPhase::Pending));

        for id in &ids {
            prop_assert_eq!(
                dispatcher.registry().contains(*id),
                expected.contains(&id.value())
            );
        }

        // 引擎侧的中止信号与取消子集一一对应。
        let cancelled: BTreeSet<u64> = engine.cancelled().iter().map(|id| id.value()).collect();
        let requested: BTreeSet<u64> = ids
            .iter()
            .filter(|id| should_cancel(cancel_seed, **id))
            .map(|id| id.value())
            .collect();
        prop_assert_eq!(cancelled, requested);
    }
}
