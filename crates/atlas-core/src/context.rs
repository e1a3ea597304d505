//! 完成回调的投递上下文契约。
//!
//! # 设计背景（Why）
//! - 引擎回调发生在调度层无法控制的任意线程；而调用方通常要求完成回调
//!   单线程、有序地到达（UI 主线程即为典型）。两者之间需要一个可注入的投递缝隙；
//! - 参考运行时执行器契约的通行做法：对象安全接口 + 装箱任务，
//!   宿主可对接事件循环、线程池或测试用的同步执行器。
//!
//! # 契约说明（What）
//! - **前置条件**：提交的任务满足 `Send + 'static`；
//! - **后置条件**：同一上下文内按提交顺序执行任务；上下文关闭后允许静默丢弃任务，
//!   但不得执行到一半。
//!
//! # 风险提示（Trade-offs）
//! - 接口不提供任务句柄，无法等待或取消单个投递；需要可观测性时应在任务内部埋点。

use alloc::boxed::Box;

/// 待投递的完成任务。
pub type CompletionTask = Box<dyn FnOnce() + Send + 'static>;

/// `CompletionContext` 定义完成回调的投递位置。
pub trait CompletionContext: Send + Sync + 'static {
    /// 提交一个任务，按提交顺序执行。
    fn dispatch(&self, task: CompletionTask);
}

/// 在提交线程上同步执行任务的上下文。
///
/// - **意图 (Why)**：用于测试与无事件循环的宿主；投递即执行，天然有序；
/// - **风险 (Trade-offs)**：任务在引擎回调线程上执行，调用方回调不得假设自己
///   位于固定线程。生产环境请优先使用串行投递队列。
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineContext;

impl CompletionContext for InlineContext {
    fn dispatch(&self, task: CompletionTask) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn inline_context_runs_task_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task_counter = Arc::clone(&counter);
        InlineContext.dispatch(Box::new(move || {
            task_counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
