//! # SerialDeliveryQueue：串行完成投递队列
//!
//! ## 核心意图（Why）
//! - 引擎回调来自不受控的多线程环境，而调用方的完成回调要求单线程、按投递顺序到达
//!   （UI 事件循环的通行约束）；本队列以一条专职线程消费任务通道，
//!   把多线程回调收敛为有序的单线程交付；
//! - 作为 [`CompletionContext`](atlas_core::context::CompletionContext) 的生产级实现，
//!   与测试用的同步上下文可互换注入。
//!
//! ## 行为契约（What）
//! - 任务严格按 `dispatch` 调用顺序执行；
//! - 队列被丢弃后，已入队任务仍会被投递线程排空执行；其后的 `dispatch` 静默丢弃任务；
//! - 投递线程不被 join：避免在完成回调内部释放队列时自我等待。

use std::io;
use std::sync::mpsc::{self, Sender};
use std::thread;

use atlas_core::context::{CompletionContext, CompletionTask};
use atlas_core::error::{NavError, codes};

/// 单线程有序投递队列。
///
/// # 教案式说明
/// - **契约 (What)**：
///   - `new` 启动名为 `atlas-delivery` 的专职线程，线程生命周期与发送端绑定；
///   - `dispatch` 无阻塞入队；队列关闭后任务被静默丢弃，不会执行到一半；
/// - **风险 (Trade-offs)**：任务内的 panic 会终止投递线程，其后的任务全部丢失；
///   调用方回调应自行兜底异常。
#[derive(Debug)]
pub struct SerialDeliveryQueue {
    sender: Sender<CompletionTask>,
}

impl SerialDeliveryQueue {
    /// 启动投递线程并返回队列句柄。
    ///
    /// - **错误**：操作系统拒绝创建线程时，以
    ///   [`DELIVERY_SPAWN`](atlas_core::error::codes::DELIVERY_SPAWN) 码值上报。
    pub fn new() -> Result<Self, NavError> {
        let (sender, receiver) = mpsc::channel::<CompletionTask>();
        thread::Builder::new()
            .name(String::from("atlas-delivery"))
            .spawn(move || {
                while let Ok(task) = receiver.recv() {
                    task();
                }
            })
            .map_err(|err: io::Error| {
                NavError::new(codes::DELIVERY_SPAWN, "failed to spawn the delivery thread")
                    .with_cause(err)
            })?;
        Ok(Self { sender })
    }
}

impl CompletionContext for SerialDeliveryQueue {
    fn dispatch(&self, task: CompletionTask) {
        // 发送失败意味着投递线程已退出；按契约静默丢弃。
        let _ = self.sender.send(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc::channel;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn tasks_run_in_dispatch_order_on_one_thread() {
        let queue = SerialDeliveryQueue::new().expect("delivery thread starts");
        let (done_tx, done_rx) = channel();

        for index in 0..32_u32 {
            let done_tx = done_tx.clone();
            queue.dispatch(Box::new(move || {
                done_tx
                    .send((index, thread::current().id()))
                    .expect("collector alive");
            }));
        }

        let mut observed = Vec::new();
        for _ in 0..32 {
            observed.push(
                done_rx
                    .recv_timeout(Duration::from_secs(5))
                    .expect("all tasks delivered"),
            );
        }

        let indices: Vec<u32> = observed.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, (0..32).collect::<Vec<_>>());

        let first_thread = observed[0].1;
        assert!(observed.iter().all(|(_, thread_id)| *thread_id == first_thread));
    }

    #[test]
    fn queued_tasks_drain_after_queue_is_dropped() {
        let queue = SerialDeliveryQueue::new().expect("delivery thread starts");
        let (done_tx, done_rx) = channel();

        for _ in 0..8 {
            let done_tx = done_tx.clone();
            queue.dispatch(Box::new(move || {
                done_tx.send(()).expect("collector alive");
            }));
        }
        drop(queue);

        for _ in 0..8 {
            done_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("queued tasks still drain");
        }
    }

    #[test]
    fn queue_is_shareable_across_threads() {
        let queue = Arc::new(SerialDeliveryQueue::new().expect("delivery thread starts"));
        let (done_tx, done_rx) = channel();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let queue = Arc::clone(&queue);
            let done_tx = done_tx.clone();
            handles.push(thread::spawn(move || {
                queue.dispatch(Box::new(move || {
                    done_tx.send(thread::current().id()).expect("collector alive");
                }));
            }));
        }
        for handle in handles {
            handle.join().expect("producer threads finish");
        }

        let first = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("task delivered");
        for _ in 0..3 {
            let next = done_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("task delivered");
            assert_eq!(next, first);
        }
    }
}
