//! 结构化日志门面。
//!
//! # 设计背景（Why）
//! - 契约层不绑定具体日志后端：宿主可能对接 `tracing`、系统日志或自研采集器；
//!   这里只固化「一条记录长什么样、往哪里交」，与指标/追踪后端解耦；
//! - 级别取主流生态的交集，保证映射到任意后端时语义不失真。
//!
//! # 契约说明（What）
//! - [`Logger`] 对象安全，可装入 `Arc<dyn Logger>` 注入调度层；
//! - 记录仅在 `log` 调用期间有效，实现方如需延迟输出必须自行克隆；
//! - `enabled` 用于前置过滤，避免为被丢弃的记录拼装消息。

use alloc::borrow::Cow;

use crate::Error;

/// 日志级别。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// 单条结构化日志记录。
///
/// - `target` 为日志分类（如 `atlas::dispatch`），对齐主流门面的 Target 语义；
/// - `error` 以引用携带错误链，避免在日志路径上克隆错误对象。
#[derive(Debug)]
pub struct LogRecord<'a> {
    pub severity: LogSeverity,
    pub target: &'a str,
    pub message: Cow<'a, str>,
    pub error: Option<&'a (dyn Error + 'static)>,
}

impl<'a> LogRecord<'a> {
    /// 构建新的日志记录。
    pub fn new(severity: LogSeverity, target: &'a str, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            severity,
            target,
            message: message.into(),
            error: None,
        }
    }

    /// 关联错误对象。
    #[must_use]
    pub fn with_error(mut self, error: &'a (dyn Error + 'static)) -> Self {
        self.error = Some(error);
        self
    }
}

/// `Logger` 定义日志记录的接收端。
pub trait Logger: Send + Sync + 'static {
    /// 提交一条记录。实现方不得阻塞调用线程做远程 I/O。
    fn log(&self, record: &LogRecord<'_>);

    /// 级别是否会被记录；默认全部放行。
    fn enabled(&self, severity: LogSeverity) -> bool {
        let _ = severity;
        true
    }
}

/// 丢弃所有记录的空实现，作为未注入日志后端时的默认值。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _record: &LogRecord<'_>) {}

    fn enabled(&self, _severity: LogSeverity) -> bool {
        false
    }
}
