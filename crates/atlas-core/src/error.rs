//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为路由请求编排层提供统一的错误终态：无论故障来自引擎、解码还是登记表，
//!   最终都合流为携带稳定错误码的 [`NavError`]，以便日志、指标与告警系统执行精确治理；
//! - 保持 `no_std + alloc` 兼容，因此不依赖 `std::error::Error`，而复用 crate 根部定义的
//!   轻量 [`Error`](crate::Error) 抽象。
//!
//! ## 设计要求（What）
//! - 错误码始终为 `'static` 字符串，遵循 `<域>.<语义>` 命名规范（见 [`codes`]）；
//! - `message` 面向排障人员，不得包含敏感信息（如访问令牌）；
//! - 可选的 `cause` 暴露完整错误链，供 `source()` 递归遍历。

use alloc::{borrow::Cow, boxed::Box};
use core::fmt;

use crate::Error;

/// 稳定错误码集合。
///
/// # 契约说明
/// - 每个常量都是对外承诺的稳定标识，只增不改；
/// - 调用方如需自定义码值，应遵循相同的 `<域>.<语义>` 约定。
pub mod codes {
    /// 引擎回调未携带任何载荷。
    pub const RESPONSE_NO_DATA: &str = "dispatch.response.no_data";
    /// 载荷存在但不符合预期响应结构。
    pub const RESPONSE_DECODE: &str = "dispatch.response.decode";
    /// 引擎主动上报的请求失败（网络、离线数据、内部错误等）。
    pub const ENGINE_FAILURE: &str = "dispatch.engine.failure";
    /// 登记表中出现重复的请求标识，属于调用方缺陷。
    pub const REQUEST_DUPLICATE: &str = "dispatch.request.duplicate";
    /// 请求生命周期状态机拒绝了非法跃迁。
    pub const REQUEST_INVALID_PHASE: &str = "dispatch.request.invalid_phase";
    /// 构建引擎缓存失败。
    pub const ENGINE_BUILD_CACHE: &str = "engine.build.cache";
    /// 构建路由引擎实例失败。
    pub const ENGINE_BUILD_ROUTER: &str = "engine.build.router";
    /// 投递线程无法启动。
    pub const DELIVERY_SPAWN: &str = "dispatch.delivery.spawn";
}

/// `ErrorCause` 封装底层原因，保持 `Send + Sync` 以方便跨线程传递。
pub type ErrorCause = Box<dyn Error + Send + Sync + 'static>;

/// `NavError` 是跨层共享的稳定错误域，是所有可观察错误的最终形态。
///
/// # 设计背景（Why）
/// - 调度层、解码层与引擎桥接层在不同位置产生的故障需要合流为统一错误码，
///   否则上层无法针对「无数据」「解码失败」「引擎失败」做出差异化处理；
/// - 结构体以 Builder 风格方法叠加上下文（底层原因），并通过 `source()` 暴露完整链路。
///
/// # 契约说明（What）
/// - **前置条件**：调用方必须使用 [`codes`] 模块或遵循 `<域>.<语义>` 约定的自定义码值；
/// - **返回值**：构造函数返回拥有所有权的 `NavError`，可安全跨线程移动（`Send + Sync + 'static`）；
/// - **后置条件**：除非显式调用 `with_cause`，错误不会携带底层原因。
///
/// # 设计取舍（Trade-offs）
/// - 采用 `Cow<'static, str>` 保存消息，静态文案零分配，动态文案按需分配。
#[derive(Debug)]
pub struct NavError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<ErrorCause>,
}

impl NavError {
    /// 使用稳定错误码与消息创建 `NavError`。
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// 附带底层原因并返回新的错误实例。
    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 为现有错误设置底层原因。
    pub fn set_cause(&mut self, cause: impl Error + Send + Sync + 'static) {
        self.cause = Some(Box::new(cause));
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取人类可读描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取底层原因。
    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for NavError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("inner failure")
        }
    }

    impl Error for Inner {}

    #[test]
    fn display_renders_code_and_message() {
        let err = NavError::new(codes::RESPONSE_NO_DATA, "payload missing");
        assert_eq!(
            alloc::format!("{err}"),
            "[dispatch.response.no_data] payload missing"
        );
    }

    #[test]
    fn cause_is_reachable_via_source() {
        let err = NavError::new(codes::ENGINE_FAILURE, "engine unreachable").with_cause(Inner);
        let source = err.source().expect("cause should be present");
        assert_eq!(alloc::format!("{source}"), "inner failure");
    }
}
