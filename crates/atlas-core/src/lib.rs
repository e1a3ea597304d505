#![cfg_attr(not(feature = "std"), no_std)]
#![doc = "atlas-core: 导航路由请求编排的核心契约。"]
#![doc = ""]
#![doc = "该 Crate 仅定义稳定接口：不包含任何调度实现，也不链接原生引擎。"]
#![doc = "对应的生命周期编排实现位于 `atlas-dispatch`。"]

extern crate alloc;

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod observability;
pub mod options;
pub mod response;

pub use config::{Credentials, EngineConfig};
pub use context::{CompletionContext, CompletionTask, InlineContext};
pub use engine::{
    EngineCallback, EngineFailure, EngineProfile, EngineProvider, EngineReply, EngineSource,
    RefreshRequest, RequestId, RoutingEngine,
};
pub use error::{ErrorCause, NavError};
pub use observability::{LogRecord, LogSeverity, Logger, NoopLogger};
pub use options::{
    Coordinate, DirectionsOptions, DirectionsSession, MatchOptions, RequestKind, RouteOptions,
    RoutingSource,
};
pub use response::{
    IndexedRouteResponse, MatchResponse, RefreshedRouteResponse, Route, RouteLeg, RouteResponse,
};

use core::fmt;

/// `atlas-core` 中所有错误必须实现的 `no_std` 基础 Trait。
///
/// # 设计背景（Why）
/// - `std::error::Error` 在 `no_std` 环境中不可用，因此需要一个对象安全、与平台无关的
///   错误抽象来串联底层错误链。
/// - 该 Trait 是错误类型的最小公共接口，帮助在 `alloc` 场景下完成跨模块错误传递。
///
/// # 契约说明（What）
/// - **前置条件**：实现类型需为 `'static` 生命周期，若要装入 [`ErrorCause`] 还需 `Send + Sync`；
/// - **后置条件**：`source` 返回的引用生命周期受限于 `self`，防止悬垂引用；
///   若底层错误不提供来源，错误链在此终止，属于允许的边界情况。
pub trait Error: fmt::Debug + fmt::Display {
    /// 返回链路上的上游错误，语义与 `std::error::Error::source` 一致。
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

#[cfg(feature = "std")]
impl Error for std::io::Error {}

/// 统一的结果别名，默认错误域为 [`NavError`]。
pub type Result<T, E = NavError> = core::result::Result<T, E>;
