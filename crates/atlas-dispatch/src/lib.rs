//! # atlas-dispatch
//!
//! ## 定位与职责（Why）
//! - 作为闭源导航引擎之上的异步请求编排层，负责路线计算、地图匹配与路线刷新三类
//!   请求的发起、在途登记、响应解码与安全取消；引擎回调来自任意线程，
//!   本层保证每个请求至多产生一次对调用方可见的终态；
//! - 通过把「标识 → 在途请求」的登记与回调认领集中在单一枢纽中，
//!   上层业务无需自行处理完成与取消之间的竞态。
//!
//! ## 架构嵌入（Where）
//! - `core` 模块承载登记表、请求状态机、调度枢纽与串行投递队列；
//! - `codec` 模块将引擎的不透明文本载荷解码为 `atlas-core` 的类型化响应；
//! - `profile` 模块提供逻辑档位到引擎档位的纯映射；
//! - `error` 模块集中定义错误类型，统一向外暴露 `thiserror` 风格的诊断信息。
//!
//! ## Feature 策略（Trade-offs）
//! - 本 crate 依赖线程与并发容器，仅提供 `std` 形态；
//!   契约层 `atlas-core` 保持 `no_std + alloc` 兼容，受限运行时可单独复用契约。

#[cfg(not(feature = "std"))]
compile_error!("atlas-dispatch 依赖线程与并发容器：请启用默认的 `std` 特性。");

/// 响应载荷解码：统一的空载荷/畸形载荷策略与三种解码形态。
///
/// - **意图说明 (Why)**：三种响应共用同一套失败归类，杜绝某一形态获得特殊宽容；
/// - **契约定位 (What)**：形态选择发生在编译期（`ResponsePayload::KIND`），
///   不依赖运行期类型探测。
pub mod codec;

/// 请求生命周期编排的核心入口。
///
/// - **意图说明 (Why)**：集中处理请求的发起、认领、终态交付与登记回收；
/// - **契约定位 (What)**：对外暴露 [`RouteDispatcher`](core::dispatcher::RouteDispatcher)
///   作为唯一的登记表修改者；
/// - **扩展指引 (How)**：新的请求种类应复用发起/认领骨架，仅扩展解码形态与引擎入口。
pub mod core;

/// 错误类型与诊断信息集中声明处。
///
/// - **意图说明 (Why)**：统一描述编排层可能出现的可恢复失败；
/// - **契约定位 (What)**：使用 `thiserror::Error` 派生，并经 `From` 转换为
///   `atlas_core::NavError` 的稳定错误码表示。
pub mod error;

/// 逻辑档位到引擎档位的纯映射函数。
pub mod profile;

pub use codec::{DecodeContext, RefreshContext, ResponsePayload, decode_payload, decode_reply};
pub use crate::core::delivery::SerialDeliveryQueue;
pub use crate::core::dispatcher::{CompletionHandler, MatchHandler, RouteDispatcher, RouteHandler};
pub use crate::core::registry::{RequestRegistry, RequestSnapshot};
pub use crate::core::request::RequestPhase;
pub use error::DispatchError;
pub use profile::{engine_profile, engine_source};
