//! # 引擎契约（RoutingEngine）
//!
//! ## 核心意图（Why）
//! - 路由计算与离线缓存由闭源原生引擎承担，本模块只固化一条「窄接口」：
//!   发起请求、发起路线刷新、按标识取消。参考 Valhalla/OSRM 等引擎绑定层的通行做法，
//!   接口以不透明文本载荷交换数据，调度层不理解其内部格式；
//! - 回调式交付贴合原生引擎的线程模型：完成通知由引擎线程池异步发起，
//!   调度层必须假设回调可能与取消操作并发到达。
//!
//! ## 行为契约（What）
//! - `issue_*` 必须同步返回引擎分配的 [`RequestId`]，且该标识在请求悬挂期间唯一、不复用；
//! - 完成回调 **禁止** 在 `issue_*` 的调用栈内同步触发，必须异步投递；
//! - `cancel` 是尽力而为的信号：已在途的完成回调仍可能到达，由调度层负责丢弃。
//!
//! ## 风险提示（Trade-offs）
//! - 接口未规定回调线程的数量与顺序；实现方若复用单线程回调队列，需自行保证不阻塞引擎。

use alloc::{boxed::Box, string::String};
use core::fmt;

use crate::config::EngineConfig;
use crate::error::NavError;

/// 引擎为每个在途请求分配的不透明句柄。
///
/// # 契约说明
/// - 在请求悬挂期间于单个引擎实例内唯一；完成或取消后允许复用；
/// - 满足 `Copy + Eq + Hash + Ord`，可直接作为并发表键或排序依据。
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RequestId(u64);

impl RequestId {
    /// 由原始数值构造句柄，仅供引擎实现与测试使用。
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// 返回底层数值。
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 引擎侧的数据来源档位，与逻辑档位 [`RoutingSource`](crate::options::RoutingSource) 一一对应。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EngineSource {
    /// 仅访问在线服务。
    Online,
    /// 仅使用本地瓦片数据。
    Offline,
    /// 优先在线，失败时回退本地数据。
    Hybrid,
}

/// 引擎侧的出行模式档位。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EngineProfile {
    Driving,
    DrivingTraffic,
    Cycling,
    Walking,
}

/// 引擎上报的失败诊断，原样透传给调用方。
///
/// - **契约 (What)**：`code` 为引擎自定义的数值码（可缺省）；`message` 为诊断文本；
/// - **风险 (Trade-offs)**：本层不解释码值语义，差异化重试策略应由上层依据码值实现。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineFailure {
    pub code: Option<i64>,
    pub message: String,
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "engine failure (code {code}): {}", self.message),
            None => write!(f, "engine failure: {}", self.message),
        }
    }
}

/// 单次请求的终态回执。
///
/// # 契约说明（What）
/// - `Success(None)` 与 `Success(Some(""))` 均表示「无数据」，由解码层统一归类；
/// - `Failure` 携带引擎诊断信息，不可与载荷同时出现；
/// - 每个请求至多产生一次回执。
#[derive(Clone, Debug)]
pub enum EngineReply {
    /// 请求正常结束，载荷为引擎序列化格式的不透明文本。
    Success(Option<String>),
    /// 请求失败，携带引擎诊断。
    Failure(EngineFailure),
}

/// 完成回调：由引擎在任意线程异步触发，至多一次。
pub type EngineCallback = Box<dyn FnOnce(EngineReply) + Send + 'static>;

/// 路线刷新请求的参数视图。
///
/// - **契约 (What)**：`uuid` 为服务端分配的原响应标识；`route_json` 为选中路线的
///   引擎序列化文本；索引字段定位原响应中的路线与腿；
/// - 借用形式避免在发起路径上产生额外拷贝。
#[derive(Clone, Copy, Debug)]
pub struct RefreshRequest<'a> {
    pub uuid: &'a str,
    pub route_index: u32,
    pub leg_index: u32,
    pub profile: EngineProfile,
    pub route_json: &'a str,
}

/// `RoutingEngine` 定义调度层可见的全部引擎能力。
///
/// # 教案式说明
/// - **意图 (Why)**：将闭源引擎收敛为三个方法的窄接口，调度层与测试替身共用同一契约；
/// - **契约 (What)**：
///   - `issue_directions`：按请求 URI 发起路线/地图匹配计算，同步返回标识；
///   - `issue_refresh`：携带原响应标识发起在途路况刷新，同步返回标识；
///   - `cancel`：请求引擎中止指定标识，尽力而为，不保证回调不再到达；
///   - **前置条件**：`issue_*` 返回前不得触发对应回调；
///   - **后置条件**：每个已接受的请求最终至多触发一次回调。
/// - **风险 (Trade-offs)**：接口对象安全，可装入 `Arc<dyn RoutingEngine>` 注入调度层；
///   代价是回调必须装箱。
pub trait RoutingEngine: Send + Sync + 'static {
    /// 发起路线或地图匹配请求。
    fn issue_directions(&self, uri: &str, on_complete: EngineCallback) -> RequestId;

    /// 发起路线刷新请求。
    fn issue_refresh(&self, request: RefreshRequest<'_>, on_complete: EngineCallback) -> RequestId;

    /// 请求中止指定标识对应的在途请求。
    fn cancel(&self, id: RequestId);
}

/// `EngineProvider` 描述引擎实例的一次性装配流程。
///
/// # 教案式说明
/// - **意图 (Why)**：原生引擎要求「先建缓存、再建路由器」的两段式装配；
///   以关联类型表达两段产物，避免调度层感知具体引擎类型；
/// - **契约 (What)**：
///   - `build_cache`：按配置构建瓦片缓存，仅在调度器构造时调用一次；
///   - `build_engine`：组合数据来源、缓存与可选的历史记录器，产出引擎实例；
///   - **后置条件**：两个方法的失败均以稳定错误码
///     [`ENGINE_BUILD_CACHE`](crate::error::codes::ENGINE_BUILD_CACHE) /
///     [`ENGINE_BUILD_ROUTER`](crate::error::codes::ENGINE_BUILD_ROUTER) 上报。
/// - **风险 (Trade-offs)**：关联类型牺牲对象安全；需要动态装配时请在宿主侧包一层工厂。
pub trait EngineProvider: Send + Sync {
    /// 瓦片缓存句柄。
    type Cache;
    /// 行驶历史记录器句柄。
    type Recorder;
    /// 装配产物，必须实现 [`RoutingEngine`]。
    type Engine: RoutingEngine;

    /// 按配置构建瓦片缓存。
    fn build_cache(&self, config: &EngineConfig) -> Result<Self::Cache, NavError>;

    /// 组合缓存与历史记录器，构建引擎实例。
    fn build_engine(
        &self,
        source: EngineSource,
        cache: Self::Cache,
        recorder: Option<Self::Recorder>,
    ) -> Result<Self::Engine, NavError>;
}
