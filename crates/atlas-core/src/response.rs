//! 类型化响应模型。
//!
//! 三种响应形态（路线、地图匹配、刷新后的路线）在解码成功后都会嵌入
//! 发起请求时的会话上下文（选项与凭据），下游消费者无需再次补齐。
//! 响应一经构造即不可变；不存在「部分填充」的中间形态。

use alloc::{string::String, sync::Arc, vec::Vec};

use serde::{Deserialize, Serialize};

use crate::config::Credentials;
use crate::options::{DirectionsOptions, MatchOptions, RequestKind};

/// 单条路线的一段行程（相邻两个途经点之间）。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RouteLeg {
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub summary: Option<String>,
}

/// 引擎计算出的单条路线。
///
/// `geometry` 为引擎的折线编码文本，本层不解析其内容。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Route {
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub geometry: Option<String>,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// 路线响应。
///
/// # 教案式说明
/// - **意图 (Why)**：除路线本体外，响应还要记住自己的「出身」：
///   来源请求种类与服务端响应标识共同决定其是否具备刷新资格；
/// - **契约 (What)**：
///   - `origin`：产生该响应的请求种类（路线或地图匹配）；
///   - `uuid`：服务端分配的响应标识，离线计算的响应不携带；
///   - `options` / `credentials`：发起请求时的会话上下文，原样嵌入；
/// - **风险 (Trade-offs)**：字段私有并只读，构造后不可再变；
///   需要派生新响应时（如刷新），由调度层重新构造。
#[derive(Clone, Debug)]
pub struct RouteResponse {
    origin: RequestKind,
    uuid: Option<String>,
    routes: Vec<Route>,
    options: DirectionsOptions,
    credentials: Credentials,
}

impl RouteResponse {
    /// 构造响应实例，仅供解码层与调度层使用。
    #[must_use]
    pub fn new(
        origin: RequestKind,
        uuid: Option<String>,
        routes: Vec<Route>,
        options: DirectionsOptions,
        credentials: Credentials,
    ) -> Self {
        Self {
            origin,
            uuid,
            routes,
            options,
            credentials,
        }
    }

    /// 产生该响应的请求种类。
    #[must_use]
    pub fn origin(&self) -> RequestKind {
        self.origin
    }

    /// 服务端分配的响应标识。
    #[must_use]
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// 路线集合，首条为推荐路线。
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// 发起请求时的选项。
    #[must_use]
    pub fn options(&self) -> &DirectionsOptions {
        &self.options
    }

    /// 发起请求时的凭据。
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// 地图匹配响应。
///
/// 匹配产物在结构上与路线一致（`matchings` 即吸附到路网后的行程），
/// 可通过 [`into_route_response`](Self::into_route_response) 转换为路线响应复用导航链路；
/// 转换结果保留地图匹配出身，因此不具备刷新资格。
#[derive(Clone, Debug)]
pub struct MatchResponse {
    matchings: Vec<Route>,
    options: Arc<MatchOptions>,
    credentials: Credentials,
}

impl MatchResponse {
    /// 构造响应实例，仅供解码层使用。
    #[must_use]
    pub fn new(
        matchings: Vec<Route>,
        options: Arc<MatchOptions>,
        credentials: Credentials,
    ) -> Self {
        Self {
            matchings,
            options,
            credentials,
        }
    }

    /// 匹配行程集合。
    #[must_use]
    pub fn matchings(&self) -> &[Route] {
        &self.matchings
    }

    /// 发起请求时的选项。
    #[must_use]
    pub fn options(&self) -> &Arc<MatchOptions> {
        &self.options
    }

    /// 发起请求时的凭据。
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// 转换为路线响应，出身保持为地图匹配。
    #[must_use]
    pub fn into_route_response(self) -> RouteResponse {
        RouteResponse::new(
            RequestKind::MapMatch,
            None,
            self.matchings,
            DirectionsOptions::Match(self.options),
            self.credentials,
        )
    }
}

/// 刷新解码形态：内部是一份完整的路线响应，而非增量补丁。
#[derive(Clone, Debug)]
pub struct RefreshedRouteResponse(RouteResponse);

impl RefreshedRouteResponse {
    /// 包装刷新产物。
    #[must_use]
    pub fn new(response: RouteResponse) -> Self {
        Self(response)
    }

    /// 取出完整的路线响应。
    #[must_use]
    pub fn into_inner(self) -> RouteResponse {
        self.0
    }
}

/// 带选中下标的路线响应，是发起刷新的输入。
#[derive(Clone, Debug)]
pub struct IndexedRouteResponse {
    response: RouteResponse,
    route_index: u32,
}

impl IndexedRouteResponse {
    /// 绑定响应与选中路线下标。
    #[must_use]
    pub fn new(response: RouteResponse, route_index: u32) -> Self {
        Self {
            response,
            route_index,
        }
    }

    /// 底层响应。
    #[must_use]
    pub fn response(&self) -> &RouteResponse {
        &self.response
    }

    /// 选中路线下标。
    #[must_use]
    pub fn route_index(&self) -> u32 {
        self.route_index
    }

    /// 选中的路线；下标越界时返回 `None`。
    #[must_use]
    pub fn selected_route(&self) -> Option<&Route> {
        self.response.routes().get(self.route_index as usize)
    }
}
