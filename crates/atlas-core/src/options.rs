//! 请求选项与会话上下文。
//!
//! 本模块定义调用方提交请求时携带的类型化选项（路线计算与地图匹配两类），
//! 以及贯穿完成回调的会话上下文 [`DirectionsSession`]。
//! URI 拼装仅保留引擎接口所需的最小形态；凭据与基地址的治理不在本层展开。

use alloc::{
    format,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Credentials;

/// WGS84 坐标，经度在前。
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    /// 构造坐标。
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// 以 `经度,纬度` 形式渲染，供 URI 拼装使用。
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

/// 逻辑数据来源档位。
///
/// - **契约 (What)**：三个档位与引擎档位
///   [`EngineSource`](crate::engine::EngineSource) 一一对应，映射函数位于调度层；
/// - 枚举封闭，不存在无法映射的取值。
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingSource {
    Online,
    Offline,
    Hybrid,
}

/// 请求种类标签，贯穿登记表快照、错误上下文与解码形态选择。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RequestKind {
    /// 路线计算请求。
    Route,
    /// 地图匹配请求。
    MapMatch,
    /// 路线刷新请求。
    RouteRefresh,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestKind::Route => "route",
            RequestKind::MapMatch => "map-match",
            RequestKind::RouteRefresh => "route-refresh",
        };
        f.write_str(label)
    }
}

/// 路线计算请求的类型化选项。
///
/// # 教案式说明
/// - **意图 (Why)**：以拥有所有权的结构承载调用方输入，请求发出后原样嵌入响应，
///   下游消费者无需另行保存；
/// - **契约 (What)**：
///   - `waypoints`：至少两个途经点，顺序即行程顺序；
///   - `profile_identifier`：出行模式标识，允许带命名空间前缀（如 `acme/driving-traffic`），
///     无法识别的取值在映射层回退为驾车模式；
///   - `alternatives` / `language`：透传给引擎的可选项。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RouteOptions {
    pub waypoints: Vec<Coordinate>,
    pub profile_identifier: String,
    pub alternatives: bool,
    pub language: Option<String>,
}

impl RouteOptions {
    /// 构造最小选项集。
    #[must_use]
    pub fn new(waypoints: Vec<Coordinate>, profile_identifier: impl Into<String>) -> Self {
        Self {
            waypoints,
            profile_identifier: profile_identifier.into(),
            alternatives: false,
            language: None,
        }
    }

    /// 请求备选路线。
    #[must_use]
    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// 指定指令语言。
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// 拼装引擎可接受的请求 URI。
    #[must_use]
    pub fn request_uri(&self, credentials: &Credentials) -> String {
        let coordinates = self
            .waypoints
            .iter()
            .map(Coordinate::pair)
            .collect::<Vec<_>>()
            .join(";");
        let mut uri = format!(
            "{}/directions/v1/{}/{}?alternatives={}",
            credentials.host, self.profile_identifier, coordinates, self.alternatives
        );
        if let Some(language) = &self.language {
            uri.push_str("&language=");
            uri.push_str(language);
        }
        uri.push_str("&access_token=");
        uri.push_str(&credentials.access_token);
        uri
    }
}

/// 地图匹配请求的类型化选项。
///
/// 与 [`RouteOptions`] 同构，但坐标来自定位轨迹而非途经点，
/// 可附带每个轨迹点的搜索半径。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchOptions {
    pub coordinates: Vec<Coordinate>,
    pub profile_identifier: String,
    pub radiuses: Option<Vec<f64>>,
}

impl MatchOptions {
    /// 构造最小选项集。
    #[must_use]
    pub fn new(coordinates: Vec<Coordinate>, profile_identifier: impl Into<String>) -> Self {
        Self {
            coordinates,
            profile_identifier: profile_identifier.into(),
            radiuses: None,
        }
    }

    /// 指定轨迹点搜索半径。
    #[must_use]
    pub fn with_radiuses(mut self, radiuses: Vec<f64>) -> Self {
        self.radiuses = Some(radiuses);
        self
    }

    /// 拼装引擎可接受的请求 URI。
    #[must_use]
    pub fn request_uri(&self, credentials: &Credentials) -> String {
        let coordinates = self
            .coordinates
            .iter()
            .map(Coordinate::pair)
            .collect::<Vec<_>>()
            .join(";");
        let mut uri = format!(
            "{}/matching/v1/{}/{}?tidy=true",
            credentials.host, self.profile_identifier, coordinates
        );
        if let Some(radiuses) = &self.radiuses {
            let joined = radiuses
                .iter()
                .map(|radius| radius.to_string())
                .collect::<Vec<_>>()
                .join(";");
            uri.push_str("&radiuses=");
            uri.push_str(&joined);
        }
        uri.push_str("&access_token=");
        uri.push_str(&credentials.access_token);
        uri
    }
}

/// 会话携带的选项视图：路线选项或匹配选项二选一。
///
/// - **意图 (Why)**：以 `Arc` 共享选项，使会话上下文、响应与延迟回调可零拷贝持有同一份输入；
/// - **契约 (What)**：`kind` 标识来源请求种类；`profile_identifier` 提供统一访问路径。
#[derive(Clone, Debug)]
pub enum DirectionsOptions {
    Route(Arc<RouteOptions>),
    Match(Arc<MatchOptions>),
}

impl DirectionsOptions {
    /// 选项对应的请求种类。
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            DirectionsOptions::Route(_) => RequestKind::Route,
            DirectionsOptions::Match(_) => RequestKind::MapMatch,
        }
    }

    /// 出行模式标识。
    #[must_use]
    pub fn profile_identifier(&self) -> &str {
        match self {
            DirectionsOptions::Route(options) => &options.profile_identifier,
            DirectionsOptions::Match(options) => &options.profile_identifier,
        }
    }
}

/// 会话上下文：`(选项, 凭据)` 二元组，随完成回调原样交还调用方。
///
/// 调用方以此做请求关联，无需自行维护「标识 → 选项」映射。
#[derive(Clone, Debug)]
pub struct DirectionsSession {
    pub options: DirectionsOptions,
    pub credentials: Credentials,
}
