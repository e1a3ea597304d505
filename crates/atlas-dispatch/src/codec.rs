//! # 响应载荷解码
//!
//! ## 核心意图（Why）
//! - 引擎以不透明文本交付计算结果；本模块将其还原为 `atlas-core` 的类型化响应，
//!   并把发起请求时的会话上下文（选项、凭据、刷新定位信息）嵌入解码产物，
//!   下游消费者拿到响应即拥有完整关联信息；
//! - 三种响应形态（路线、地图匹配、刷新后的路线）共用同一套失败归类：
//!   空载荷一律 [`DispatchError::NoData`]，畸形载荷一律 [`DispatchError::Decode`]，
//!   不存在形态级的特殊宽容。
//!
//! ## 行为契约（What）
//! - 形态选择由 [`ResponsePayload::KIND`] 在编译期固定，调用方的请求种类决定目标类型，
//!   不做运行期类型探测；
//! - 解码失败时绝不产生部分填充的响应；
//! - [`DecodeContext`] 仅在单次解码调用内有效，不做任何持久化。

use atlas_core::config::Credentials;
use atlas_core::engine::EngineReply;
use atlas_core::options::{DirectionsOptions, DirectionsSession, RequestKind};
use atlas_core::response::{
    MatchResponse, RefreshedRouteResponse, Route, RouteResponse,
};
use serde::Deserialize;
use serde::de::Error as _;
use std::sync::Arc;

use crate::error::DispatchError;

/// 刷新请求的定位信息：原响应标识与路线/腿下标。
#[derive(Clone, Copy, Debug)]
pub struct RefreshContext<'a> {
    pub uuid: &'a str,
    pub route_index: u32,
    pub leg_index: u32,
}

/// 单次解码的上下文视图。
///
/// # 教案式说明
/// - **意图 (Why)**：解码产物必须携带会话上下文，统一从此处读取，
///   避免三种形态各自约定参数；
/// - **契约 (What)**：
///   - `session`：发起请求时的选项与凭据；
///   - `refresh`：仅刷新解码需要，由调度层在刷新路径上填充；
///   - **前置条件**：上下文引用必须在 `decode` 返回前保持有效；
///   - **后置条件**：上下文本身无状态，可在多次解码间复用。
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext<'a> {
    session: &'a DirectionsSession,
    refresh: Option<RefreshContext<'a>>,
}

impl<'a> DecodeContext<'a> {
    /// 以会话上下文构建解码上下文。
    #[must_use]
    pub fn new(session: &'a DirectionsSession) -> Self {
        Self {
            session,
            refresh: None,
        }
    }

    /// 附加刷新定位信息。
    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshContext<'a>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// 会话上下文。
    #[must_use]
    pub fn session(&self) -> &'a DirectionsSession {
        self.session
    }

    /// 刷新定位信息。
    #[must_use]
    pub fn refresh(&self) -> Option<RefreshContext<'a>> {
        self.refresh
    }

    fn credentials(&self) -> Credentials {
        self.session.credentials.clone()
    }
}

/// `ResponsePayload` 定义一种可从引擎文本还原的响应形态。
///
/// # 教案式说明
/// - **意图 (Why)**：以关联常量标注形态对应的请求种类，形成「带标签的解码结果」，
///   统一入口 [`decode_reply`] 据此归类失败；
/// - **契约 (What)**：
///   - `decode` 只需处理「载荷存在且非空」的情况，空载荷由入口统一拦截；
///   - 实现必须把 `ctx` 中的会话上下文嵌入产物；
///   - **后置条件**：返回 `Err` 时不得产生任何可观察的部分产物。
pub trait ResponsePayload: Sized + Send + 'static {
    /// 形态对应的请求种类标签。
    const KIND: RequestKind;

    /// 从载荷文本还原响应。
    fn decode(payload: &str, ctx: &DecodeContext<'_>) -> Result<Self, serde_json::Error>;
}

#[derive(Deserialize)]
struct RouteResponseBody {
    #[serde(default)]
    uuid: Option<String>,
    routes: Vec<Route>,
}

impl ResponsePayload for RouteResponse {
    const KIND: RequestKind = RequestKind::Route;

    fn decode(payload: &str, ctx: &DecodeContext<'_>) -> Result<Self, serde_json::Error> {
        let body: RouteResponseBody = serde_json::from_str(payload)?;
        Ok(RouteResponse::new(
            RequestKind::Route,
            body.uuid,
            body.routes,
            ctx.session().options.clone(),
            ctx.credentials(),
        ))
    }
}

#[derive(Deserialize)]
struct MatchResponseBody {
    matchings: Vec<Route>,
}

impl ResponsePayload for MatchResponse {
    const KIND: RequestKind = RequestKind::MapMatch;

    fn decode(payload: &str, ctx: &DecodeContext<'_>) -> Result<Self, serde_json::Error> {
        let body: MatchResponseBody = serde_json::from_str(payload)?;
        let options = match &ctx.session().options {
            DirectionsOptions::Match(options) => Arc::clone(options),
            DirectionsOptions::Route(_) => {
                return Err(serde_json::Error::custom(
                    "map-match decoding requires match options in the session",
                ));
            }
        };
        Ok(MatchResponse::new(body.matchings, options, ctx.credentials()))
    }
}

#[derive(Deserialize)]
struct RefreshResponseBody {
    route: Route,
}

impl ResponsePayload for RefreshedRouteResponse {
    const KIND: RequestKind = RequestKind::RouteRefresh;

    fn decode(payload: &str, ctx: &DecodeContext<'_>) -> Result<Self, serde_json::Error> {
        let body: RefreshResponseBody = serde_json::from_str(payload)?;
        let refresh = ctx.refresh().ok_or_else(|| {
            serde_json::Error::custom("refresh decoding requires the original response context")
        })?;
        Ok(RefreshedRouteResponse::new(RouteResponse::new(
            RequestKind::Route,
            Some(String::from(refresh.uuid)),
            vec![body.route],
            ctx.session().options.clone(),
            ctx.credentials(),
        )))
    }
}

/// 统一的载荷解码入口：空载荷与畸形载荷在此归类。
///
/// - **契约 (What)**：`None`、空串与纯空白串一律视作无数据；
///   其余文本交由形态实现解析，解析失败包装为 [`DispatchError::Decode`]。
pub fn decode_payload<T: ResponsePayload>(
    payload: Option<&str>,
    ctx: &DecodeContext<'_>,
) -> Result<T, DispatchError> {
    let text = match payload {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(DispatchError::NoData { kind: T::KIND }),
    };
    T::decode(text, ctx).map_err(|source| DispatchError::Decode {
        kind: T::KIND,
        source,
    })
}

/// 从引擎回执直达类型化结果：失败回执透传为 [`DispatchError::Engine`]，
/// 成功回执进入统一的载荷解码。
pub fn decode_reply<T: ResponsePayload>(
    reply: EngineReply,
    ctx: &DecodeContext<'_>,
) -> Result<T, DispatchError> {
    match reply {
        EngineReply::Failure(failure) => Err(DispatchError::from(failure)),
        EngineReply::Success(payload) => decode_payload(payload.as_deref(), ctx),
    }
}
