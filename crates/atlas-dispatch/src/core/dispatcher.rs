//! # RouteDispatcher：请求编排枢纽
//!
//! ## 核心意图（Why）
//! - 把「发起、登记、认领、交付、取消」收敛到单一枢纽：调用方同步拿到请求标识即可
//!   随时取消，真正的计算在引擎侧异步完成；
//! - 完成回调与取消操作之间的竞态由登记表的原子认领裁决，先到者胜出，
//!   败者的动作退化为无操作；迟到的完成回调因找不到条目而被静默丢弃。
//!
//! ## 并发纪律（What）
//! - 发起护栏（单把互斥锁）覆盖「引擎受理 + 登记写入」与「认领移除」，
//!   保证回调永远不会观察到「标识已分配、条目未写入」的窗口；
//! - 护栏绝不跨越解码、引擎 I/O 或调用方回调；这些工作全部发生在锁外；
//! - 交付统一走注入的完成上下文，调用方回调因此单线程、按交付顺序到达。
//!
//! ## 生命周期（Where）
//! - 每个在途条目持有枢纽的强引用；外部句柄全部释放后，枢纽仍会存活到
//!   最后一个条目被完成或取消认领为止，悬挂回调不会落入已释放的枢纽。

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use atlas_core::config::{Credentials, EngineConfig};
use atlas_core::context::CompletionContext;
use atlas_core::engine::{
    EngineCallback, EngineProvider, EngineReply, RefreshRequest, RequestId, RoutingEngine,
};
use atlas_core::error::NavError;
use atlas_core::observability::{LogRecord, LogSeverity, Logger, NoopLogger};
use atlas_core::options::{
    DirectionsOptions, DirectionsSession, MatchOptions, RequestKind, RouteOptions,
};
use atlas_core::response::{
    IndexedRouteResponse, MatchResponse, RefreshedRouteResponse, RouteResponse,
};

use crate::codec::{DecodeContext, RefreshContext, ResponsePayload, decode_reply};
use crate::core::registry::RequestRegistry;
use crate::core::request::{PendingRequest, RequestPhase};
use crate::error::DispatchError;
use crate::profile::{engine_profile, engine_source};

const LOG_TARGET: &str = "atlas::dispatch";

/// 完成回调的统一形态：`(会话上下文, 类型化结果)`。
pub type CompletionHandler<T> =
    Box<dyn FnOnce(DirectionsSession, Result<T, DispatchError>) + Send + 'static>;

/// 路线请求（含刷新）的完成回调。
pub type RouteHandler = CompletionHandler<RouteResponse>;

/// 地图匹配请求的完成回调。
pub type MatchHandler = CompletionHandler<MatchResponse>;

/// 刷新路径上随回调携带的定位信息。
struct RefreshSeed {
    uuid: String,
    route_index: u32,
    leg_index: u32,
}

/// 枢纽的共享内核：引擎句柄、登记表与投递上下文。
///
/// - **契约 (What)**：登记表是唯一的共享可变状态，由本类型独占修改；
/// - **风险 (Trade-offs)**：在途条目持有 `Arc<DispatcherCore>`，与内部登记表构成
///   有意的引用环；依赖条目必然被认领移除来断开。
pub(crate) struct DispatcherCore {
    engine: Arc<dyn RoutingEngine>,
    credentials: Credentials,
    registry: RequestRegistry,
    issue_guard: Mutex<()>,
    completion: Arc<dyn CompletionContext>,
    logger: Arc<dyn Logger>,
}

impl DispatcherCore {
    pub(crate) fn new(
        engine: Arc<dyn RoutingEngine>,
        credentials: Credentials,
        completion: Arc<dyn CompletionContext>,
        logger: Arc<dyn Logger>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            credentials,
            registry: RequestRegistry::new(),
            issue_guard: Mutex::new(()),
            completion,
            logger,
        })
    }

    /// 懒构造消息的日志出口：级别被过滤时不产生任何分配。
    fn emit(&self, severity: LogSeverity, message: impl FnOnce() -> String) {
        if self.logger.enabled(severity) {
            self.logger
                .log(&LogRecord::new(severity, LOG_TARGET, message()));
        }
    }
}

/// 面向调用方的调度枢纽句柄。
///
/// # 教案式说明
/// - **意图 (Why)**：三类请求共用一套发起/认领骨架，句柄可 `Clone` 后跨线程共享；
/// - **契约 (What)**：
///   - `request_route` / `request_map_match` / `refresh_route` 同步返回引擎分配的标识，
///     每个请求至多产生一次完成交付；
///   - `cancel` 对未知或已终结的标识是完全的无操作；
///   - **后置条件**：完成回调固定在注入的完成上下文上执行。
#[derive(Clone)]
pub struct RouteDispatcher {
    core: Arc<DispatcherCore>,
}

impl RouteDispatcher {
    /// 以现成的引擎实例构造调度枢纽，日志默认关闭。
    #[must_use]
    pub fn new(
        engine: Arc<dyn RoutingEngine>,
        credentials: Credentials,
        completion: Arc<dyn CompletionContext>,
    ) -> Self {
        Self::with_logger(engine, credentials, completion, Arc::new(NoopLogger))
    }

    /// 以现成的引擎实例构造调度枢纽，并注入日志后端。
    #[must_use]
    pub fn with_logger(
        engine: Arc<dyn RoutingEngine>,
        credentials: Credentials,
        completion: Arc<dyn CompletionContext>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            core: DispatcherCore::new(engine, credentials, completion, logger),
        }
    }

    /// 经装配流程构造调度枢纽：先建缓存，再建引擎，两步各执行一次。
    ///
    /// # 教案式注释
    /// - **契约 (What)**：
    ///   - `config`：装配配置，其中的逻辑数据来源在此映射为引擎档位；
    ///   - `recorder`：可选的行驶历史记录器；
    ///   - **错误**：装配失败以稳定错误码（`engine.build.*`）上报，枢纽不会半初始化。
    pub fn from_provider<P: EngineProvider>(
        provider: &P,
        config: &EngineConfig,
        recorder: Option<P::Recorder>,
        completion: Arc<dyn CompletionContext>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, NavError> {
        let cache = provider.build_cache(config)?;
        let engine = provider.build_engine(engine_source(config.source), cache, recorder)?;
        Ok(Self::with_logger(
            Arc::new(engine),
            config.credentials.clone(),
            completion,
            logger,
        ))
    }

    /// 发起路线计算请求。
    ///
    /// # 教案式注释
    /// - **契约 (What)**：
    ///   - `options`：类型化路线选项，请求发出后原样嵌入会话与响应；
    ///   - 返回值：引擎分配的请求标识，可立即用于 [`cancel`](Self::cancel)；
    ///   - **后置条件**：除非先被取消，`handler` 恰好被调用一次。
    pub fn request_route(&self, options: RouteOptions, handler: RouteHandler) -> RequestId {
        let uri = options.request_uri(&self.core.credentials);
        let session = DirectionsSession {
            options: DirectionsOptions::Route(Arc::new(options)),
            credentials: self.core.credentials.clone(),
        };
        self.issue::<RouteResponse, _>(RequestKind::Route, session, None, handler, |engine, callback| {
            engine.issue_directions(&uri, callback)
        })
    }

    /// 发起地图匹配请求，协议与路线请求一致，解码形态不同。
    pub fn request_map_match(&self, options: MatchOptions, handler: MatchHandler) -> RequestId {
        let uri = options.request_uri(&self.core.credentials);
        let session = DirectionsSession {
            options: DirectionsOptions::Match(Arc::new(options)),
            credentials: self.core.credentials.clone(),
        };
        self.issue::<MatchResponse, _>(
            RequestKind::MapMatch,
            session,
            None,
            handler,
            |engine, callback| engine.issue_directions(&uri, callback),
        )
    }

    /// 发起路线刷新请求。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：为已算出的路线拉取在途路况更新；交付物是一份完整路线响应，
    ///   会话上下文沿用原路线选项；
    /// - **契约 (What)**：
    ///   - `indexed`：携带选中下标的原响应；`from_leg_index`：刷新起始腿；
    ///   - **前置条件（违反即 panic，不发起任何引擎调用）**：
    ///     原响应必须出身于路线请求（地图匹配转换的响应不具备刷新资格）、
    ///     必须携带非空的服务端响应标识、选中下标必须落在路线集合内；
    ///   - **后置条件**：与其余请求相同的至多一次交付语义。
    /// - **风险 (Trade-offs)**：前置条件违规属于调用方缺陷，立即终止优于
    ///   以错误形式扩散到异步链路。
    pub fn refresh_route(
        &self,
        indexed: &IndexedRouteResponse,
        from_leg_index: u32,
        handler: RouteHandler,
    ) -> RequestId {
        let response = indexed.response();
        if response.origin() != RequestKind::Route {
            panic!(
                "route refresh requires a directions-originated response, got {}",
                response.origin()
            );
        }
        let uuid = match response.uuid() {
            Some(uuid) if !uuid.is_empty() => String::from(uuid),
            _ => panic!("route refresh requires a server-assigned response identifier"),
        };
        let route = indexed.selected_route().unwrap_or_else(|| {
            panic!(
                "route index {} is out of bounds ({} routes present)",
                indexed.route_index(),
                response.routes().len()
            )
        });
        let options = match response.options() {
            DirectionsOptions::Route(options) => Arc::clone(options),
            DirectionsOptions::Match(_) => {
                panic!("route refresh requires a directions-originated response, got map-match")
            }
        };
        let route_json = serde_json::to_string(route)
            .unwrap_or_else(|err| panic!("selected route is not serializable: {err}"));

        let session = DirectionsSession {
            options: DirectionsOptions::Route(Arc::clone(&options)),
            credentials: response.credentials().clone(),
        };
        let seed = RefreshSeed {
            uuid,
            route_index: indexed.route_index(),
            leg_index: from_leg_index,
        };
        let profile = engine_profile(&options.profile_identifier);

        let unwrap_handler: CompletionHandler<RefreshedRouteResponse> =
            Box::new(move |session, result| {
                handler(session, result.map(RefreshedRouteResponse::into_inner));
            });

        let request_uuid = seed.uuid.clone();
        let route_index = seed.route_index;
        self.issue::<RefreshedRouteResponse, _>(
            RequestKind::RouteRefresh,
            session,
            Some(seed),
            unwrap_handler,
            move |engine, callback| {
                engine.issue_refresh(
                    RefreshRequest {
                        uuid: &request_uuid,
                        route_index,
                        leg_index: from_leg_index,
                        profile,
                        route_json: &route_json,
                    },
                    callback,
                )
            },
        )
    }

    /// 取消在途请求。
    ///
    /// # 教案式注释
    /// - **契约 (What)**：
    ///   - 认领成功：通知引擎中止，并保证调用方回调不会再被触发；
    ///   - 认领失败（已完成、已取消或标识未知）：完全的无操作，不通知引擎、不报错；
    ///   - 引擎中止是尽力而为的信号，已在途的回调由认领机制丢弃。
    pub fn cancel(&self, id: RequestId) {
        let claimed = {
            let _guard = self.core.issue_guard.lock();
            self.core.registry.remove(id)
        };
        let Some(mut pending) = claimed else {
            self.core.emit(LogSeverity::Debug, || {
                format!("cancel for request {id} ignored: not pending")
            });
            return;
        };
        if let Err(err) = pending.transition(RequestPhase::Cancelled) {
            self.core
                .emit(LogSeverity::Error, || format!("cancel finalize failed: {err}"));
        }
        drop(pending);
        self.core.engine.cancel(id);
        self.core
            .emit(LogSeverity::Debug, || format!("request {id} cancelled"));
    }

    /// 登记表的只读视图，供诊断与测试观察在途请求。
    #[must_use]
    pub fn registry(&self) -> &RequestRegistry {
        &self.core.registry
    }

    /// 构造时注入的凭据。
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.core.credentials
    }

    /// 发起/认领骨架：三类请求的公共路径。
    ///
    /// 发起护栏覆盖「引擎受理 + 标识落袋 + 登记写入」；回调侧先取护栏再认领，
    /// 因此绝不会观察到标识已分配而条目缺失的中间态。解码与交付都在锁外执行。
    fn issue<T, F>(
        &self,
        kind: RequestKind,
        session: DirectionsSession,
        refresh: Option<RefreshSeed>,
        handler: CompletionHandler<T>,
        issue_with: F,
    ) -> RequestId
    where
        T: ResponsePayload,
        F: FnOnce(&dyn RoutingEngine, EngineCallback) -> RequestId,
    {
        let core = Arc::clone(&self.core);
        let slot: Arc<OnceLock<RequestId>> = Arc::new(OnceLock::new());

        let callback: EngineCallback = {
            let weak: Weak<DispatcherCore> = Arc::downgrade(&core);
            let slot = Arc::clone(&slot);
            Box::new(move |reply: EngineReply| {
                let Some(core) = weak.upgrade() else {
                    // 条目已被取消且枢纽整体释放；迟到的回执无处交付。
                    return;
                };
                let claimed = {
                    let _guard = core.issue_guard.lock();
                    slot.get().copied().and_then(|id| core.registry.remove(id))
                };
                let Some(mut pending) = claimed else {
                    core.emit(LogSeverity::Debug, || {
                        match slot.get() {
                            Some(id) => format!("late completion for request {id} discarded"),
                            None => String::from("completion before issuance recorded; discarded"),
                        }
                    });
                    return;
                };
                let id = pending.id();
                if let Err(err) = pending.transition(RequestPhase::Completed) {
                    core.emit(LogSeverity::Error, || {
                        format!("completion finalize failed: {err}")
                    });
                }
                drop(pending);

                let result = {
                    let ctx = match &refresh {
                        Some(seed) => DecodeContext::new(&session).with_refresh(RefreshContext {
                            uuid: &seed.uuid,
                            route_index: seed.route_index,
                            leg_index: seed.leg_index,
                        }),
                        None => DecodeContext::new(&session),
                    };
                    decode_reply::<T>(reply, &ctx)
                };
                match &result {
                    Ok(_) => core.emit(LogSeverity::Debug, || format!("request {id} completed")),
                    Err(err) => {
                        core.emit(LogSeverity::Warn, || format!("request {id} failed: {err}"));
                    }
                }
                core.completion
                    .dispatch(Box::new(move || handler(session, result)));
            })
        };

        let id = {
            let _guard = core.issue_guard.lock();
            let id = issue_with(core.engine.as_ref(), callback);
            let _ = slot.set(id);
            if let Err(err) = core
                .registry
                .register(PendingRequest::new(id, kind, Arc::clone(&core)))
            {
                // 引擎违反了「悬挂期间标识唯一」契约；保留旧条目并留下证据。
                core.emit(LogSeverity::Error, || {
                    format!("registration failed for {kind} request: {err}")
                });
            }
            id
        };
        core.emit(LogSeverity::Debug, || format!("{kind} request {id} issued"));
        id
    }
}

impl fmt::Debug for RouteDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDispatcher")
            .field("pending", &self.core.registry.len())
            .finish_non_exhaustive()
    }
}
