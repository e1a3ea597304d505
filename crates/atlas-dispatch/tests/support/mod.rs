//! 集成测试共用设施：引擎替身与便捷构造器。
//!
//! `MockEngine` 记录每一次发起与取消，并把完成回调交由测试显式触发，
//! 以便精确编排完成与取消之间的竞态。回调可从任意测试线程触发，
//! 与真实引擎的多线程回调模型一致。

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use atlas_core::config::Credentials;
use atlas_core::context::InlineContext;
use atlas_core::engine::{
    EngineCallback, EngineProfile, EngineReply, RefreshRequest, RequestId, RoutingEngine,
};
use atlas_core::options::{Coordinate, DirectionsSession, MatchOptions, RouteOptions};
use atlas_dispatch::{CompletionHandler, DispatchError, RouteDispatcher};

/// 一次路线刷新发起的完整留痕。
#[derive(Clone, Debug)]
pub struct RecordedRefresh {
    pub uuid: String,
    pub route_index: u32,
    pub leg_index: u32,
    pub profile: EngineProfile,
    pub route_json: String,
}

/// 记录式引擎替身：同步受理、手动回执。
pub struct MockEngine {
    next_id: AtomicU64,
    callbacks: Mutex<HashMap<u64, EngineCallback>>,
    directions: Mutex<Vec<String>>,
    refreshes: Mutex<Vec<RecordedRefresh>>,
    cancelled: Mutex<Vec<RequestId>>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Self::with_first_id(1)
    }

    /// 指定首个分配的标识，便于测试断言具体数值。
    pub fn with_first_id(first: u64) -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(first),
            callbacks: Mutex::new(HashMap::new()),
            directions: Mutex::new(Vec::new()),
            refreshes: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        })
    }

    /// 触发指定请求的完成回调；回调在当前线程执行。
    ///
    /// 返回 `false` 表示该标识从未受理或回调已被触发过。
    /// 取消不会移除回调：真实引擎的中止是尽力而为，完成可能已在途，
    /// 测试正是以此模拟「取消后迟到的回执」。
    pub fn complete(&self, id: RequestId, reply: EngineReply) -> bool {
        let callback = self.callbacks.lock().remove(&id.value());
        match callback {
            Some(callback) => {
                callback(reply);
                true
            }
            None => false,
        }
    }

    pub fn issued_directions(&self) -> Vec<String> {
        self.directions.lock().clone()
    }

    pub fn issued_refreshes(&self) -> Vec<RecordedRefresh> {
        self.refreshes.lock().clone()
    }

    pub fn cancelled(&self) -> Vec<RequestId> {
        self.cancelled.lock().clone()
    }

    pub fn pending_callbacks(&self) -> usize {
        self.callbacks.lock().len()
    }
}

impl RoutingEngine for MockEngine {
    fn issue_directions(&self, uri: &str, on_complete: EngineCallback) -> RequestId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.directions.lock().push(String::from(uri));
        self.callbacks.lock().insert(id, on_complete);
        RequestId::new(id)
    }

    fn issue_refresh(&self, request: RefreshRequest<'_>, on_complete: EngineCallback) -> RequestId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.refreshes.lock().push(RecordedRefresh {
            uuid: String::from(request.uuid),
            route_index: request.route_index,
            leg_index: request.leg_index,
            profile: request.profile,
            route_json: String::from(request.route_json),
        });
        self.callbacks.lock().insert(id, on_complete);
        RequestId::new(id)
    }

    fn cancel(&self, id: RequestId) {
        self.cancelled.lock().push(id);
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("token-it", "https://api.example.com")
}

pub fn route_options() -> RouteOptions {
    RouteOptions::new(
        vec![Coordinate::new(13.38, 52.51), Coordinate::new(13.4, 52.52)],
        "driving-traffic",
    )
}

pub fn match_options() -> MatchOptions {
    MatchOptions::new(
        vec![Coordinate::new(13.38, 52.51), Coordinate::new(13.39, 52.515)],
        "walking",
    )
}

/// 以同步投递上下文构造调度枢纽，使测试断言无需等待。
pub fn dispatcher(engine: &Arc<MockEngine>) -> RouteDispatcher {
    RouteDispatcher::new(
        Arc::clone(engine) as Arc<dyn RoutingEngine>,
        credentials(),
        Arc::new(InlineContext),
    )
}

/// 捕获式完成回调：返回存储与可注入的回调闭包。
pub type CapturedOutcomes<T> = Arc<Mutex<Vec<(DirectionsSession, Result<T, DispatchError>)>>>;

pub fn capture<T: Send + 'static>() -> (CapturedOutcomes<T>, CompletionHandler<T>) {
    let store: CapturedOutcomes<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&store);
    let handler: CompletionHandler<T> = Box::new(move |session, result| {
        sink.lock().push((session, result));
    });
    (store, handler)
}

pub const ROUTE_PAYLOAD: &str = r#"{
    "uuid": "resp-123",
    "routes": [
        {
            "distance": 1204.5,
            "duration": 301.0,
            "geometry": "abc",
            "legs": [{"distance": 1204.5, "duration": 301.0, "summary": "Unter den Linden"}]
        }
    ]
}"#;

pub const MATCH_PAYLOAD: &str = r#"{
    "matchings": [
        {"distance": 88.0, "duration": 64.2, "legs": []}
    ]
}"#;

pub const REFRESH_PAYLOAD: &str = r#"{
    "route": {"distance": 1100.0, "duration": 280.0, "legs": []}
}"#;
