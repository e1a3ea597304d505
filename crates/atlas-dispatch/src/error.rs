//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为编排层对外暴露的错误语义提供集中定义，确保与 `atlas-core::NavError` 对齐；
//! - 归类引擎失败、载荷缺失、解码失败与登记表异常，方便运维与观测。
//!
//! ## 设计要求（What）
//! - 所有可恢复错误都经完成回调交付，绝不跨异步边界抛出；
//! - 细粒度枚举支撑精确的告警与重试策略；
//! - 经 [`From`] 转换为 [`NavError`] 时选取稳定错误码，便于 `?` 传播与日志聚合。

use atlas_core::engine::RequestId;
use atlas_core::error::{NavError, codes};
use atlas_core::options::RequestKind;
use thiserror::Error;

use crate::core::request::RequestPhase;

/// 编排层错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：聚合请求生命周期各环节的可恢复失败，并为上层统一转换为
///   [`NavError`] 做准备；调用方可按变体差异化处理（重试、降级、提示）。
/// - **契约 (What)**：
///   - 所有变体均满足 `Send + Sync + 'static`，可安全跨线程传播；
///   - `NoData` 与 `Decode` 携带请求种类标签，三种响应形态共用同一归类；
///   - `Engine` 原样透传引擎诊断，本层不解释码值。
/// - **风险 (Trade-offs)**：`Decode` 持有 `serde_json::Error` 以保留完整根因，
///   因此枚举不派生 `Clone`；需要跨层携带时请先转换为 [`NavError`]。
#[derive(Debug, Error)]
pub enum DispatchError {
    /// 引擎回调未携带任何载荷。
    #[error("engine returned an empty payload for {kind} request")]
    NoData { kind: RequestKind },

    /// 载荷存在但不符合预期响应结构。
    #[error("failed to decode {kind} payload")]
    Decode {
        kind: RequestKind,
        #[source]
        source: serde_json::Error,
    },

    /// 引擎上报的请求失败（网络、离线数据、内部错误等）。
    #[error("engine reported failure (code {code:?}): {message}")]
    Engine { code: Option<i64>, message: String },

    /// 登记表中已存在同名标识，属于引擎或调用方缺陷。
    #[error("request {id} is already registered")]
    DuplicateRequest { id: RequestId },

    /// 请求状态机拒绝非法跃迁。
    #[error("invalid phase transition for request {id}: {from:?} -> {to:?}")]
    InvalidPhaseTransition {
        id: RequestId,
        from: RequestPhase,
        to: RequestPhase,
    },
}

impl From<atlas_core::engine::EngineFailure> for DispatchError {
    /// 引擎诊断到错误域的无损搬运。
    fn from(failure: atlas_core::engine::EngineFailure) -> Self {
        DispatchError::Engine {
            code: failure.code,
            message: failure.message,
        }
    }
}

impl From<DispatchError> for NavError {
    /// 将编排层错误转换为统一的领域错误。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：上层服务以 [`NavError`] 为统一错误域，`From` 实现使 `?` 直接生效；
    /// - **执行 (How)**：依据错误类别选择稳定错误码，并拼接带上下文的描述信息；
    /// - **契约 (What)**：返回的 [`NavError`] 至少包含错误码与消息。
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::NoData { kind } => NavError::new(
                codes::RESPONSE_NO_DATA,
                format!("engine returned an empty payload for {kind} request"),
            ),
            DispatchError::Decode { kind, source } => NavError::new(
                codes::RESPONSE_DECODE,
                format!("failed to decode {kind} payload: {source}"),
            ),
            DispatchError::Engine { code, message } => NavError::new(
                codes::ENGINE_FAILURE,
                format!("engine reported failure (code {code:?}): {message}"),
            ),
            DispatchError::DuplicateRequest { id } => NavError::new(
                codes::REQUEST_DUPLICATE,
                format!("request {id} is already registered"),
            ),
            DispatchError::InvalidPhaseTransition { id, from, to } => NavError::new(
                codes::REQUEST_INVALID_PHASE,
                format!("invalid phase transition for request {id}: {from:?} -> {to:?}"),
            ),
        }
    }
}

impl atlas_core::Error for DispatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_error_conversion_picks_stable_codes() {
        let no_data = NavError::from(DispatchError::NoData {
            kind: RequestKind::Route,
        });
        assert_eq!(no_data.code(), codes::RESPONSE_NO_DATA);

        let engine = NavError::from(DispatchError::Engine {
            code: Some(3),
            message: String::from("offline region missing"),
        });
        assert_eq!(engine.code(), codes::ENGINE_FAILURE);
        assert!(engine.message().contains("offline region missing"));
    }

    #[test]
    fn decode_error_keeps_parse_failure_as_source() {
        let parse_failure = serde_json::from_str::<serde_json::Value>("{broken")
            .expect_err("payload must be malformed");
        let err = DispatchError::Decode {
            kind: RequestKind::MapMatch,
            source: parse_failure,
        };
        let source = std::error::Error::source(&err).expect("source must be preserved");
        assert!(source.to_string().contains("key must be a string"));
    }

    #[test]
    fn engine_failure_moves_into_error_domain() {
        let failure = atlas_core::engine::EngineFailure {
            code: None,
            message: String::from("socket closed"),
        };
        let err = DispatchError::from(failure);
        assert!(matches!(err, DispatchError::Engine { code: None, .. }));
    }
}
