//! 逻辑档位到引擎档位的映射。
//!
//! 两个函数都是无副作用的全函数：出行模式在无法识别时回退为驾车模式，
//! 数据来源因枚举封闭而不存在回退分支。

use atlas_core::engine::{EngineProfile, EngineSource};
use atlas_core::options::RoutingSource;

/// 将调用方的出行模式标识映射为引擎档位。
///
/// # 教案式说明
/// - **契约 (What)**：
///   - 标识允许携带命名空间前缀（如 `acme/driving-traffic`），只取末段参与匹配；
///   - 可识别取值：`driving`、`driving-traffic`（兼容 `driving-with-traffic`）、
///     `cycling`、`walking`；
///   - **后置条件**：任何无法识别的标识回退为 [`EngineProfile::Driving`]，函数永不失败。
/// - **风险 (Trade-offs)**：回退策略对拼写错误保持沉默；如需严格校验应在选项入口处完成。
#[must_use]
pub fn engine_profile(identifier: &str) -> EngineProfile {
    let bare = identifier.rsplit('/').next().unwrap_or(identifier);
    match bare {
        "driving" => EngineProfile::Driving,
        "driving-traffic" | "driving-with-traffic" => EngineProfile::DrivingTraffic,
        "cycling" => EngineProfile::Cycling,
        "walking" => EngineProfile::Walking,
        _ => EngineProfile::Driving,
    }
}

/// 将逻辑数据来源映射为引擎档位，一一对应。
#[must_use]
pub const fn engine_source(source: RoutingSource) -> EngineSource {
    match source {
        RoutingSource::Online => EngineSource::Online,
        RoutingSource::Offline => EngineSource::Offline,
        RoutingSource::Hybrid => EngineSource::Hybrid,
    }
}
