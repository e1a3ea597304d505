//! 构造期配置对象。
//!
//! 调度器的全部环境依赖（凭据、瓦片存储位置、数据来源档位）都在构造时显式注入，
//! 不依赖任何进程级可变单例；同一进程内的多个调度器实例因此可以携带互不相同的配置。

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::options::RoutingSource;

/// 访问凭据。
///
/// # 契约说明（What）
/// - `access_token`：服务端访问令牌，会被嵌入请求 URI 与会话上下文；
/// - `host`：服务基地址，形如 `https://api.example.com`，不带结尾斜杠；
/// - `Debug` 输出对令牌做掩码处理，防止其随日志外泄。
#[derive(Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct Credentials {
    pub access_token: String,
    pub host: String,
}

impl Credentials {
    /// 构造凭据。
    #[must_use]
    pub fn new(access_token: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            host: host.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

/// 引擎装配配置。
///
/// # 教案式说明
/// - **意图 (Why)**：集中描述 `EngineProvider::build_cache` / `build_engine`
///   所需的全部输入，替代散落的全局设置；
/// - **契约 (What)**：
///   - `tile_store_path`：本地瓦片存储目录；`None` 表示纯在线模式；
///   - `credentials`：见 [`Credentials`]；
///   - `source`：逻辑数据来源档位，装配时映射为引擎档位。
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EngineConfig {
    pub tile_store_path: Option<String>,
    pub credentials: Credentials,
    pub source: RoutingSource,
}

impl EngineConfig {
    /// 以纯在线模式构造配置。
    #[must_use]
    pub fn online(credentials: Credentials) -> Self {
        Self {
            tile_store_path: None,
            credentials,
            source: RoutingSource::Online,
        }
    }

    /// 指定瓦片存储目录。
    #[must_use]
    pub fn with_tile_store(mut self, path: impl Into<String>) -> Self {
        self.tile_store_path = Some(path.into());
        self
    }

    /// 指定数据来源档位。
    #[must_use]
    pub fn with_source(mut self, source: RoutingSource) -> Self {
        self.source = source;
        self
    }
}
