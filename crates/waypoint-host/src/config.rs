//! 宿主配置。
//!
//! # 教案式说明
//! - **意图 (Why)**：栈深上限、默认动画与日志过滤等运行参数由部署方以 TOML 提供，而非硬编码；
//! - **契约 (What)**：所有字段都有默认值，空文档即为合法配置；未知字段被拒绝，避免拼写错误被静默忽略；
//! - **执行 (How)**：`serde` 反序列化 + `toml` 解析，文件读取失败映射为 [`HostError::ConfigIo`]。
//!
//! ```toml
//! [navigator]
//! max_depth = 16
//! default_animated = true
//! event_capacity = 64
//!
//! [logging]
//! filter = "waypoint_core=debug,info"
//! ansi = false
//! ```

use std::path::Path;

use serde::Deserialize;
use waypoint_core::StackOptions;

use crate::error::HostError;

/// 顶层配置。
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub navigator: NavigatorConfig,
    pub logging: LoggingConfig,
}

impl HostConfig {
    /// 从 TOML 文本解析配置。
    pub fn from_toml_str(source: &str) -> Result<Self, HostError> {
        Ok(toml::from_str(source)?)
    }

    /// 读取并解析 TOML 配置文件。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| HostError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// 导航行为配置。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    /// 单栈深度上限；缺省表示不限制。
    pub max_depth: Option<usize>,
    /// 桥接请求省略 `animated` 时采用的取值。
    pub default_animated: bool,
    /// 事件转发广播通道的容量；慢订阅者落后超过该值会丢失最旧的事件。
    pub event_capacity: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            default_animated: true,
            event_capacity: 64,
        }
    }
}

impl NavigatorConfig {
    /// 转换为控制器级选项。
    pub fn stack_options(&self) -> StackOptions {
        StackOptions {
            max_depth: self.max_depth,
        }
    }
}

/// 日志装配配置。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` 指令；环境变量 `RUST_LOG` 存在时优先。
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            ansi: false,
        }
    }
}
