//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 宿主层的失败与导航失败分属不同语义：前者是“找不到要操作的栈”或“装配失败”，
//!   后者（[`NavError`](waypoint_core::NavError)）在控制器内部已降级为布尔值；
//! - 配置与日志装配只在进程启动期出现，错误需要携带足够的上下文直接呈现给运维。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`；
//! - 注册表错误携带栈标识，配置错误保留底层 `toml`/`io` 错误作为 `source`。

use std::path::PathBuf;

use thiserror::Error;

/// 宿主错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：区分“寻址失败”（栈未注册、无活动栈）与“装配失败”（配置、日志）；
/// - **契约 (What)**：寻址类变体以 `String` 保存栈标识，便于跨线程传递与日志输出；
/// - **风险 (Trade-offs)**：`Config` 与 `ConfigIo` 不可 `Clone`，因此本枚举也不派生 `Clone`。
#[derive(Debug, Error)]
pub enum HostError {
    /// 同名栈已注册。
    #[error("navigation stack `{stack}` is already registered")]
    StackAlreadyRegistered { stack: String },

    /// 指定的栈未注册。
    #[error("navigation stack `{stack}` is not registered")]
    StackNotFound { stack: String },

    /// 请求未指定栈，且当前没有活动栈。
    #[error("no active navigation stack")]
    NoActiveStack,

    /// 配置文本无法解析。
    #[error("invalid navigator configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// 配置文件无法读取。
    #[error("failed to read configuration `{}`", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 全局日志订阅器装配失败。
    #[error("failed to install logging: {reason}")]
    LoggingInstall { reason: String },
}

impl HostError {
    pub(crate) fn not_found(stack: &str) -> Self {
        HostError::StackNotFound {
            stack: stack.to_owned(),
        }
    }

    pub(crate) fn logging(reason: impl Into<String>) -> Self {
        HostError::LoggingInstall {
            reason: reason.into(),
        }
    }
}
