//! 全局日志订阅器装配。
//!
//! # 教案式说明
//! - **意图 (Why)**：核心层只通过 `tracing` 宏产出结构化事件，由宿主在启动时一次性决定输出格式与过滤级别；
//! - **契约 (What)**：[`install`] 在进程生命周期内至多成功一次；重复调用或外部已设置全局订阅器时返回
//!   [`HostError::LoggingInstall`]，不会 panic；
//! - **执行 (How)**：`RUST_LOG` 存在时优先，否则使用 [`LoggingConfig::filter`]；组装 `fmt` 层后设为全局默认。

use std::sync::OnceLock;

use tracing::dispatcher;
use tracing_subscriber::EnvFilter;

use crate::{config::LoggingConfig, error::HostError};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// 安装全局 `tracing` 订阅器。
pub fn install(config: &LoggingConfig) -> Result<(), HostError> {
    if INSTALLED.get().is_some() {
        return Err(HostError::logging("waypoint logging is already installed"));
    }
    if dispatcher::has_been_set() {
        return Err(HostError::logging("a global tracing subscriber is already set"));
    }

    let filter = build_env_filter(config)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|err| HostError::logging(err.to_string()))?;

    INSTALLED
        .set(())
        .map_err(|_| HostError::logging("waypoint logging is already installed"))?;
    tracing::debug!(filter = %config.filter, "waypoint logging installed");
    Ok(())
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, HostError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|err| {
            HostError::logging(format!("invalid filter `{}`: {err}", config.filter))
        }),
    }
}
