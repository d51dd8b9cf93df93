#![doc = r#"
# waypoint-host

## 设计动机（Why）
- `waypoint-core` 只管理单个页面栈；真实宿主往往同时持有多个导航容器，并需要把导航能力暴露给
  边界另一侧的框架运行时；
- 本 crate 负责这些“外围”职责：栈注册与活动栈切换、跨栈快照查询、桥接请求面、事件转发，
  以及启动期的配置加载与日志装配。

## 核心契约（What）
- [`NavigatorHost`]：以栈标识注册控制器，维护活动栈，提供跨栈只读查询；
- [`Bridge`]：把 [`BridgeRequest`] 分派到控制器操作，返回 [`BridgeResponse`]；
- [`EventForwarder`]：把页面事件重新发布到 `tokio::sync::broadcast` 通道；
- [`HostConfig`] 与 [`logging::install`]：TOML 配置与一次性的全局 `tracing` 订阅器。

## 实现策略（How）
- 注册表使用 `dashmap`，活动栈使用 `arc-swap`，桥接读取路径不持有全局锁；
- 仍然只依赖 `tokio` 的 `sync` 原语，运行时由宿主应用自行选择。
"#]

pub mod bridge;
pub mod config;
pub mod error;
pub mod forward;
pub mod host;
pub mod logging;

pub use bridge::{Bridge, BridgeError, BridgeRequest, BridgeResponse};
pub use config::{HostConfig, LoggingConfig, NavigatorConfig};
pub use error::HostError;
pub use forward::{EventForwarder, ForwardedEvent, ForwardedEventReceiver, ForwardedEventSender};
pub use host::{NavigatorHost, StackSnapshot};
