#![doc = r#"
# waypoint-core

## 设计动机（Why）
- **定位**：宿主应用同时维护两套页面栈（原生容器栈与上层框架栈），本 crate 负责二者之间的
  栈簿记与事件传播协议，保证任一侧观察到的栈顺序一致；
- **难点**：URL 不唯一（同一 URL 可叠放多个实例，需要序号消歧），且原生 UI 线程在等待
  转场动画完成时不得阻塞。

## 核心契约（What）
- [`RouteEntry`]：不可变身份 `(url, index)` 加可变展示状态；
- [`PageStack`]：单个容器的有序条目集合，提供查找与修改原语；
- [`StackController`]：串行化 push/pop/popTo/remove，等待原生确认后才修改栈；
- [`NotificationRouter`]：按注册顺序同步扇出生命周期事件，隔离监听者失败；
- [`NativeContainer`]：每类原生容器实现一次的协作者适配能力。

## 实现策略（How）
- 仅依赖 `tokio` 的运行时无关 `sync` 原语，可在任意执行器上驱动；
- 日志统一走 `tracing`，由宿主决定订阅器。
"#]

pub mod controller;
pub mod entry;
pub mod error;
pub mod native;
pub mod notification;
pub mod params;
pub mod stack;

pub use controller::{Phase, PoppedCallback, PushOptions, StackController, StackOptions};
pub use entry::{PageIndex, RouteEntry, RouteKey, ViewHandle};
pub use error::{NavError, RejectReason};
pub use native::{NativeContainer, TransitionAck, TransitionKind, TransitionRequest};
pub use notification::{
    DeliveryReport, ListenerId, ListenerScope, NotificationRouter, ObserverError, PageEvent,
    PageEventKind, PageObserver,
};
pub use params::Params;

/// 以 [`NavError`] 为默认错误类型的结果别名。
pub type Result<T, E = NavError> = core::result::Result<T, E>;
