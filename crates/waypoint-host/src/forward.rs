//! 跨边界事件转发。
//!
//! # 教案式说明
//! - **意图 (Why)**：框架侧无法直接在 Rust 的通知路由上注册监听者，需要一条可被任意多个消费者订阅的事件流；
//! - **契约 (What)**：[`EventForwarder::attach`] 在栈的通知路由上登记一个全范围监听者，把每个
//!   [`PageEvent`] 连同栈标识重新发布到 `tokio::sync::broadcast` 通道；
//!   没有订阅者时事件被直接丢弃，不视为监听失败；
//! - **风险 (Trade-offs)**：广播通道容量有限，落后的订阅者会收到 `Lagged` 并丢失最旧事件。

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use waypoint_core::{ListenerId, ListenerScope, ObserverError, PageEvent, StackController};

/// 附带来源栈标识的页面事件。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForwardedEvent {
    pub stack: Arc<str>,
    pub event: PageEvent,
}

pub type ForwardedEventSender = broadcast::Sender<ForwardedEvent>;
pub type ForwardedEventReceiver = broadcast::Receiver<ForwardedEvent>;

/// 把页面事件转发到广播通道。
#[derive(Clone, Debug)]
pub struct EventForwarder {
    sender: ForwardedEventSender,
}

impl EventForwarder {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// 订阅此后转发的全部事件。
    pub fn subscribe(&self) -> ForwardedEventReceiver {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// 在 `controller` 上登记转发监听者，返回其登记号以便撤销。
    pub fn attach(&self, controller: &StackController) -> ListenerId {
        let sender = self.sender.clone();
        let stack = Arc::clone(controller.id_arc());
        controller.observers().subscribe(
            ListenerScope::Any,
            move |event: &PageEvent| -> Result<(), ObserverError> {
                // 无订阅者时 send 返回错误，这不是监听失败。
                let _ = sender.send(ForwardedEvent {
                    stack: Arc::clone(&stack),
                    event: event.clone(),
                });
                Ok(())
            },
        )
    }

    /// 撤销此前的 [`attach`](Self::attach)。
    pub fn detach(&self, controller: &StackController, id: ListenerId) -> bool {
        controller.observers().unsubscribe(id)
    }
}
