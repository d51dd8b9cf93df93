//! 控制器集成测试共用的原生容器替身与事件记录器。
//!
//! - [`ScriptedContainer`]：立即确认转场，可预置失败，并记录收到的全部请求；
//! - [`GatedContainer`]：把每个请求连同应答通道交给测试，由测试决定何时、以何种结果确认，
//!   用于观察“在途”期间的控制器行为。

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use waypoint_core::{
    ListenerScope, NativeContainer, ObserverError, PageEvent, PageEventKind, PageIndex,
    RouteEntry, StackController, TransitionAck, TransitionRequest, ViewHandle,
};

pub fn idx(raw: u32) -> PageIndex {
    PageIndex::new(raw).expect("测试序号非零")
}

/// 立即确认的原生容器。
#[derive(Default)]
pub struct ScriptedContainer {
    requests: Mutex<Vec<TransitionRequest>>,
    scripted: Mutex<VecDeque<TransitionAck>>,
    next_view: Mutex<u64>,
}

impl ScriptedContainer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 预置下一次请求的应答。
    pub fn script(&self, ack: TransitionAck) {
        self.scripted.lock().unwrap().push_back(ack);
    }

    pub fn requests(&self) -> Vec<TransitionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NativeContainer for ScriptedContainer {
    async fn request_transition(&self, request: TransitionRequest) -> TransitionAck {
        self.requests.lock().unwrap().push(request);
        if let Some(ack) = self.scripted.lock().unwrap().pop_front() {
            return ack;
        }
        let mut next = self.next_view.lock().unwrap();
        *next += 1;
        TransitionAck::with_view(ViewHandle(*next))
    }

    fn currently_visible_entry(&self) -> Option<RouteEntry> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|request| request.target.clone())
    }
}

/// 把确认权交给测试的原生容器。
pub struct GatedContainer {
    outbox: mpsc::UnboundedSender<(TransitionRequest, oneshot::Sender<TransitionAck>)>,
}

pub type PendingRequests =
    mpsc::UnboundedReceiver<(TransitionRequest, oneshot::Sender<TransitionAck>)>;

impl GatedContainer {
    pub fn new() -> (Arc<Self>, PendingRequests) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        (Arc::new(Self { outbox }), inbox)
    }
}

#[async_trait]
impl NativeContainer for GatedContainer {
    async fn request_transition(&self, request: TransitionRequest) -> TransitionAck {
        let (reply, answer) = oneshot::channel();
        if self.outbox.send((request, reply)).is_err() {
            return TransitionAck::failed("test harness gone");
        }
        answer
            .await
            .unwrap_or_else(|_| TransitionAck::failed("ack dropped"))
    }

    fn currently_visible_entry(&self) -> Option<RouteEntry> {
        None
    }
}

/// 以 `kind:url#index` 形式记录栈上全部事件。
pub fn record_events(controller: &StackController) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    controller.observers().subscribe(
        ListenerScope::Any,
        move |event: &PageEvent| -> Result<(), ObserverError> {
            sink.lock().unwrap().push(describe(event));
            Ok(())
        },
    );
    log
}

pub fn describe(event: &PageEvent) -> String {
    let kind = match &event.kind {
        PageEventKind::DidPush => "didPush".to_owned(),
        PageEventKind::DidPop => "didPop".to_owned(),
        PageEventKind::DidPopTo => "didPopTo".to_owned(),
        PageEventKind::DidRemove => "didRemove".to_owned(),
        PageEventKind::Notify { name } => format!("notify({name})"),
        PageEventKind::WillAppear { .. } => "willAppear".to_owned(),
        PageEventKind::DidAppear { .. } => "didAppear".to_owned(),
        PageEventKind::WillDisappear { .. } => "willDisappear".to_owned(),
        PageEventKind::DidDisappear { .. } => "didDisappear".to_owned(),
    };
    format!("{kind}:{}", event.route)
}

pub fn shape(controller: &StackController) -> Vec<String> {
    controller
        .snapshot()
        .iter()
        .map(|entry| entry.key().to_string())
        .collect()
}
