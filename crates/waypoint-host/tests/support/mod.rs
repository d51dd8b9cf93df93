//! 宿主集成测试共用的原生容器替身：立即确认，可预置失败。

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use waypoint_core::{NativeContainer, RouteEntry, TransitionAck, TransitionKind, TransitionRequest};

#[derive(Default)]
pub struct InstantContainer {
    log: Mutex<Vec<(TransitionKind, String)>>,
    scripted: Mutex<VecDeque<TransitionAck>>,
    visible: Mutex<Option<RouteEntry>>,
}

impl InstantContainer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, reason: &str) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(TransitionAck::failed(reason));
    }

    /// 以 `(kind, "url#index")` 形式返回收到的请求。
    pub fn log(&self) -> Vec<(TransitionKind, String)> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl NativeContainer for InstantContainer {
    async fn request_transition(&self, request: TransitionRequest) -> TransitionAck {
        self.log
            .lock()
            .unwrap()
            .push((request.kind, request.target.key().to_string()));
        if let Some(ack) = self.scripted.lock().unwrap().pop_front() {
            return ack;
        }
        *self.visible.lock().unwrap() = Some(request.target);
        TransitionAck::completed()
    }

    fn currently_visible_entry(&self) -> Option<RouteEntry> {
        self.visible.lock().unwrap().clone()
    }
}
