//! # 跨边界桥接请求面
//!
//! ## 设计动机（Why）
//! - 框架侧（另一种语言的运行时）只能以序列化消息与导航核心交互；本模块把这些消息映射到
//!   [`StackController`](waypoint_core::StackController) 的操作，并把结果编码回去。
//!
//! ## 协议约定（What）
//! - 请求以 `method` 字段区分，方法名与字段均为 camelCase：
//!   `{"method":"popTo","url":"detail","index":1,"animated":true,"stack":"main"}`；
//! - `stack` 省略时作用于活动栈；`animated` 省略时取 [`NavigatorConfig::default_animated`]；
//! - `index` 省略或为 `0` 表示“未指定序号”；
//! - 响应是裸 JSON 值：`true`/`false`、序号或 `null`、序号数组。
//!
//! ## 风险提示（Trade-offs）
//! - 导航失败按核心约定降级为 `false`；寻址失败（栈未注册、无活动栈）与报文错误则以
//!   [`BridgeError`] 返回，调用方需区分“操作未生效”与“请求无法投递”。
//!
//! [`NavigatorConfig::default_animated`]: crate::config::NavigatorConfig::default_animated

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waypoint_core::{PageIndex, Params};

use crate::{error::HostError, host::NavigatorHost};

/// 框架侧发来的请求。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum BridgeRequest {
    Push {
        url: String,
        #[serde(default)]
        params: Params,
        #[serde(default)]
        animated: Option<bool>,
        #[serde(default)]
        stack: Option<String>,
    },
    Notify {
        url: String,
        #[serde(default)]
        index: Option<u32>,
        name: String,
        #[serde(default)]
        params: Params,
        #[serde(default)]
        stack: Option<String>,
    },
    Pop {
        #[serde(default)]
        params: Params,
        #[serde(default)]
        animated: Option<bool>,
        #[serde(default)]
        stack: Option<String>,
    },
    PopTo {
        url: String,
        #[serde(default)]
        index: Option<u32>,
        #[serde(default)]
        animated: Option<bool>,
        #[serde(default)]
        stack: Option<String>,
    },
    Remove {
        url: String,
        #[serde(default)]
        index: Option<u32>,
        #[serde(default)]
        animated: Option<bool>,
        #[serde(default)]
        stack: Option<String>,
    },
    LastIndex {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        stack: Option<String>,
    },
    AllIndexes {
        url: String,
        #[serde(default)]
        stack: Option<String>,
    },
    Contains {
        url: String,
        #[serde(default)]
        index: Option<u32>,
        #[serde(default)]
        stack: Option<String>,
    },
}

impl BridgeRequest {
    /// 协议中的方法名。
    pub fn method(&self) -> &'static str {
        match self {
            BridgeRequest::Push { .. } => "push",
            BridgeRequest::Notify { .. } => "notify",
            BridgeRequest::Pop { .. } => "pop",
            BridgeRequest::PopTo { .. } => "popTo",
            BridgeRequest::Remove { .. } => "remove",
            BridgeRequest::LastIndex { .. } => "lastIndex",
            BridgeRequest::AllIndexes { .. } => "allIndexes",
            BridgeRequest::Contains { .. } => "contains",
        }
    }

    fn stack(&self) -> Option<&str> {
        match self {
            BridgeRequest::Push { stack, .. }
            | BridgeRequest::Notify { stack, .. }
            | BridgeRequest::Pop { stack, .. }
            | BridgeRequest::PopTo { stack, .. }
            | BridgeRequest::Remove { stack, .. }
            | BridgeRequest::LastIndex { stack, .. }
            | BridgeRequest::AllIndexes { stack, .. }
            | BridgeRequest::Contains { stack, .. } => stack.as_deref(),
        }
    }
}

/// 桥接响应，序列化为裸 JSON 值。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    Bool(bool),
    Index(Option<u32>),
    Indexes(Vec<u32>),
}

/// 请求无法投递。
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed bridge request: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode bridge response: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// 桥接入口。
#[derive(Clone, Debug)]
pub struct Bridge {
    host: Arc<NavigatorHost>,
}

impl Bridge {
    pub fn new(host: Arc<NavigatorHost>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<NavigatorHost> {
        &self.host
    }

    /// 执行一条请求。
    ///
    /// # 教案式注释
    /// - **执行 (How)**：先按 `stack` 寻址控制器，再分派到对应操作；查询类请求同步返回；
    /// - **契约 (What)**：导航失败返回 `Ok(BridgeResponse::Bool(false))`，只有寻址失败返回 `Err`。
    pub async fn handle(&self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        let controller = self.host.resolve(request.stack())?;
        let method = request.method();
        tracing::debug!(stack = %controller.id(), method, "bridge request");
        let animated = |value: Option<bool>| value.unwrap_or(self.host.config().default_animated);

        let response = match request {
            BridgeRequest::Push {
                url,
                params,
                animated: flag,
                ..
            } => BridgeResponse::Bool(controller.push(url, params, animated(flag)).await),
            BridgeRequest::Notify {
                url,
                index,
                name,
                params,
                ..
            } => BridgeResponse::Bool(controller.notify(&url, page_index(index), &name, params)),
            BridgeRequest::Pop {
                params,
                animated: flag,
                ..
            } => BridgeResponse::Bool(controller.pop_with(params, animated(flag)).await),
            BridgeRequest::PopTo {
                url,
                index,
                animated: flag,
                ..
            } => BridgeResponse::Bool(
                controller
                    .pop_to(&url, page_index(index), animated(flag))
                    .await,
            ),
            BridgeRequest::Remove {
                url,
                index,
                animated: flag,
                ..
            } => BridgeResponse::Bool(
                controller
                    .remove(&url, page_index(index), animated(flag))
                    .await,
            ),
            BridgeRequest::LastIndex { url, .. } => {
                let index = match url.as_deref() {
                    Some(url) => controller.last_index_for(url),
                    None => controller.last_index(),
                };
                BridgeResponse::Index(index.map(PageIndex::get))
            }
            BridgeRequest::AllIndexes { url, .. } => BridgeResponse::Indexes(
                controller
                    .all_indexes_for(&url)
                    .into_iter()
                    .map(PageIndex::get)
                    .collect(),
            ),
            BridgeRequest::Contains { url, index, .. } => {
                BridgeResponse::Bool(controller.contains(&url, page_index(index)))
            }
        };
        tracing::trace!(stack = %controller.id(), method, ?response, "bridge response");
        Ok(response)
    }

    /// JSON 进、JSON 出。
    pub async fn handle_json(&self, payload: &str) -> Result<String, BridgeError> {
        let request: BridgeRequest = serde_json::from_str(payload).map_err(BridgeError::Decode)?;
        let response = self.handle(request).await?;
        serde_json::to_string(&response).map_err(BridgeError::Encode)
    }
}

fn page_index(raw: Option<u32>) -> Option<PageIndex> {
    raw.and_then(PageIndex::new)
}
