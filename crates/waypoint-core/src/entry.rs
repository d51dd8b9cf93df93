//! # 路由条目（Route Entry）
//!
//! ## 核心意图（Why）
//! - 页面以 `url` 标识其内容，但同一 `url` 可以在栈上叠放多个实例，因此需要 `index`
//!   作为消歧序号，二者组成 [`RouteKey`]；
//! - 条目身份在创建后不可变，只有展示类标记（如导航栏隐藏）允许原地修改。
//!
//! ## 行为契约（What）
//! - [`PageIndex`] 从 1 开始，零值在类型层面不可表示；桥接层收到的 `0` 会被解释为“未指定序号”；
//! - 条目在推入的原生转场完成后才被创建，在 pop/popTo/remove 完成后销毁。

use std::{fmt, num::NonZeroU32, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::params::Params;

/// 同一 URL 下的 1 基消歧序号。
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageIndex(NonZeroU32);

impl PageIndex {
    /// 某 URL 首次入栈时分配的序号。
    pub const FIRST: PageIndex = PageIndex(NonZeroU32::MIN);

    /// 由原始整数构造；`0` 返回 `None`，即“未指定序号”。
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// 下一个序号；溢出时返回 `None`。
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 条目身份 `(url, index)`，在单个页面栈内唯一。
///
/// - **契约 (What)**：`url` 以 `Arc<str>` 共享，克隆 Key 不会复制字符串；
/// - **风险 (Trade-offs)**：唯一性只在单栈范围内成立，跨栈比较需同时携带栈标识。
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct RouteKey {
    pub url: Arc<str>,
    pub index: PageIndex,
}

impl RouteKey {
    pub fn new(url: impl Into<Arc<str>>, index: PageIndex) -> Self {
        Self {
            url: url.into(),
            index,
        }
    }

    /// 判断是否命中 `url` 与可选序号；`index` 为 `None` 时仅比较 URL。
    pub fn matches(&self, url: &str, index: Option<PageIndex>) -> bool {
        &*self.url == url && index.is_none_or(|wanted| wanted == self.index)
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.url, self.index)
    }
}

/// 原生容器在推入确认中回传的视图句柄。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewHandle(pub u64);

/// 页面栈中的单个页面。
///
/// # 教案式说明
/// - **意图 (Why)**：把身份、参数与展示状态聚合在一处，供栈簿记与事件分发共享；
/// - **契约 (What)**：
///   - `key` 与 `params` 创建后只读；
///   - `hides_navigation_bar` 是唯一允许原地修改的展示标记；
///   - `view` 来自原生推入确认，原生侧未回传时为 `None`；
/// - **风险 (Trade-offs)**：条目可被克隆为快照，快照与栈中原件之后互不影响。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    key: RouteKey,
    params: Params,
    hides_navigation_bar: Option<bool>,
    view: Option<ViewHandle>,
}

impl RouteEntry {
    pub fn new(url: impl Into<Arc<str>>, index: PageIndex, params: Params) -> Self {
        Self {
            key: RouteKey::new(url, index),
            params,
            hides_navigation_bar: None,
            view: None,
        }
    }

    pub fn with_hides_navigation_bar(mut self, hides: Option<bool>) -> Self {
        self.hides_navigation_bar = hides;
        self
    }

    pub(crate) fn with_view(mut self, view: Option<ViewHandle>) -> Self {
        self.view = view;
        self
    }

    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    pub fn url(&self) -> &str {
        &self.key.url
    }

    pub fn index(&self) -> PageIndex {
        self.key.index
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn hides_navigation_bar(&self) -> Option<bool> {
        self.hides_navigation_bar
    }

    pub fn set_hides_navigation_bar(&mut self, hides: Option<bool>) {
        self.hides_navigation_bar = hides;
    }

    pub fn view(&self) -> Option<ViewHandle> {
        self.view
    }

    pub fn matches(&self, url: &str, index: Option<PageIndex>) -> bool {
        self.key.matches(url, index)
    }
}
