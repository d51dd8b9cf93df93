//! 跨边界页面参数载体。
//!
//! # 教案式说明
//! - **意图 (Why)**：页面参数在原生侧与框架侧之间往返传递，核心层不解释其语义，只负责保序承载；
//! - **契约 (What)**：[`Params`] 是保序的键值映射（依赖 `serde_json` 的 `preserve_order` 特性），
//!   由推入请求创建后随 [`RouteEntry`](crate::entry::RouteEntry) 一并冻结；
//! - **风险 (Trade-offs)**：值类型直接复用 [`serde_json::Value`]，跨语言桥接无需二次编解码，
//!   代价是无法在编译期约束具体字段。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 不透明的保序键值参数。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// 构造空参数集。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以构建器方式追加一个键值对，重复键会覆盖旧值但保留首次出现的位置。
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按插入顺序遍历键值。
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// 交出底层映射，供桥接层直接序列化。
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Params {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_survives_serialization() {
        let params = Params::new().with("zeta", 1).with("alpha", "two").with("mid", true);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&params).expect("参数应可序列化");
        assert_eq!(json, r#"{"zeta":1,"alpha":"two","mid":true}"#);
    }
}
