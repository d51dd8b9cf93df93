//! 桥接请求面：JSON 报文到控制器操作的端到端映射。

mod support;

use std::sync::Arc;

use support::InstantContainer;
use waypoint_core::TransitionKind;
use waypoint_host::{
    Bridge, BridgeError, BridgeRequest, BridgeResponse, HostError, NavigatorConfig, NavigatorHost,
};

fn bridge_with(config: NavigatorConfig) -> (Bridge, Arc<InstantContainer>) {
    let host = Arc::new(NavigatorHost::new(config));
    let native = InstantContainer::new();
    host.register("main", native.clone()).unwrap();
    (Bridge::new(host), native)
}

async fn call(bridge: &Bridge, payload: &str) -> String {
    bridge.handle_json(payload).await.unwrap()
}

#[tokio::test]
async fn json_walkthrough_matches_controller_semantics() {
    let (bridge, native) = bridge_with(NavigatorConfig::default());

    assert_eq!(call(&bridge, r#"{"method":"push","url":"home"}"#).await, "true");
    assert_eq!(
        call(&bridge, r#"{"method":"push","url":"detail","params":{"id":7}}"#).await,
        "true"
    );
    assert_eq!(
        call(&bridge, r#"{"method":"push","url":"detail","params":{"id":8}}"#).await,
        "true"
    );
    assert_eq!(call(&bridge, r#"{"method":"lastIndex","url":"detail"}"#).await, "2");
    assert_eq!(call(&bridge, r#"{"method":"allIndexes","url":"detail"}"#).await, "[1,2]");
    assert_eq!(
        call(&bridge, r#"{"method":"contains","url":"detail","index":2}"#).await,
        "true"
    );

    assert_eq!(
        call(&bridge, r#"{"method":"popTo","url":"detail","index":1,"animated":false}"#).await,
        "true"
    );
    assert_eq!(call(&bridge, r#"{"method":"allIndexes","url":"detail"}"#).await, "[1]");
    assert_eq!(call(&bridge, r#"{"method":"lastIndex"}"#).await, "1");
    assert_eq!(call(&bridge, r#"{"method":"lastIndex","url":"cart"}"#).await, "null");

    assert_eq!(
        call(&bridge, r#"{"method":"notify","url":"detail","name":"refresh"}"#).await,
        "true"
    );
    assert_eq!(
        call(&bridge, r#"{"method":"notify","url":"cart","name":"refresh"}"#).await,
        "false"
    );

    assert_eq!(call(&bridge, r#"{"method":"pop"}"#).await, "true");
    assert_eq!(call(&bridge, r#"{"method":"pop"}"#).await, "false");
    assert_eq!(
        call(&bridge, r#"{"method":"remove","url":"home","index":0}"#).await,
        "false"
    );

    let kinds: Vec<TransitionKind> = native.log().into_iter().map(|(kind, _)| kind).collect();
    assert_eq!(
        kinds,
        [
            TransitionKind::Push,
            TransitionKind::Push,
            TransitionKind::Push,
            TransitionKind::PopTo,
            TransitionKind::Pop,
        ]
    );
}

#[tokio::test]
async fn animated_defaults_from_configuration() {
    let host = Arc::new(NavigatorHost::new(NavigatorConfig {
        default_animated: false,
        ..NavigatorConfig::default()
    }));
    let native = InstantContainer::new();
    let main = host.register("main", native.clone()).unwrap();
    let bridge = Bridge::new(Arc::clone(&host));

    let response = bridge
        .handle(BridgeRequest::Push {
            url: "home".to_owned(),
            params: Default::default(),
            animated: None,
            stack: None,
        })
        .await
        .unwrap();
    assert_eq!(response, BridgeResponse::Bool(true));
    assert_eq!(native.log().len(), 1);
    assert_eq!(main.len(), 1);
}

#[tokio::test]
async fn requests_address_named_stacks() {
    let (bridge, _) = bridge_with(NavigatorConfig::default());
    let modal = InstantContainer::new();
    bridge.host().register("modal", modal.clone()).unwrap();
    bridge.host().activate("main").unwrap();

    assert_eq!(
        call(&bridge, r#"{"method":"push","url":"sheet","stack":"modal"}"#).await,
        "true"
    );
    assert_eq!(call(&bridge, r#"{"method":"contains","url":"sheet"}"#).await, "false");
    assert_eq!(
        call(&bridge, r#"{"method":"contains","url":"sheet","stack":"modal"}"#).await,
        "true"
    );
    assert_eq!(modal.log().len(), 1);

    let err = bridge
        .handle_json(r#"{"method":"pop","stack":"ghost"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Host(HostError::StackNotFound { .. })));
}

#[tokio::test]
async fn malformed_payloads_are_decode_errors() {
    let (bridge, native) = bridge_with(NavigatorConfig::default());
    for payload in [
        "not json",
        r#"{"method":"teleport","url":"home"}"#,
        r#"{"method":"push"}"#,
        r#"{"url":"home"}"#,
    ] {
        let err = bridge.handle_json(payload).await.unwrap_err();
        assert!(matches!(err, BridgeError::Decode(_)), "{payload}: {err}");
    }
    assert!(native.log().is_empty());
}

#[tokio::test]
async fn native_failure_answers_false() {
    let (bridge, native) = bridge_with(NavigatorConfig::default());
    native.fail_next("no window");
    assert_eq!(call(&bridge, r#"{"method":"push","url":"home"}"#).await, "false");
    assert_eq!(call(&bridge, r#"{"method":"lastIndex"}"#).await, "null");
}

#[tokio::test]
async fn no_active_stack_is_an_addressing_error() {
    let bridge = Bridge::new(Arc::new(NavigatorHost::default()));
    let err = bridge
        .handle_json(r#"{"method":"lastIndex"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Host(HostError::NoActiveStack)));
}
