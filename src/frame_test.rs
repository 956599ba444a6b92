use super::*;

#[test]
fn request_sets_fields() {
    let frame = Frame::request("disruption:list", Data::new());
    assert_eq!(frame.syscall, "disruption:list");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.parent_id.is_none());
    assert!(frame.ts > 0);
}

#[test]
fn reply_inherits_context() {
    let req = Frame::request("chat:send", Data::new());
    let reply = req.done_with(Data::new()).with_data("reply", "hello");

    assert_eq!(reply.parent_id, Some(req.id));
    assert_eq!(reply.syscall, "chat:send");
    assert_eq!(reply.status, Status::Done);
    assert_eq!(reply.data.get("reply").and_then(|v| v.as_str()), Some("hello"));
}

#[test]
fn status_wire_values() {
    assert_eq!(serde_json::to_string(&Status::Done).unwrap(), "\"done\"");
    assert_eq!(serde_json::from_str::<Status>("\"error\"").unwrap(), Status::Error);
    assert!(serde_json::from_str::<Status>("\"item\"").is_err());

    let frame: Frame = serde_json::from_str(r#"{"id":"00000000-0000-0000-0000-000000000001","syscall":"feed:status"}"#).unwrap();
    assert_eq!(frame.status, Status::Request);
}

#[test]
fn prefix_and_op_extraction() {
    let frame = Frame::request("search:query", Data::new());
    assert_eq!(frame.prefix(), "search");
    assert_eq!(frame.op(), "query");

    let frame = Frame::request("noseparator", Data::new());
    assert_eq!(frame.prefix(), "noseparator");
    assert_eq!(frame.op(), "");
}

#[test]
fn error_from_typed() {
    #[derive(Debug, thiserror::Error)]
    #[error("not found")]
    struct NotFound;

    impl ErrorCode for NotFound {
        fn error_code(&self) -> &'static str {
            "E_NOT_FOUND"
        }
    }

    let req = Frame::request("disruption:get", Data::new());
    let err = req.error_from(&NotFound);

    assert_eq!(err.status, Status::Error);
    assert_eq!(err.parent_id, Some(req.id));
    assert_eq!(err.data.get("code").and_then(|v| v.as_str()), Some("E_NOT_FOUND"));
    assert_eq!(err.data.get("message").and_then(|v| v.as_str()), Some("not found"));
    assert_eq!(err.data.get("retryable").and_then(serde_json::Value::as_bool), Some(false));
}

#[test]
fn deserialize_minimal_client_frame() {
    // Only id and syscall; everything else defaults.
    let json = r#"{"id": "053ffe5e-16ed-41f1-a36d-eabdd40c0ceb", "syscall": "feed:status"}"#;
    let frame: Frame = serde_json::from_str(json).expect("minimal frame should deserialize");
    assert_eq!(frame.syscall, "feed:status");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.from.is_none());
    assert!(frame.data.is_empty());
}

#[test]
fn deserialize_client_search_frame() {
    let json = r#"{
            "id": "053ffe5e-16ed-41f1-a36d-eabdd40c0ceb",
            "parent_id": null,
            "ts": 1739750400000,
            "from": null,
            "syscall": "search:query",
            "status": "request",
            "data": { "search": "shanghai", "severity": "critical,high" }
        }"#;
    let frame: Frame = serde_json::from_str(json).expect("search frame should deserialize");
    assert_eq!(frame.prefix(), "search");
    assert_eq!(frame.data.get("search").and_then(|v| v.as_str()), Some("shanghai"));
}

#[test]
fn deserialize_rejects_bad_id() {
    let json = r#"{"id": "", "syscall": "feed:status"}"#;
    assert!(serde_json::from_str::<Frame>(json).is_err());
}
