use api_contract::ApiResponse;

#[test]
fn api_response_success() {
    let response = ApiResponse::success("ok");
    assert!(response.success);
    assert!(response.data.is_some());
    assert!(response.error.is_none());
}

#[test]
fn api_response_error() {
    let response = ApiResponse::<()>::error("AUTH.UNAUTHORIZED", "unauthorized");
    assert!(!response.success);
    assert!(response.data.is_none());
    assert!(response.error.is_some());
}

#[test]
fn error_body_serializes_code_and_message() {
    let response = ApiResponse::<()>::error("REGION.FORBIDDEN", "region not permitted");
    let json = serde_json::to_value(&response).expect("json");
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "REGION.FORBIDDEN");
    assert_eq!(json["error"]["message"], "region not permitted");
}
