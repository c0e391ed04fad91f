use axum::http::StatusCode;
use axum::response::IntoResponse;
use legalgpt_api::error::ApiError;
use legalgpt_persist::PersistError;

#[tokio::test]
async fn api_error_maps_to_http_status() {
    let bad = ApiError::BadRequest("user_id is required".to_string());
    assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

    let missing = ApiError::ThreadNotFound("t-1".to_string());
    assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

    let internal = ApiError::Internal(anyhow::anyhow!("mongo down"));
    assert_eq!(
        internal.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn persist_thread_not_found_becomes_404() {
    let err: ApiError = PersistError::ThreadNotFound("t-9".to_string()).into();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}
