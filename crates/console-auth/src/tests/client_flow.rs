use super::harness::{Reply, TestContext};
use crate::{AuthError, Method};
use chrono::{Duration as ChronoDuration, Utc};
use console_storage::TokenRecord;
use serde_json::{json, Value};
use std::time::Duration;

fn seed_tokens(ctx: &TestContext, access: &str, expires_in_secs: i64, refresh: Option<&str>) {
    ctx.tokens
        .store_record(&TokenRecord {
            access_token: access.to_string(),
            expires_at: Some(Utc::now() + ChronoDuration::seconds(expires_in_secs)),
            refresh_token: refresh.map(str::to_string),
            refresh_expires_at: None,
        })
        .unwrap();
}

fn refreshed(access: &str) -> Reply {
    Reply::json(
        200,
        json!({ "accessToken": access, "refreshToken": "refresh-2", "expiresIn": 3600 }),
    )
}

#[tokio::test]
async fn test_request_attaches_bearer_token() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "access-1", 3600, Some("refresh-1"));
    ctx.transport
        .enqueue(Method::Get, "/admin/contact", Reply::json(200, json!([])));

    let value = ctx
        .client
        .request(Method::Get, "/admin/contact", None)
        .await
        .unwrap();

    assert_eq!(value, json!([]));
    let calls = ctx.transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].bearer.as_deref(), Some("access-1"));
    assert_eq!(
        calls[0].url.as_str(),
        "https://responder.test/api/v1/admin/contact"
    );
}

#[tokio::test]
async fn test_single_401_refreshes_and_retries_once() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "stale", 3600, Some("refresh-1"));
    ctx.transport
        .enqueue(Method::Get, "/admin/userlist", Reply::unauthorized());
    ctx.transport.enqueue(
        Method::Get,
        "/admin/userlist",
        Reply::json(200, json!([{ "id": 1 }])),
    );
    ctx.transport
        .enqueue(Method::Post, "/auth/refresh", refreshed("fresh"));

    let value = ctx
        .client
        .request(Method::Get, "/admin/userlist", None)
        .await
        .unwrap();

    assert_eq!(value, json!([{ "id": 1 }]));
    assert_eq!(ctx.transport.count(Method::Post, "/auth/refresh"), 1);

    let refresh_call = &ctx.transport.calls_to(Method::Post, "/auth/refresh")[0];
    assert_eq!(refresh_call.bearer, None);
    assert_eq!(
        refresh_call.body,
        Some(json!({ "refreshToken": "refresh-1" }))
    );

    let attempts = ctx.transport.calls_to(Method::Get, "/admin/userlist");
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].bearer.as_deref(), Some("fresh"));
    assert_eq!(ctx.tokens.get_token().as_deref(), Some("fresh"));
    assert_eq!(ctx.tokens.get_refresh_token().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn test_second_401_expires_session_without_further_retries() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "stale", 3600, Some("refresh-1"));
    ctx.transport
        .set_default(Method::Get, "/iam/profile", Reply::unauthorized());
    ctx.transport
        .set_default(Method::Post, "/auth/refresh", refreshed("fresh"));

    let result = ctx.client.request(Method::Get, "/iam/profile", None).await;

    assert!(matches!(result, Err(AuthError::SessionExpired)));
    assert_eq!(ctx.transport.count(Method::Get, "/iam/profile"), 2);
    assert_eq!(ctx.transport.count(Method::Post, "/auth/refresh"), 1);
    assert!(!ctx.tokens.has_token());
    assert_eq!(ctx.tokens.get_refresh_token(), None);
}

#[tokio::test]
async fn test_failed_refresh_clears_store() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "stale", 3600, Some("revoked"));
    ctx.transport
        .enqueue(Method::Get, "/admin/contact", Reply::unauthorized());
    ctx.transport.enqueue(
        Method::Post,
        "/auth/refresh",
        Reply::json(400, json!({ "message": "Refresh token revoked" })),
    );

    let result = ctx.client.request(Method::Get, "/admin/contact", None).await;

    assert!(matches!(result, Err(AuthError::SessionExpired)));
    assert_eq!(ctx.transport.count(Method::Get, "/admin/contact"), 1);
    assert!(!ctx.tokens.has_token());
}

#[tokio::test]
async fn test_missing_refresh_token_skips_refresh_call() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "stale", 3600, None);
    ctx.transport
        .enqueue(Method::Get, "/admin/contact", Reply::unauthorized());

    let result = ctx.client.request(Method::Get, "/admin/contact", None).await;

    assert!(matches!(result, Err(AuthError::SessionExpired)));
    assert_eq!(ctx.transport.count(Method::Post, "/auth/refresh"), 0);
    assert!(!ctx.tokens.has_token());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_sending() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "expired", -60, Some("refresh-1"));
    ctx.transport
        .enqueue(Method::Post, "/auth/refresh", refreshed("fresh"));
    ctx.transport
        .enqueue(Method::Get, "/admin/incident-types", Reply::json(200, json!([])));

    ctx.client
        .request(Method::Get, "/admin/incident-types", None)
        .await
        .unwrap();

    let calls = ctx.transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].url.path().ends_with("/auth/refresh"));
    assert_eq!(calls[1].bearer.as_deref(), Some("fresh"));
    assert!(!ctx.tokens.is_token_expired());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_share_one_refresh() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "expired", -60, Some("refresh-1"));
    ctx.transport.enqueue(
        Method::Post,
        "/auth/refresh",
        Reply::Delay(Duration::from_millis(200), Box::new(refreshed("fresh"))),
    );
    ctx.transport
        .set_default(Method::Get, "/admin/contact", Reply::json(200, json!([])));
    ctx.transport
        .set_default(Method::Get, "/admin/userlist", Reply::json(200, json!([])));

    let (contacts, users) = tokio::join!(
        ctx.client.request(Method::Get, "/admin/contact", None),
        ctx.client.request(Method::Get, "/admin/userlist", None),
    );

    assert!(contacts.is_ok());
    assert!(users.is_ok());
    assert_eq!(ctx.transport.count(Method::Post, "/auth/refresh"), 1);
    for endpoint in ["/admin/contact", "/admin/userlist"] {
        let calls = ctx.transport.calls_to(Method::Get, endpoint);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].bearer.as_deref(), Some("fresh"));
    }
}

#[tokio::test]
async fn test_transport_failure_is_server_unreachable() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "access-1", 3600, Some("refresh-1"));
    ctx.transport.enqueue(
        Method::Get,
        "/admin/contact",
        Reply::Fail("connection refused".to_string()),
    );

    let err = ctx
        .client
        .request(Method::Get, "/admin/contact", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::ServerUnreachable(_)));
    assert!(err.is_transient());
    assert!(ctx.tokens.has_token());
}

#[tokio::test]
async fn test_status_mapping() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "access-1", 3600, Some("refresh-1"));
    ctx.transport.enqueue(
        Method::Post,
        "/admin/contact",
        Reply::json(
            400,
            json!({ "errors": { "Number": ["Number is required"] } }),
        ),
    );
    ctx.transport
        .enqueue(Method::Get, "/admin/missing", Reply::text(404, ""));
    ctx.transport
        .enqueue(Method::Get, "/admin/contact", Reply::text(500, "boom"));

    let bad = ctx
        .client
        .request(Method::Post, "/admin/contact", Some(json!({})))
        .await;
    assert!(matches!(bad, Err(AuthError::BadRequest(m)) if m == "Number is required"));

    let missing = ctx.client.request(Method::Get, "/admin/missing", None).await;
    assert!(matches!(missing, Err(AuthError::EndpointNotFound(e)) if e == "/admin/missing"));

    let server = ctx.client.request(Method::Get, "/admin/contact", None).await;
    assert!(matches!(
        server,
        Err(AuthError::Http { status: 500, message }) if message == "boom"
    ));
}

#[tokio::test]
async fn test_typed_helpers_decode_bodies() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "access-1", 3600, Some("refresh-1"));
    ctx.transport.enqueue(
        Method::Put,
        "/admin/contact",
        Reply::json(200, json!({ "ok": true })),
    );
    ctx.transport
        .enqueue(Method::Get, "/admin/userlist", Reply::json(200, json!("not a list")));

    let updated: Value = ctx
        .client
        .put("/admin/contact", &json!({ "id": 3 }))
        .await
        .unwrap();
    assert_eq!(updated, json!({ "ok": true }));
    assert_eq!(
        ctx.transport.calls_to(Method::Put, "/admin/contact")[0].body,
        Some(json!({ "id": 3 }))
    );

    let wrong: Result<Vec<Value>, _> = ctx.client.get("/admin/userlist").await;
    assert!(matches!(wrong, Err(AuthError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_anonymous_request_has_no_bearer_and_no_retry() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "access-1", 3600, Some("refresh-1"));
    ctx.transport
        .enqueue(Method::Get, "/auth/admin-exists", Reply::unauthorized());

    let result = ctx
        .client
        .request_anonymous(Method::Get, "/auth/admin-exists", None)
        .await;

    assert!(matches!(result, Err(AuthError::Http { status: 401, .. })));
    let calls = ctx.transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].bearer, None);
    assert!(ctx.tokens.has_token());
}

#[tokio::test]
async fn test_login_stores_token_pair() {
    let ctx = TestContext::new();
    ctx.transport.enqueue(
        Method::Post,
        "/auth/login",
        Reply::json(
            200,
            json!({
                "AccessToken": "access-1",
                "RefreshToken": "refresh-1",
                "AccessTokenExpiresAt": "2099-01-01T00:00:00Z",
                "UserId": "u-7"
            }),
        ),
    );

    let payload = ctx.client.login("ana@example.com", "pw").await.unwrap();

    assert_eq!(payload["UserId"], "u-7");
    assert_eq!(ctx.tokens.get_token().as_deref(), Some("access-1"));
    assert_eq!(ctx.tokens.get_refresh_token().as_deref(), Some("refresh-1"));
    assert!(!ctx.tokens.is_token_expired());

    let login_call = &ctx.transport.calls()[0];
    assert_eq!(login_call.bearer, None);
    assert_eq!(
        login_call.body,
        Some(json!({ "email": "ana@example.com", "password": "pw" }))
    );
}

#[tokio::test]
async fn test_login_with_out_of_range_lifetime_stores_unknown_expiry() {
    let ctx = TestContext::new();
    ctx.transport.enqueue(
        Method::Post,
        "/auth/login",
        Reply::json(
            200,
            json!({
                "accessToken": "a",
                "refreshToken": "r",
                "expiresIn": 100_000_000_000_000_i64,
                "userId": "u1"
            }),
        ),
    );

    ctx.client.login("ana@example.com", "pw").await.unwrap();

    assert_eq!(ctx.tokens.get_token().as_deref(), Some("a"));
    assert_eq!(ctx.tokens.token_expires_at(), None);
    assert_eq!(ctx.tokens.expiry_status(), console_storage::ExpiryStatus::Unknown);
}

#[tokio::test]
async fn test_login_without_token_is_invalid_response() {
    let ctx = TestContext::new();
    ctx.transport.enqueue(
        Method::Post,
        "/auth/login",
        Reply::json(200, json!({ "message": "ok" })),
    );

    let result = ctx.client.login("ana@example.com", "pw").await;

    assert!(matches!(result, Err(AuthError::InvalidResponse(_))));
    assert!(!ctx.tokens.has_token());
}

#[tokio::test]
async fn test_login_bad_credentials_surface_server_message() {
    let ctx = TestContext::new();
    ctx.transport.enqueue(
        Method::Post,
        "/auth/login",
        Reply::json(400, json!("Invalid email or password")),
    );

    let result = ctx.client.login("ana@example.com", "wrong").await;

    assert!(matches!(result, Err(AuthError::BadRequest(m)) if m == "Invalid email or password"));
    assert_eq!(ctx.transport.count(Method::Post, "/auth/refresh"), 0);
}

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "access-1", 3600, Some("refresh-1"));
    ctx.transport
        .enqueue(Method::Post, "/auth/logout", Reply::text(200, ""));
    ctx.transport
        .enqueue(Method::Post, "/auth/revoke", Reply::text(200, ""));

    ctx.client.logout().await;

    let logout = &ctx.transport.calls_to(Method::Post, "/auth/logout")[0];
    assert_eq!(logout.bearer.as_deref(), Some("access-1"));
    let revoke = &ctx.transport.calls_to(Method::Post, "/auth/revoke")[0];
    assert_eq!(revoke.body, Some(json!({ "refreshToken": "refresh-1" })));
    assert!(!ctx.tokens.has_token());
    assert_eq!(ctx.tokens.get_refresh_token(), None);
}

#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let ctx = TestContext::new();
    seed_tokens(&ctx, "access-1", 3600, Some("refresh-1"));
    ctx.transport.enqueue(
        Method::Post,
        "/auth/logout",
        Reply::Fail("connection reset".to_string()),
    );
    ctx.transport
        .enqueue(Method::Post, "/auth/revoke", Reply::text(500, ""));

    ctx.client.logout().await;

    assert!(!ctx.tokens.has_token());
    assert_eq!(ctx.tokens.get_refresh_token(), None);
}
