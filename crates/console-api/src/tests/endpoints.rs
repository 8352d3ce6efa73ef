use super::fixture;
use crate::{ContactDraft, ContactType, IncidentTypeDraft, ProfileUpdate};
use console_auth::{AuthError, Method};
use serde_json::json;

#[tokio::test]
async fn test_admin_exists_reads_flag_and_swallows_errors() {
    let f = fixture();
    f.transport.reply(200, json!({ "exists": true }));
    assert!(f.api.admin_exists().await);
    assert_eq!(f.transport.last().bearer, None);

    f.transport.reply(200, json!({ "Exists": false }));
    assert!(!f.api.admin_exists().await);

    f.transport.fail("connection refused");
    assert!(!f.api.admin_exists().await);

    f.transport.reply_text(500, "boom");
    assert!(!f.api.admin_exists().await);
}

#[tokio::test]
async fn test_admin_otp_flow_bodies() {
    let f = fixture();
    f.transport
        .reply(200, json!({ "expiresAt": "2030-01-01T00:10:00Z" }));
    let dispatch = f.api.send_admin_otp("chief@cebu.gov").await.unwrap();
    assert!(dispatch.expiry().is_some());
    let call = f.transport.last();
    assert_eq!(call.method, Method::Post);
    assert_eq!(call.url.path(), "/api/v1/auth/send-admin-otp");
    assert_eq!(call.body, Some(json!({ "email": "chief@cebu.gov" })));
    assert_eq!(call.bearer, None);

    f.api
        .verify_admin_otp("chief@cebu.gov", "123456")
        .await
        .unwrap();
    assert_eq!(
        f.transport.last().body,
        Some(json!({ "email": "chief@cebu.gov", "otp": "123456" }))
    );

    f.api
        .create_admin_with_otp("chief@cebu.gov", "123456", "Str0ng!Passw#rd")
        .await
        .unwrap();
    let call = f.transport.last();
    assert_eq!(call.url.path(), "/api/v1/auth/create-admin-with-otp");
    assert_eq!(call.body.unwrap()["password"], "Str0ng!Passw#rd");
}

#[tokio::test]
async fn test_send_admin_otp_empty_body_has_no_expiry() {
    let f = fixture();
    f.transport.reply_text(200, "");
    let dispatch = f.api.send_admin_otp("chief@cebu.gov").await.unwrap();
    assert_eq!(dispatch.expiry(), None);
}

#[tokio::test]
async fn test_invalid_otp_surfaces_server_message() {
    let f = fixture();
    f.transport
        .reply(400, json!({ "message": "Invalid or expired OTP" }));
    let err = f
        .api
        .verify_admin_otp("chief@cebu.gov", "000000")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::BadRequest(m) if m == "Invalid or expired OTP"));
}

#[tokio::test]
async fn test_password_reset_uses_verification_code_field() {
    let f = fixture();
    f.api.forgot_password("ana@cebu.gov").await.unwrap();
    assert_eq!(
        f.transport.last().url.path(),
        "/api/v1/auth/forgot-password"
    );

    f.api
        .verify_forgot_password_otp("ana@cebu.gov", "654321")
        .await
        .unwrap();
    assert_eq!(
        f.transport.last().body,
        Some(json!({ "email": "ana@cebu.gov", "verificationCode": "654321" }))
    );

    f.api
        .reset_password("ana@cebu.gov", "654321", "N3w!Secure#Key")
        .await
        .unwrap();
    assert_eq!(
        f.transport.last().body,
        Some(json!({
            "email": "ana@cebu.gov",
            "verificationCode": "654321",
            "newPassword": "N3w!Secure#Key"
        }))
    );
}

#[tokio::test]
async fn test_change_password_query_is_encoded() {
    let f = fixture();
    f.api.change_password("old pass", "n&w=Pass!").await.unwrap();

    let call = f.transport.last();
    assert_eq!(call.method, Method::Post);
    assert_eq!(call.url.path(), "/api/v1/iam/change-pass");
    assert_eq!(call.body, None);
    assert_eq!(call.bearer.as_deref(), Some("access-1"));
    let pairs: Vec<(String, String)> = call
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("currentPassword".to_string(), "old pass".to_string()),
            ("newPassword".to_string(), "n&w=Pass!".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_profile_and_update() {
    let f = fixture();
    f.transport.reply(
        200,
        json!({
            "Id": "u1",
            "FirstName": "Ana",
            "LastName": "Cruz",
            "Email": "ana@cebu.gov",
            "RoleId": 1,
            "IsEmailVerified": true
        }),
    );
    let profile = f.api.profile().await.unwrap();
    assert_eq!(profile.first_name, "Ana");
    assert_eq!(profile.role_label(), "Admin");

    let mut update = ProfileUpdate::from_profile(&profile);
    update.phone_number = "+63 917 000 0000".into();
    f.api.update_profile(&update).await.unwrap();

    let call = f.transport.last();
    assert_eq!(call.url.path(), "/api/v1/iam/update");
    let body = call.body.unwrap();
    assert_eq!(body["phoneNumber"], "+63 917 000 0000");
    assert_eq!(body["email"], "ana@cebu.gov");
}

#[tokio::test]
async fn test_login_history_decodes_entries() {
    let f = fixture();
    f.transport.reply(
        200,
        json!([
            {
                "id": 1,
                "ipAddress": "10.0.0.1",
                "userAgent": "Firefox",
                "loginTimestamp": "2025-01-01T08:00:00",
                "loginStatus": "Success",
                "isActive": true
            },
            {
                "Id": 2,
                "IpAddress": "10.0.0.2",
                "UserAgent": "curl",
                "LoginTimestamp": "2025-01-02T08:00:00",
                "LoginStatus": "Failed",
                "FailureReason": "Invalid password"
            }
        ]),
    );

    let history = f.api.login_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].is_active);
    assert_eq!(history[1].failure_reason.as_deref(), Some("Invalid password"));
    assert_eq!(
        f.transport.last().url.path(),
        "/api/v1/auth/my-login-history"
    );
}

#[tokio::test]
async fn test_lists_tolerate_non_array_bodies() {
    let f = fixture();
    f.transport.reply_text(200, "");
    assert!(f.api.users().await.unwrap().is_empty());

    f.transport.reply(200, json!({ "message": "no users" }));
    assert!(f.api.users().await.unwrap().is_empty());

    f.transport.reply(200, json!([{ "id": 1, "roleId": "admin" }]));
    assert!(matches!(
        f.api.users().await,
        Err(AuthError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_contact_crud() {
    let f = fixture();
    f.transport.reply(
        200,
        json!({ "Id": 7, "Name": "Hospital", "Type": "phone", "Value": "911", "Description": "ER" }),
    );
    let created = f
        .api
        .create_contact(&ContactDraft {
            name: "Hospital".into(),
            description: "ER".into(),
            contact_type: ContactType::Phone,
            value: "911".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "7");
    assert_eq!(f.transport.last().body.unwrap()["type"], "phone");

    let mut edited = created.clone();
    edited.value = "117".into();
    f.api.update_contact(&edited).await.unwrap();
    let call = f.transport.last();
    assert_eq!(call.method, Method::Put);
    assert_eq!(call.url.path(), "/api/v1/admin/contact");
    assert_eq!(call.body.unwrap()["id"], "7");

    f.api.delete_contact("7").await.unwrap();
    let call = f.transport.last();
    assert_eq!(call.method, Method::Delete);
    assert_eq!(call.url.path(), "/api/v1/admin/contact/7");
}

#[tokio::test]
async fn test_invalid_id_is_rejected_before_sending() {
    let f = fixture();
    let err = f.api.delete_contact("../users").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidInput(_)));
    assert!(f.transport.calls().is_empty());
}

#[tokio::test]
async fn test_incident_type_lifecycle() {
    let f = fixture();
    let draft = IncidentTypeDraft {
        id: None,
        name_of_incident: "Flood".into(),
        description: "Rising water".into(),
        is_active: true,
        is_bfp_true: false,
        is_pnp_true: true,
        who_added_it_id: "u1".into(),
    };

    f.api.create_incident_type(&draft).await.unwrap();
    let call = f.transport.last();
    assert_eq!(call.url.path(), "/api/v1/TypeOfIncident");
    let body = call.body.unwrap();
    assert!(body.get("id").is_none());
    assert_eq!(body["isPNPTrue"], true);

    f.api.update_incident_type("9", &draft).await.unwrap();
    let call = f.transport.last();
    assert_eq!(call.method, Method::Put);
    assert_eq!(call.url.path(), "/api/v1/TypeOfIncident/9");
    assert_eq!(call.body.unwrap()["id"], "9");

    f.api.deactivate_incident_type("9").await.unwrap();
    let call = f.transport.last();
    assert_eq!(call.method, Method::Delete);
    assert_eq!(call.url.path(), "/api/v1/TypeOfIncident/9");

    f.api.reactivate_incident_type("9").await.unwrap();
    let call = f.transport.last();
    assert_eq!(call.method, Method::Patch);
    assert_eq!(call.url.path(), "/api/v1/TypeOfIncident/9/reactivate");

    f.transport.reply(
        200,
        json!([{ "Id": 9, "NameOfIncident": "Flood", "IsActive": false, "isPNPTrue": true }]),
    );
    let incidents = f.api.incident_types().await.unwrap();
    assert_eq!(incidents[0].name_of_incident, "Flood");
    assert!(!incidents[0].is_active);
    assert_eq!(f.transport.last().url.path(), "/api/v1/TypeOfIncident/all");
}

#[tokio::test]
async fn test_authenticated_calls_carry_bearer() {
    let f = fixture();
    f.transport.reply(200, json!([]));
    f.api.contacts().await.unwrap();
    assert_eq!(f.transport.last().bearer.as_deref(), Some("access-1"));
    assert!(f.tokens.has_token());
}
