/// Integration tests for the Ganttrack API
///
/// These tests verify the full system works end-to-end:
/// - Session lifecycle (login, check, logout)
/// - Admin-gated user management
/// - Personal-project ownership enforcement
/// - Cascade deletion of a project's tasks
/// - Assignee-list round-trips through storage

mod common;

use axum::http::StatusCode;
use common::{body_json, request, session_cookie_from, TestContext, TEST_PASSWORD};
use ganttrack_shared::db::bootstrap::{seed_default_admin, BootstrapAdmin};
use ganttrack_shared::models::task::Task;
use serde_json::json;
use tower::Service as _;

/// Login, check, and logout against the seeded member account
#[tokio::test]
async fn test_login_check_logout_flow() {
    let ctx = TestContext::new().await.unwrap();

    // Login with valid credentials
    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": ctx.user.email, "password": TEST_PASSWORD})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_from(&response).expect("Login should set a session cookie");
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], ctx.user.email.as_str());
    assert_eq!(body["user"]["full_name"], "Test Member");

    // Check reports authenticated with the matching profile
    let response = ctx
        .app
        .clone()
        .call(request("GET", "/api/auth/check", Some(&cookie), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authenticated"], json!(true));
    assert_eq!(body["user"]["id"], json!(ctx.user.id));

    // Logout clears the cookie
    let response = ctx
        .app
        .clone()
        .call(request("POST", "/api/auth/logout", Some(&cookie), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = session_cookie_from(&response).unwrap();
    assert_eq!(cleared, "ganttrack_session=");

    // Without a cookie, check reports unauthenticated
    let response = ctx
        .app
        .clone()
        .call(request("GET", "/api/auth/check", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authenticated"], json!(false));
    assert!(body.get("user").is_none());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_missing_fields() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": ctx.user.email})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": ctx.user.email, "password": "wrong-password"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_me_requires_session() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(request("GET", "/api/auth/me", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = ctx.session_cookie_for(&ctx.user);
    let response = ctx
        .app
        .clone()
        .call(request("GET", "/api/auth/me", Some(&cookie), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], json!(ctx.user.id));
    assert!(body.get("password_hash").is_none());

    ctx.cleanup().await.unwrap();
}

/// A non-admin session gets 403 on every user mutation
#[tokio::test]
async fn test_non_admin_cannot_manage_users() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.user);

    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            "/api/users",
            Some(&cookie),
            Some(json!({
                "last_name": "New", "first_name": "User",
                "email": "new@example.com", "password": "Passw0rd!"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .call(request(
            "PUT",
            &format!("/api/users/{}", ctx.admin.id),
            Some(&cookie),
            Some(json!({"last_name": "Hacked"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/users/{}", ctx.admin.id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Admin creates a user; a second create with the same email fails 400
#[tokio::test]
async fn test_create_user_and_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.admin);
    let email = format!("dup-{}@example.com", uuid::Uuid::new_v4());

    let payload = json!({
        "last_name": "Suzuki", "first_name": "Hanako",
        "email": email, "password": "Passw0rd!"
    });

    let response = ctx
        .app
        .clone()
        .call(request("POST", "/api/users", Some(&cookie), Some(payload.clone())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["full_name"], "Suzuki Hanako");
    assert_eq!(body["is_admin"], json!(false));
    assert!(body.get("password_hash").is_none());
    let created_id = body["id"].as_i64().unwrap();

    // Same email again: 400, no second row
    let response = ctx
        .app
        .clone()
        .call(request("POST", "/api/users", Some(&cookie), Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let response = ctx
        .app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/users/{}", created_id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    ctx.cleanup().await.unwrap();
}

/// The detail view reports has_password without ever leaking the hash
#[tokio::test]
async fn test_user_detail_has_password_flag() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.user);

    let response = ctx
        .app
        .clone()
        .call(request(
            "GET",
            &format!("/api/users/{}", ctx.user.id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["has_password"], json!(true));
    assert!(body.get("password_hash").is_none());

    ctx.cleanup().await.unwrap();
}

/// Only the owner may edit or delete a personal project
#[tokio::test]
async fn test_personal_project_ownership() {
    let ctx = TestContext::new().await.unwrap();
    let owner_cookie = ctx.session_cookie_for(&ctx.user);
    let other_cookie = ctx.session_cookie_for(&ctx.admin);

    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            "/api/projects",
            Some(&owner_cookie),
            Some(json!({"name": "My Plan", "is_personal": true})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["owner_id"], json!(ctx.user.id));
    assert_eq!(body["is_personal"], json!(true));
    let project_id = body["id"].as_i64().unwrap();

    // Someone else (admin or not) may not edit a personal project
    let response = ctx
        .app
        .clone()
        .call(request(
            "PUT",
            &format!("/api/projects/{}", project_id),
            Some(&other_cookie),
            Some(json!({"name": "Taken over"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner may
    let response = ctx
        .app
        .clone()
        .call(request(
            "PUT",
            &format!("/api/projects/{}", project_id),
            Some(&owner_cookie),
            Some(json!({"name": "My Plan v2"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "My Plan v2");

    // Same rule for deletion
    let response = ctx
        .app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&other_cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&owner_cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    ctx.cleanup().await.unwrap();
}

/// Personal projects appear only in the owner's personal listing
#[tokio::test]
async fn test_project_listings_split_shared_and_personal() {
    let ctx = TestContext::new().await.unwrap();
    let owner_cookie = ctx.session_cookie_for(&ctx.user);
    let other_cookie = ctx.session_cookie_for(&ctx.admin);

    let shared = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                "/api/projects",
                Some(&owner_cookie),
                Some(json!({"name": "Team Roadmap"})),
            ))
            .await
            .unwrap(),
    )
    .await;
    let personal = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                "/api/projects",
                Some(&owner_cookie),
                Some(json!({"name": "Side Notes", "is_personal": true})),
            ))
            .await
            .unwrap(),
    )
    .await;

    let shared_id = shared["id"].as_i64().unwrap();
    let personal_id = personal["id"].as_i64().unwrap();
    assert_eq!(shared["owner_id"], json!(null));

    // Shared listing carries the shared project but not the personal one
    let body = body_json(
        ctx.app
            .clone()
            .call(request("GET", "/api/projects", Some(&other_cookie), None))
            .await
            .unwrap(),
    )
    .await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&shared_id));
    assert!(!ids.contains(&personal_id));

    // Personal listing is scoped to the caller
    let body = body_json(
        ctx.app
            .clone()
            .call(request(
                "GET",
                "/api/projects/personal",
                Some(&other_cookie),
                None,
            ))
            .await
            .unwrap(),
    )
    .await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert!(!ids.contains(&personal_id));

    let body = body_json(
        ctx.app
            .clone()
            .call(request(
                "GET",
                "/api/projects/personal",
                Some(&owner_cookie),
                None,
            ))
            .await
            .unwrap(),
    )
    .await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&personal_id));

    // Cleanup
    for id in [shared_id, personal_id] {
        ctx.app
            .clone()
            .call(request(
                "DELETE",
                &format!("/api/projects/{}", id),
                Some(&owner_cookie),
                None,
            ))
            .await
            .unwrap();
    }
    ctx.cleanup().await.unwrap();
}

/// Deleting a project removes all of its tasks
#[tokio::test]
async fn test_project_delete_cascades_tasks() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.user);

    let project = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                "/api/projects",
                Some(&cookie),
                Some(json!({"name": "Doomed"})),
            ))
            .await
            .unwrap(),
    )
    .await;
    let project_id = project["id"].as_i64().unwrap();

    let mut task_ids = Vec::new();
    for name in ["Design", "Build"] {
        let task = body_json(
            ctx.app
                .clone()
                .call(request(
                    "POST",
                    &format!("/api/projects/{}/tasks", project_id),
                    Some(&cookie),
                    Some(json!({
                        "name": name,
                        "start_date": "2024-01-01",
                        "end_date": "2024-01-10"
                    })),
                ))
                .await
                .unwrap(),
        )
        .await;
        task_ids.push(task["id"].as_i64().unwrap());
    }

    let response = ctx
        .app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for task_id in task_ids {
        let response = ctx
            .app
            .clone()
            .call(request(
                "GET",
                &format!("/api/tasks/{}", task_id),
                Some(&cookie),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert!(Task::find_by_id(&ctx.db, task_id).await.unwrap().is_none());
    }

    ctx.cleanup().await.unwrap();
}

/// Assignee lists round-trip with order and duplicates preserved
#[tokio::test]
async fn test_task_assignee_roundtrip() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.user);

    let project = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                "/api/projects",
                Some(&cookie),
                Some(json!({"name": "Assignments"})),
            ))
            .await
            .unwrap(),
    )
    .await;
    let project_id = project["id"].as_i64().unwrap();

    let task = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                &format!("/api/projects/{}/tasks", project_id),
                Some(&cookie),
                Some(json!({
                    "name": "Review",
                    "start_date": "2024-02-01",
                    "end_date": "2024-02-03",
                    "assignee_ids": [3, 7, 3]
                })),
            ))
            .await
            .unwrap(),
    )
    .await;
    let task_id = task["id"].as_i64().unwrap();
    assert_eq!(task["assignee_ids"], json!([3, 7, 3]));

    let body = body_json(
        ctx.app
            .clone()
            .call(request(
                "GET",
                &format!("/api/tasks/{}", task_id),
                Some(&cookie),
                None,
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["assignee_ids"], json!([3, 7, 3]));

    // Clearing the list round-trips to [], never [""]
    let body = body_json(
        ctx.app
            .clone()
            .call(request(
                "PUT",
                &format!("/api/tasks/{}", task_id),
                Some(&cookie),
                Some(json!({"assignee_ids": []})),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["assignee_ids"], json!([]));

    ctx.app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Task creation applies the documented defaults
#[tokio::test]
async fn test_task_creation_defaults() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.user);

    let project = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                "/api/projects",
                Some(&cookie),
                Some(json!({"name": "Defaults"})),
            ))
            .await
            .unwrap(),
    )
    .await;
    let project_id = project["id"].as_i64().unwrap();

    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            &format!("/api/projects/{}/tasks", project_id),
            Some(&cookie),
            Some(json!({
                "name": "Design",
                "start_date": "2024-01-01",
                "end_date": "2024-01-10"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["progress"], json!(0));
    assert_eq!(body["is_milestone"], json!(false));
    assert_eq!(body["is_completed"], json!(false));
    assert_eq!(body["assignee_ids"], json!([]));
    assert_eq!(body["start_date"], "2024-01-01");
    assert_eq!(body["end_date"], "2024-01-10");

    ctx.app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Missing required task fields and bad dates answer 400
#[tokio::test]
async fn test_task_validation_errors() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.user);

    let project = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                "/api/projects",
                Some(&cookie),
                Some(json!({"name": "Validation"})),
            ))
            .await
            .unwrap(),
    )
    .await;
    let project_id = project["id"].as_i64().unwrap();
    let tasks_uri = format!("/api/projects/{}/tasks", project_id);

    // No name
    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            &tasks_uri,
            Some(&cookie),
            Some(json!({"start_date": "2024-01-01", "end_date": "2024-01-10"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No dates
    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            &tasks_uri,
            Some(&cookie),
            Some(json!({"name": "No dates"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unparsable date
    let response = ctx
        .app
        .clone()
        .call(request(
            "POST",
            &tasks_uri,
            Some(&cookie),
            Some(json!({
                "name": "Bad date",
                "start_date": "01/01/2024",
                "end_date": "2024-01-10"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());

    // Unknown project
    let response = ctx
        .app
        .clone()
        .call(request(
            "GET",
            "/api/projects/999999999/tasks",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Partial task updates leave unsupplied fields untouched
#[tokio::test]
async fn test_task_partial_update() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie_for(&ctx.user);

    let project = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                "/api/projects",
                Some(&cookie),
                Some(json!({"name": "Partial"})),
            ))
            .await
            .unwrap(),
    )
    .await;
    let project_id = project["id"].as_i64().unwrap();

    let task = body_json(
        ctx.app
            .clone()
            .call(request(
                "POST",
                &format!("/api/projects/{}/tasks", project_id),
                Some(&cookie),
                Some(json!({
                    "name": "Implement",
                    "start_date": "2024-03-01",
                    "end_date": "2024-03-15",
                    "memo": "keep me"
                })),
            ))
            .await
            .unwrap(),
    )
    .await;
    let task_id = task["id"].as_i64().unwrap();

    let body = body_json(
        ctx.app
            .clone()
            .call(request(
                "PUT",
                &format!("/api/tasks/{}", task_id),
                Some(&cookie),
                Some(json!({"progress": 60, "is_completed": true})),
            ))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(body["progress"], json!(60));
    assert_eq!(body["is_completed"], json!(true));
    assert_eq!(body["name"], "Implement");
    assert_eq!(body["memo"], "keep me");
    assert_eq!(body["start_date"], "2024-03-01");

    ctx.app
        .clone()
        .call(request(
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Admin seeding is a no-op once an admin exists
#[tokio::test]
async fn test_bootstrap_seed_is_idempotent() {
    let ctx = TestContext::new().await.unwrap();

    // The context already seeded an admin, so the bootstrap must decline
    let admin = BootstrapAdmin {
        email: "bootstrap@example.com".to_string(),
        password: "Bootstrap1!".to_string(),
    };
    let created = seed_default_admin(&ctx.db, &admin).await.unwrap();
    assert!(!created);

    ctx.cleanup().await.unwrap();
}
