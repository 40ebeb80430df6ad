use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use webook::{app::build_app, state::AppState};

// ─── Test helpers ───────────────────────────────────────────────────────

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: String,
}

async fn send(app: &Router, req: Request<Body>) -> Reply {
    let res = app.clone().oneshot(req).await.expect("router is infallible");
    let status = res.status();
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = res.into_body().collect().await.expect("body").to_bytes();
    Reply {
        status,
        set_cookie,
        body: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    }
}

fn post_json(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

async fn signup(app: &Router, email: &str, password: &str, confirm: &str) -> String {
    let req = post_json(
        "/users/signup",
        json!({ "email": email, "password": password, "confirmPassword": confirm }),
        None,
    );
    let reply = send(app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.body
}

async fn login(app: &Router, email: &str, password: &str) -> Reply {
    let req = post_json(
        "/users/login",
        json!({ "email": email, "password": password }),
        None,
    );
    send(app, req).await
}

/// Logs in and returns the `name=value` pair to send back as a Cookie header.
async fn session_cookie(app: &Router, email: &str, password: &str) -> String {
    let reply = login(app, email, password).await;
    assert_eq!(reply.body, "登陆成功");
    let set_cookie = reply.set_cookie.expect("login sets a cookie");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

// ─── Tests ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn signup_and_login_scenario() {
    let app = build_app(AppState::fake());

    assert_eq!(signup(&app, "a@b.com", "Aa#123456", "Aa#123456").await, "注册成功");
    assert_eq!(signup(&app, "a@b.com", "Aa#123456", "Aa#123456").await, "该邮箱已被注册");

    let ok = login(&app, "a@b.com", "Aa#123456").await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body, "登陆成功");
    let cookie = ok.set_cookie.expect("session cookie");
    assert!(cookie.starts_with("ssid="));
    assert!(cookie.contains("Max-Age=900"));

    let wrong = login(&app, "a@b.com", "wrong").await;
    assert_eq!(wrong.status, StatusCode::OK);
    assert_eq!(wrong.body, "用户名或密码错误");
    assert!(wrong.set_cookie.is_none());

    let unknown = login(&app, "nobody@b.com", "Aa#123456").await;
    assert_eq!(unknown.body, wrong.body);
}

#[tokio::test]
async fn signup_validation_messages() {
    let app = build_app(AppState::fake());

    assert_eq!(signup(&app, "a@b", "Aa#123456", "Aa#123456").await, "非法邮箱格式");
    assert_eq!(
        signup(&app, "a@b.com", "Aa#123456", "Aa#123457").await,
        "两次输入的密码不一致"
    );
    assert_eq!(
        signup(&app, "a@b.com", "abcdefgh", "abcdefgh").await,
        "密码必须包含字母、数字、特殊字符，并且不少于八位"
    );
    // nothing was stored by the rejected attempts
    assert_eq!(signup(&app, "a@b.com", "Aa#123456", "Aa#123456").await, "注册成功");
}

#[tokio::test]
async fn malformed_body_is_rejected_before_the_handler() {
    let app = build_app(AppState::fake());
    let req = Request::builder()
        .method("POST")
        .uri("/users/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let reply = send(&app, req).await;
    assert!(reply.status.is_client_error());
}

#[tokio::test]
async fn edit_then_profile_round_trips_birthday() {
    let app = build_app(AppState::fake());
    signup(&app, "a@b.com", "Aa#123456", "Aa#123456").await;
    let cookie = session_cookie(&app, "a@b.com", "Aa#123456").await;

    let edit = send(
        &app,
        post_json(
            "/users/edit",
            json!({ "nickname": "neo", "birthday": "1990-01-15", "aboutMe": "hello" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(edit.status, StatusCode::OK);
    assert_eq!(edit.body, "更新成功");

    let profile = send(&app, get("/users/profile", Some(&cookie))).await;
    assert_eq!(profile.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&profile.body).expect("json profile");
    assert_eq!(
        body,
        json!({
            "nickname": "neo",
            "email": "a@b.com",
            "aboutMe": "hello",
            "birthday": "1990-01-15",
        })
    );

    // credentials are untouched by the edit
    assert_eq!(login(&app, "a@b.com", "Aa#123456").await.body, "登陆成功");
}

#[tokio::test]
async fn profile_before_any_edit_has_epoch_birthday() {
    let app = build_app(AppState::fake());
    signup(&app, "a@b.com", "Aa#123456", "Aa#123456").await;
    let cookie = session_cookie(&app, "a@b.com", "Aa#123456").await;

    let profile = send(&app, get("/users/profile", Some(&cookie))).await;
    let body: Value = serde_json::from_str(&profile.body).expect("json profile");
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["nickname"], "");
    assert_eq!(body["birthday"], "1970-01-01");
}

#[tokio::test]
async fn edit_rejects_bad_birthday() {
    let app = build_app(AppState::fake());
    signup(&app, "a@b.com", "Aa#123456", "Aa#123456").await;
    let cookie = session_cookie(&app, "a@b.com", "Aa#123456").await;

    for birthday in ["1990-13-01", "+1990-01-15", "-0001-01-15"] {
        let reply = send(
            &app,
            post_json(
                "/users/edit",
                json!({ "nickname": "neo", "birthday": birthday, "aboutMe": "" }),
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(reply.body, "非法的生日格式", "{birthday} should be rejected");
    }

    // nothing was written by the rejected edits
    let profile = send(&app, get("/users/profile", Some(&cookie))).await;
    let body: Value = serde_json::from_str(&profile.body).expect("json profile");
    assert_eq!(body["birthday"], "1970-01-01");
}

#[tokio::test]
async fn protected_routes_need_a_valid_session() {
    let app = build_app(AppState::fake());

    let no_cookie = send(&app, get("/users/profile", None)).await;
    assert_eq!(no_cookie.status, StatusCode::UNAUTHORIZED);

    let forged = send(&app, get("/users/profile", Some("ssid=forged.token.value"))).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

    let edit = send(
        &app,
        post_json(
            "/users/edit",
            json!({ "nickname": "x", "birthday": "1990-01-15", "aboutMe": "" }),
            None,
        ),
    )
    .await;
    assert_eq!(edit.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app(AppState::fake());
    let reply = send(&app, get("/health", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "ok");
}
