//! `/users` endpoints. Every outcome is a 200; the body text tells the client
//! what happened.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{AuthUser, SessionKeys},
    state::AppState,
    users::{
        domain::{format_birthday, parse_birthday, ProfileUpdate},
        dto::{EditRequest, LoginRequest, ProfileResponse, SignUpRequest},
        services::ServiceError,
        validation::{is_valid_email, is_valid_password},
    },
};

pub const MSG_SYSTEM_ERROR: &str = "系统错误";
pub const MSG_SIGNUP_OK: &str = "注册成功";
pub const MSG_INVALID_EMAIL: &str = "非法邮箱格式";
pub const MSG_PASSWORD_MISMATCH: &str = "两次输入的密码不一致";
pub const MSG_WEAK_PASSWORD: &str = "密码必须包含字母、数字、特殊字符，并且不少于八位";
pub const MSG_DUPLICATE_EMAIL: &str = "该邮箱已被注册";
pub const MSG_LOGIN_OK: &str = "登陆成功";
pub const MSG_INVALID_CREDENTIALS: &str = "用户名或密码错误";
pub const MSG_EDIT_OK: &str = "更新成功";
pub const MSG_INVALID_BIRTHDAY: &str = "非法的生日格式";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(sign_up))
        .route("/users/login", post(login))
        .route("/users/edit", post(edit))
        .route("/users/profile", get(profile))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> &'static str {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return MSG_INVALID_EMAIL;
    }

    if payload.password != payload.confirm_password {
        warn!(email = %payload.email, "password confirmation mismatch");
        return MSG_PASSWORD_MISMATCH;
    }

    if !is_valid_password(&payload.password) {
        warn!(email = %payload.email, "password too weak");
        return MSG_WEAK_PASSWORD;
    }

    match state.users.sign_up(&payload.email, &payload.password).await {
        Ok(user_id) => {
            info!(user_id, email = %payload.email, "user registered");
            MSG_SIGNUP_OK
        }
        Err(ServiceError::DuplicateEmail) => {
            warn!(email = %payload.email, "email already registered");
            MSG_DUPLICATE_EMAIL
        }
        Err(e) => {
            error!(error = %e, "sign_up failed");
            MSG_SYSTEM_ERROR
        }
    }
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let user = match state.users.login(&payload.email, &payload.password).await {
        Ok(u) => u,
        Err(ServiceError::InvalidCredentials) => return MSG_INVALID_CREDENTIALS.into_response(),
        Err(e) => {
            error!(error = %e, "login failed");
            return MSG_SYSTEM_ERROR.into_response();
        }
    };

    let keys = SessionKeys::from_ref(&state);
    let token = match keys.sign(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, user_id = user.id, "session sign failed");
            return MSG_SYSTEM_ERROR.into_response();
        }
    };

    info!(user_id = user.id, email = %user.email, "user logged in");
    (jar.add(keys.cookie(token)), MSG_LOGIN_OK).into_response()
}

#[instrument(skip(state, payload))]
pub async fn edit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<EditRequest>,
) -> &'static str {
    let birthday = match parse_birthday(&payload.birthday) {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, user_id, birthday = %payload.birthday, "invalid birthday");
            return MSG_INVALID_BIRTHDAY;
        }
    };

    let update = ProfileUpdate {
        nickname: payload.nickname,
        birthday,
        about_me: payload.about_me,
    };
    match state.users.edit_non_sensitive(user_id, update).await {
        Ok(()) => {
            info!(user_id, "profile updated");
            MSG_EDIT_OK
        }
        Err(e) => {
            error!(error = %e, user_id, "edit failed");
            MSG_SYSTEM_ERROR
        }
    }
}

#[instrument(skip(state))]
pub async fn profile(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    let user = match state.users.profile(user_id).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, user_id, "profile lookup failed");
            return MSG_SYSTEM_ERROR.into_response();
        }
    };

    let birthday = match format_birthday(user.birthday) {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, user_id, "birthday format failed");
            return MSG_SYSTEM_ERROR.into_response();
        }
    };

    Json(ProfileResponse {
        nickname: user.nickname,
        email: user.email,
        about_me: user.about_me,
        birthday,
    })
    .into_response()
}
