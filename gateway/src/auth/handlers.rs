//! Login page, login and logout.

use axum::extract::{FromRequest, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};

use super::errors::AuthError;
use super::middleware::{session_token, SESSION_COOKIE};
use super::models::LoginForm;
use crate::http::AppState;

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>DealerDB sign in</title></head>
<body>
<form method="post" action="/login">
  <label>Username <input name="username" autocomplete="username" required></label>
  <label>Password <input name="password" type="password" autocomplete="current-password" required></label>
  <button type="submit">Sign in</button>
</form>
</body>
</html>
"#;

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// Accepts a urlencoded form (redirects to `/`) or JSON (returns the principal).
pub async fn login(State(state): State<AppState>, req: Request) -> Result<Response, AuthError> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let form = if is_json {
        Json::<LoginForm>::from_request(req, &state)
            .await
            .map(|Json(form)| form)
            .map_err(|rejection| AuthError::BadLogin(rejection.body_text()))?
    } else {
        Form::<LoginForm>::from_request(req, &state)
            .await
            .map(|Form(form)| form)
            .map_err(|rejection| AuthError::BadLogin(rejection.body_text()))?
    };

    let (principal, token) = state.auth.login(&form.username, &form.password).await?;
    let cookie = session_cookie(&token, state.auth.sessions().ttl().as_secs());

    let mut response = if is_json {
        Json(principal).into_response()
    } else {
        Redirect::to("/").into_response()
    };
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.auth.logout(token).await;
    }

    let mut response = (StatusCode::SEE_OTHER, [(header::LOCATION, "/login")]).into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, session_cookie("", 0));
    response
}

fn session_cookie(token: &str, max_age_secs: u64) -> HeaderValue {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    HeaderValue::from_str(&cookie)
        .unwrap_or_else(|_| HeaderValue::from_static("DEALERDB_SESSION=; Path=/; HttpOnly; Max-Age=0"))
}
