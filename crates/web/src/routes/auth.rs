//! Authentication pages: signup, login, logout.

use axum::{
    Router,
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use quill_common::{AppError, AppResult};
use quill_core::CreateUserInput;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::extractors::MaybeAuthUser;
use crate::routes::redirect_found;
use crate::session::{clear_session_cookie, set_session_cookie};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(signup_form).post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", get(logout).post(logout))
}

/// Signup form payload.
#[derive(Debug, Deserialize)]
struct SignupForm {
    username: String,
    password: String,
    #[serde(default)]
    display_name: String,
}

/// Login form payload. `next` round-trips the originally requested path.
#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
    next: Option<String>,
}

/// `?next=` query on the login page.
#[derive(Debug, Default, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

async fn signup_form(State(state): State<AppState>) -> AppResult<Response> {
    render_signup(&state, "", None)
}

/// Create an account, then send the user to the login page.
async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let input = CreateUserInput {
        username: form.username.clone(),
        password: form.password,
        display_name: (!form.display_name.is_empty()).then_some(form.display_name),
    };

    match state.user_service.create(input).await {
        Ok(_) => Ok(redirect_found("/auth/login/")),
        Err(AppError::Validation(message) | AppError::BadRequest(message)) => {
            render_signup(&state, &form.username, Some(&message))
        }
        Err(e) => Err(e),
    }
}

async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> AppResult<Response> {
    render_login(&state, "", query.next.as_deref(), None)
}

/// Verify credentials, open a session, and follow `next` (or go home).
async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.user_service.login(&form.username, &form.password).await {
        Ok((_user, token)) => {
            set_session_cookie(&cookies, token);
            let target = form.next.as_deref().filter(|n| !n.is_empty()).unwrap_or("/");
            Ok(redirect_found(target))
        }
        Err(AppError::Unauthorized) => render_login(
            &state,
            &form.username,
            form.next.as_deref(),
            Some("Invalid username or password"),
        ),
        Err(e) => Err(e),
    }
}

/// Close the session and go home.
async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<Response> {
    if let Some(user) = user {
        state.user_service.logout(&user.id).await?;
    }
    clear_session_cookie(&cookies);

    Ok(redirect_found("/"))
}

fn render_signup(state: &AppState, username: &str, error: Option<&str>) -> AppResult<Response> {
    let mut ctx = tera::Context::new();
    ctx.insert("username", username);
    ctx.insert("error", &error);
    let body = state.render("signup.html.tera", &ctx)?;

    Ok(Html(body).into_response())
}

fn render_login(
    state: &AppState,
    username: &str,
    next: Option<&str>,
    error: Option<&str>,
) -> AppResult<Response> {
    let mut ctx = tera::Context::new();
    ctx.insert("username", username);
    ctx.insert("next", &next);
    ctx.insert("error", &error);
    let body = state.render("login.html.tera", &ctx)?;

    Ok(Html(body).into_response())
}
