//! Session sign-in for the dashboard. Credential checks belong to an external identity
//! provider; this only records who is signed in.
use axum::{
    extract::Query,
    response::{IntoResponse, Redirect},
    Form,
};
use axum_messages::Messages;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::{error::BaseplateError, extract::AUTH_USER_KEY, page, view::LOGIN};

#[derive(Debug, Deserialize)]
pub struct NextUrl {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    next: Option<String>,
}

/// Only same-site paths are followed after login.
fn next_path(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => "/",
    }
}

pub async fn form(Query(NextUrl { next }): Query<NextUrl>) -> impl IntoResponse {
    page!(LOGIN, {
        "next" => next_path(next.as_deref()),
    })
}

pub async fn login(
    session: Session,
    messages: Messages,
    Form(input): Form<LoginForm>,
) -> Result<impl IntoResponse, BaseplateError> {
    let username = input.username.trim();
    if username.is_empty() {
        messages.error("Username is required");
        return Ok(Redirect::to("/login"));
    }

    session.cycle_id().await?;
    session.insert(AUTH_USER_KEY, username).await?;
    info!(username, "signed in");
    messages.success(format!("Welcome back, {username}!"));

    Ok(Redirect::to(next_path(input.next.as_deref())))
}

pub async fn logout(session: Session, messages: Messages) -> Result<impl IntoResponse, BaseplateError> {
    session.remove::<String>(AUTH_USER_KEY).await?;
    session.cycle_id().await?;
    messages.info("You have been logged out");

    Ok(Redirect::to("/login"))
}
