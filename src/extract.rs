use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::ACCEPT_LANGUAGE, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_messages::Messages;
use oauth2::{url::form_urlencoded, CsrfToken};
use tower_sessions::Session;

use crate::{
    context::{AppContext, RenderContext},
    error::BaseplateError,
};

pub const AUTH_USER_KEY: &str = "auth.user";
pub const CSRF_TOKEN_KEY: &str = "csrf.token";

/// The session's anti-forgery token, generated on first use.
pub async fn csrf_token(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(token) = session.get::<String>(CSRF_TOKEN_KEY).await? {
        return Ok(token);
    }

    let token = CsrfToken::new_random().secret().clone();
    session.insert(CSRF_TOKEN_KEY, &token).await?;

    Ok(token)
}

/// The primary language tag of the first `Accept-Language` entry, lowercased.
pub fn locale_code(headers: &HeaderMap, default_locale: &str) -> String {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|entry| entry.split(';').next().unwrap_or_default().trim())
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .unwrap_or(default_locale)
        .to_lowercase()
}

pub fn is_partial(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Everything a page render needs from the incoming request.
///
/// Flash messages are only drained when [`RequestState::render_context`] is asked to show
/// them, so responses that never render the message list (redirects, static files, partial
/// updates of a region without it) leave them queued.
pub struct RequestState {
    pub session: Session,
    pub messages: Messages,
    pub locale_code: String,
    pub partial: bool,
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequestState
where
    S: Send + Sync,
    AppContext: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = AppContext::from_ref(state);
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, reason)| (status, String::from(reason)))?;
        let messages = Messages::from_request_parts(parts, state)
            .await
            .map_err(|(status, reason)| (status, String::from(reason)))?;

        Ok(Self {
            session,
            messages,
            locale_code: locale_code(&parts.headers, &context.config().default_locale),
            partial: is_partial(&parts.headers),
        })
    }
}

impl RequestState {
    pub async fn render_context(self, with_messages: bool) -> Result<RenderContext, BaseplateError> {
        let user = self.session.get::<String>(AUTH_USER_KEY).await?;
        let token = csrf_token(&self.session).await?;

        let mut ctx = RenderContext::new(self.locale_code)
            .authenticated(user.is_some())
            .with_csrf_token(token);
        if with_messages {
            ctx = ctx.with_messages(self.messages.into_iter().map(Into::into));
        }
        if let Some(user) = user {
            ctx = ctx.with_var("user", user);
        }

        Ok(ctx)
    }
}

/// The login page, returning to `next` afterwards.
pub fn login_url(next: &str) -> String {
    let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/login?next={next}")
}

/// The signed in user's name. Anonymous requests are redirected to the login page.
pub struct CurrentUser(pub String);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let user = session
            .get::<String>(AUTH_USER_KEY)
            .await
            .map_err(|e| BaseplateError::from(e).into_response())?;

        match user {
            Some(user) => Ok(Self(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|path| path.as_str())
                    .unwrap_or("/");
                Err(Redirect::to(&login_url(next)).into_response())
            }
        }
    }
}
