//! Anti-forgery token injection for partial-update requests.
//!
//! The browser side is an inline script registered once per page load (see [`ClientScript`]).
//! Rust-side clients use either a [`RequestPipeline`] with a [`RequestAugmenter`] installed
//! on it, or the [`CsrfHeaderLayer`] tower middleware. All three set the same header to the
//! token captured when the page was rendered, and never fail: a missing token becomes an
//! empty header value and rejecting it is the server's job.
use std::task::{Context, Poll};

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use rinja::Template;
use tower::{Layer, Service};
use tracing::warn;

use crate::{context::RenderContext, fragment::Fragment};

pub const CSRF_HEADER: &str = "X-CSRFToken";

pub fn csrf_header_name() -> HeaderName {
    HeaderName::from_static("x-csrftoken")
}

fn header_value(token: &str) -> HeaderValue {
    if token.is_empty() {
        warn!("no anti-forgery token available; partial updates will be rejected");
    }

    HeaderValue::from_str(token).unwrap_or_else(|_| {
        warn!("anti-forgery token is not a valid header value; sending it empty");
        HeaderValue::from_static("")
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Http,
    WebSocket,
}

/// An outgoing asynchronous request that swaps part of the page.
#[derive(Clone, Debug)]
pub struct PartialRequest {
    pub channel: Channel,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: String,
}

impl PartialRequest {
    pub fn new(channel: Channel, method: Method, uri: Uri) -> Self {
        Self {
            channel,
            method,
            uri,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.headers
            .get(csrf_header_name())
            .and_then(|value| value.to_str().ok())
    }
}

/// Runs synchronously on every request a [`RequestPipeline`] dispatches.
pub trait Interceptor: Send + Sync {
    fn before_dispatch(&self, request: &mut PartialRequest);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterceptorId(usize);

/// The single owner of the interceptors applied to outgoing partial updates.
#[derive(Default)]
pub struct RequestPipeline {
    next_id: usize,
    interceptors: Vec<(InterceptorId, Box<dyn Interceptor>)>,
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, interceptor: impl Interceptor + 'static) -> InterceptorId {
        let id = InterceptorId(self.next_id);
        self.next_id += 1;
        self.interceptors.push((id, Box::new(interceptor)));
        id
    }

    pub fn remove(&mut self, id: InterceptorId) -> bool {
        let before = self.interceptors.len();
        self.interceptors.retain(|(existing, _)| *existing != id);
        self.interceptors.len() != before
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Applies every interceptor, in installation order, and hands the request back ready
    /// to send.
    pub fn dispatch(&self, mut request: PartialRequest) -> PartialRequest {
        for (_, interceptor) in &self.interceptors {
            interceptor.before_dispatch(&mut request);
        }
        request
    }
}

struct CsrfInterceptor {
    value: HeaderValue,
}

impl Interceptor for CsrfInterceptor {
    fn before_dispatch(&self, request: &mut PartialRequest) {
        request.headers.insert(csrf_header_name(), self.value.clone());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AugmenterState {
    Uninstalled,
    Installed(Vec<InterceptorId>),
}

/// Attaches the page's anti-forgery token to every dispatched partial request.
///
/// Install it once per page lifecycle. A second install registers a second interceptor and
/// the header is set twice per request.
#[derive(Debug)]
pub struct RequestAugmenter {
    value: HeaderValue,
    installed: Vec<InterceptorId>,
}

impl RequestAugmenter {
    pub fn new(token: &str) -> Self {
        Self {
            value: header_value(token),
            installed: vec![],
        }
    }

    pub fn from_context(ctx: &RenderContext) -> Self {
        Self::new(&ctx.csrf_token)
    }

    pub fn install(&mut self, pipeline: &mut RequestPipeline) -> InterceptorId {
        if !self.installed.is_empty() {
            warn!("request augmenter installed more than once; the interceptor will fire twice");
        }

        let id = pipeline.add(CsrfInterceptor {
            value: self.value.clone(),
        });
        self.installed.push(id);
        id
    }

    pub fn uninstall(&mut self, pipeline: &mut RequestPipeline) {
        for id in self.installed.drain(..) {
            pipeline.remove(id);
        }
    }

    pub fn state(&self) -> AugmenterState {
        if self.installed.is_empty() {
            AugmenterState::Uninstalled
        } else {
            AugmenterState::Installed(self.installed.clone())
        }
    }
}

#[derive(Clone, Debug)]
pub struct CsrfHeaderLayer {
    value: HeaderValue,
}

impl CsrfHeaderLayer {
    pub fn new(token: &str) -> Self {
        Self {
            value: header_value(token),
        }
    }
}

impl<S> Layer<S> for CsrfHeaderLayer {
    type Service = CsrfHeader<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfHeader {
            inner,
            value: self.value.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CsrfHeader<S> {
    inner: S,
    value: HeaderValue,
}

impl<S, B> Service<Request<B>> for CsrfHeader<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        request
            .headers_mut()
            .insert(csrf_header_name(), self.value.clone());
        self.inner.call(request)
    }
}

#[derive(Template)]
#[template(path = "fragments/csrf_script.html")]
struct ClientScriptTemplate<'a> {
    header: &'a str,
    token: &'a str,
}

/// The in-page hook: sets the header on every htmx request and websocket send.
#[derive(Clone, Debug, Default)]
pub struct ClientScript;

impl ClientScript {
    /// The token as a JavaScript string literal that cannot close the surrounding script
    /// element.
    fn token_literal(token: &str) -> rinja::Result<String> {
        let literal =
            serde_json::to_string(token).map_err(|e| rinja::Error::Custom(Box::new(e)))?;
        Ok(literal.replace("</", "<\\/"))
    }
}

impl Fragment for ClientScript {
    fn render(&self, ctx: &RenderContext) -> rinja::Result<String> {
        let token = Self::token_literal(&ctx.csrf_token)?;

        ClientScriptTemplate {
            header: CSRF_HEADER,
            token: &token,
        }
        .render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::ServiceExt as _;

    fn request(channel: Channel) -> PartialRequest {
        PartialRequest::new(channel, Method::POST, Uri::from_static("/sidepanel"))
            .with_body("name=Acme")
    }

    #[test]
    fn every_dispatched_request_carries_the_token() {
        let mut pipeline = RequestPipeline::new();
        let mut augmenter = RequestAugmenter::new("abc123");
        augmenter.install(&mut pipeline);

        for channel in [Channel::Http, Channel::WebSocket, Channel::Http] {
            let sent = pipeline.dispatch(request(channel));
            assert_eq!(sent.csrf_token(), Some("abc123"));
        }
    }

    #[test]
    fn only_the_token_header_changes() {
        let mut pipeline = RequestPipeline::new();
        RequestAugmenter::new("abc123").install(&mut pipeline);

        let mut original = request(Channel::Http);
        original
            .headers
            .insert("hx-request", HeaderValue::from_static("true"));
        let sent = pipeline.dispatch(original.clone());

        assert_eq!(sent.uri, original.uri);
        assert_eq!(sent.method, original.method);
        assert_eq!(sent.body, original.body);
        assert_eq!(sent.headers.get("hx-request"), original.headers.get("hx-request"));
        assert_eq!(sent.headers.len(), original.headers.len() + 1);
    }

    #[test]
    fn missing_token_sends_empty_header() {
        let mut pipeline = RequestPipeline::new();
        RequestAugmenter::from_context(&RenderContext::new("en")).install(&mut pipeline);

        let sent = pipeline.dispatch(request(Channel::Http));
        assert_eq!(sent.csrf_token(), Some(""));
    }

    #[test]
    fn install_lifecycle() {
        let mut pipeline = RequestPipeline::new();
        let mut augmenter = RequestAugmenter::new("abc123");
        assert_eq!(augmenter.state(), AugmenterState::Uninstalled);

        let id = augmenter.install(&mut pipeline);
        assert_eq!(augmenter.state(), AugmenterState::Installed(vec![id]));
        assert_eq!(pipeline.len(), 1);

        augmenter.uninstall(&mut pipeline);
        assert_eq!(augmenter.state(), AugmenterState::Uninstalled);
        assert!(pipeline.is_empty());

        let sent = pipeline.dispatch(request(Channel::Http));
        assert_eq!(sent.csrf_token(), None);
    }

    #[test]
    fn double_install_registers_twice() {
        let mut pipeline = RequestPipeline::new();
        let mut augmenter = RequestAugmenter::new("abc123");
        let first = augmenter.install(&mut pipeline);
        let second = augmenter.install(&mut pipeline);

        assert_ne!(first, second);
        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            augmenter.state(),
            AugmenterState::Installed(vec![first, second])
        );

        let sent = pipeline.dispatch(request(Channel::Http));
        assert_eq!(sent.csrf_token(), Some("abc123"));
        assert_eq!(sent.headers.get_all(CSRF_HEADER).iter().count(), 1);
    }

    #[tokio::test]
    async fn tower_layer_sets_header() {
        let service = CsrfHeaderLayer::new("abc123").layer(tower::service_fn(
            |request: Request<()>| async move {
                Ok::<_, Infallible>(
                    request
                        .headers()
                        .get(CSRF_HEADER)
                        .map(|value| value.to_str().unwrap().to_string()),
                )
            },
        ));

        let seen = service
            .oneshot(Request::builder().uri("/sidepanel").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(seen.as_deref(), Some("abc123"));
    }

    #[test]
    fn client_script_embeds_token_safely() {
        let script = ClientScript
            .render(&RenderContext::new("en").with_csrf_token("abc123"))
            .unwrap();
        assert!(script.contains(r#"const token = "abc123";"#));
        assert!(script.contains("htmx:configRequest"));
        assert!(script.contains("htmx:wsConfigSend"));
        assert!(script.contains(r#"headers["X-CSRFToken"]"#));

        let hostile = ClientScript
            .render(&RenderContext::new("en").with_csrf_token("</script><script>alert(1)"))
            .unwrap();
        assert!(!hostile.contains("</script><script>"));
    }
}
