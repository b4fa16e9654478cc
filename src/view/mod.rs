mod base;
mod dashboard;
mod login;

pub use base::{base, BASE};
pub use dashboard::{dashboard, DASHBOARD};
pub use login::{login, LOGIN};

use axum::{
    body::Body,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use std::collections::BTreeMap;

use crate::{
    context::AppContext,
    error::BaseplateError,
    extract::RequestState,
    fragment::MESSAGES,
    layout::{CompositionError, LayoutRegistry},
};

/// The region partial-update requests receive when a page does not name one.
pub const DEFAULT_PARTIAL_REGION: &str = "content";

/// Every layout template the application serves.
pub fn templates() -> Result<LayoutRegistry, CompositionError> {
    LayoutRegistry::new()
        .with(base())?
        .with(dashboard())?
        .with(login())
}

/// Composes pages returned by handlers.
///
/// Handlers return a [`Page`]; it travels through the router as a response extension and is
/// rendered here, once the request state it depends on is available. htmx requests receive
/// only the page's partial region.
pub async fn render_view(
    State(context): State<AppContext>,
    request: RequestState,
    response: Response,
) -> Response {
    let Some(page) = response.extensions().get::<Page>().cloned() else {
        return response;
    };
    let status = response.status();

    match compose(&context, request, &page).await {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn compose(
    context: &AppContext,
    request: RequestState,
    page: &Page,
) -> Result<String, BaseplateError> {
    let composer = context.composer();
    let region = request.partial.then(|| page.partial_region());

    // Flash messages stay queued unless this render can show them.
    let with_messages = match region {
        Some(region) => composer.region_includes(&page.template, region, MESSAGES)?,
        None => true,
    };
    let ctx = request
        .render_context(with_messages)
        .await?
        .with_vars(page.data.0.clone());

    let html = match region {
        Some(region) => composer.compose_region(&page.template, region, &ctx)?,
        None => composer.compose(&page.template, &ctx)?,
    };

    Ok(html)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewData(pub BTreeMap<String, String>);

impl ViewData {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }
}

impl std::ops::DerefMut for ViewData {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl std::ops::Deref for ViewData {
    type Target = BTreeMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[macro_export]
macro_rules! view_data {
    ($($key:expr => $value:expr, )*) => {
        {
            let mut _data = $crate::view::ViewData::new();
        $(
            let _ = _data.insert($key.to_string(), $value.to_string());
        )*
            _data
        }
    }
}

#[macro_export(local_inner_macros)]
macro_rules! page {
    ($template:expr , { $($data:tt)* }) => {
        $crate::view::Page::new($template).with_data(view_data! { $($data)* })
    };
    ($template:expr) => {
        $crate::view::Page::new($template)
    };
}

/// A layout template to compose, plus the view variables it needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    template: String,
    data: ViewData,
    region: Option<String>,
}

impl Page {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            data: ViewData::new(),
            region: None,
        }
    }

    pub fn with_data(mut self, data: ViewData) -> Self {
        self.data.0.extend(data.0);
        self
    }

    /// The region rendered for htmx requests instead of the whole document.
    pub fn with_partial_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn partial_region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_PARTIAL_REGION)
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        response.extensions_mut().insert(self);
        response
    }
}
