//! Reusable, independently renderable page pieces.
//!
//! Layout regions refer to fragments by name; the [`Composer`](crate::layout::Composer)
//! looks them up here at render time.
use std::{collections::BTreeMap, sync::Arc};

use rinja::Template;

use crate::context::{Message, RenderContext};

pub const NAVBAR: &str = "navbar";
pub const SIDEBAR: &str = "sidebar";
pub const MESSAGES: &str = "messages";
pub const SIDEPANEL: &str = "sidepanel";
pub const ASSETS: &str = "assets";
pub const CSRF_SCRIPT: &str = "csrf_script";

pub trait Fragment: Send + Sync {
    fn render(&self, ctx: &RenderContext) -> rinja::Result<String>;
}

impl<F> Fragment for F
where
    F: Fn(&RenderContext) -> rinja::Result<String> + Send + Sync,
{
    fn render(&self, ctx: &RenderContext) -> rinja::Result<String> {
        self(ctx)
    }
}

#[derive(Clone, Default)]
pub struct Fragments {
    fragments: BTreeMap<String, Arc<dyn Fragment>>,
}

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, fragment: impl Fragment + 'static) -> &mut Self {
        self.fragments.insert(name.into(), Arc::new(fragment));
        self
    }

    pub fn with(mut self, name: impl Into<String>, fragment: impl Fragment + 'static) -> Self {
        self.insert(name, fragment);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Fragment> {
        self.fragments.get(name).map(|fragment| fragment.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }
}

impl std::fmt::Debug for Fragments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.fragments.keys()).finish()
    }
}

#[derive(Template)]
#[template(path = "fragments/navbar.html")]
struct NavbarTemplate<'a> {
    title: &'a str,
    user: Option<&'a str>,
}

/// Top navigation; shows the signed in user or a login link.
#[derive(Clone, Debug)]
pub struct Navbar {
    pub title: String,
}

impl Fragment for Navbar {
    fn render(&self, ctx: &RenderContext) -> rinja::Result<String> {
        NavbarTemplate {
            title: &self.title,
            user: ctx
                .is_authenticated
                .then(|| ctx.var("user").unwrap_or_default()),
        }
        .render()
    }
}

#[derive(Template)]
#[template(path = "fragments/sidebar.html")]
struct SidebarTemplate<'a> {
    active: &'a str,
}

#[derive(Clone, Debug, Default)]
pub struct Sidebar;

impl Fragment for Sidebar {
    fn render(&self, ctx: &RenderContext) -> rinja::Result<String> {
        SidebarTemplate {
            active: ctx.var("section").unwrap_or_default(),
        }
        .render()
    }
}

#[derive(Template)]
#[template(path = "fragments/messages.html")]
struct MessagesTemplate<'a> {
    messages: &'a [Message],
}

/// Flash messages, one entry per message in queue order. Renders nothing when the queue is
/// empty.
#[derive(Clone, Debug, Default)]
pub struct MessageList;

impl Fragment for MessageList {
    fn render(&self, ctx: &RenderContext) -> rinja::Result<String> {
        MessagesTemplate {
            messages: &ctx.messages,
        }
        .render()
    }
}

#[derive(Template)]
#[template(path = "fragments/sidepanel.html")]
pub struct SidePanelTemplate<'a> {
    pub control_class: &'a str,
    pub panel_action: &'a str,
}

/// The side panel container in its closed state. Partial updates swap in an open panel.
#[derive(Clone, Debug, Default)]
pub struct SidePanel;

impl Fragment for SidePanel {
    fn render(&self, _ctx: &RenderContext) -> rinja::Result<String> {
        SidePanelTemplate {
            control_class: "",
            panel_action: "",
        }
        .render()
    }
}
