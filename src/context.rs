use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{config::Config, layout::Composer};

/// Shared, read-only application state handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    pub composer: Arc<Composer>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(composer: Composer, config: Config) -> Self {
        Self {
            composer: Arc::new(composer),
            config: Arc::new(config),
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl From<axum_messages::Level> for Severity {
    fn from(level: axum_messages::Level) -> Self {
        use axum_messages::Level;

        match level {
            Level::Debug => Severity::Debug,
            Level::Info => Severity::Info,
            Level::Success => Severity::Success,
            Level::Warning => Severity::Warning,
            Level::Error => Severity::Error,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

impl From<axum_messages::Message> for Message {
    fn from(message: axum_messages::Message) -> Self {
        Self::new(message.level.into(), message.message)
    }
}

/// Request-scoped state available while a page is composed.
///
/// A context is built fresh for every request and never shared between renders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub locale_code: String,
    pub is_authenticated: bool,
    pub messages: Vec<Message>,
    pub csrf_token: String,
    pub vars: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(locale_code: impl Into<String>) -> Self {
        Self {
            locale_code: locale_code.into(),
            ..Default::default()
        }
    }

    pub fn authenticated(mut self, is_authenticated: bool) -> Self {
        self.is_authenticated = is_authenticated;
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = token.into();
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.vars.extend(vars);
        self
    }

    /// Looks up a variable, with the built-in `locale_code` and `csrf_token` names taking
    /// precedence over view-supplied ones.
    pub fn var(&self, name: &str) -> Option<&str> {
        match name {
            "locale_code" => Some(&self.locale_code),
            "csrf_token" => Some(&self.csrf_token),
            _ => self.vars.get(name).map(String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_vars_shadow_view_vars() {
        let ctx = RenderContext::new("en")
            .with_csrf_token("abc123")
            .with_var("csrf_token", "spoofed")
            .with_var("title", "Dashboard");

        assert_eq!(ctx.var("csrf_token"), Some("abc123"));
        assert_eq!(ctx.var("locale_code"), Some("en"));
        assert_eq!(ctx.var("title"), Some("Dashboard"));
        assert_eq!(ctx.var("missing"), None);
    }

    #[test]
    fn severity_displays_lowercase() {
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::from(axum_messages::Level::Success), Severity::Success);
    }
}
