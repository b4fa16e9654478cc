use rinja::Template;
use std::collections::HashSet;
use tracing::warn;

use crate::{config::AssetsConfig, context::RenderContext, fragment::Fragment};

/// Maps logical asset names to the URLs they are served from.
#[derive(Clone, Debug)]
pub struct AssetResolver {
    static_url: String,
}

impl AssetResolver {
    pub fn new(static_url: impl Into<String>) -> Self {
        let mut static_url = static_url.into();
        if !static_url.ends_with('/') {
            static_url.push('/');
        }

        Self { static_url }
    }

    /// Absolute and protocol-relative URLs pass through untouched.
    pub fn url(&self, name: &str) -> String {
        if name.starts_with("http://") || name.starts_with("https://") || name.starts_with("//") {
            return name.to_string();
        }

        format!("{}{}", self.static_url, name.trim_start_matches('/'))
    }
}

#[derive(Template)]
#[template(path = "fragments/assets.html")]
struct AssetsTemplate<'a> {
    stylesheets: &'a [String],
    deferred_scripts: &'a [String],
    local_scripts: &'a [String],
}

/// The page's external resources: stylesheets, then deferred vendor scripts, then
/// project-local scripts.
///
/// Deferred scripts execute in document order, so entries are emitted exactly as declared,
/// duplicates included.
#[derive(Clone, Debug)]
pub struct AssetManifest {
    stylesheets: Vec<String>,
    deferred_scripts: Vec<String>,
    local_scripts: Vec<String>,
}

impl AssetManifest {
    pub fn new(
        resolver: &AssetResolver,
        stylesheets: &[String],
        deferred_scripts: &[String],
        local_scripts: &[String],
    ) -> Self {
        let resolve = |names: &[String]| -> Vec<String> {
            names.iter().map(|name| resolver.url(name)).collect()
        };
        let manifest = Self {
            stylesheets: resolve(stylesheets),
            deferred_scripts: resolve(deferred_scripts),
            local_scripts: resolve(local_scripts),
        };

        for duplicate in manifest.duplicates() {
            warn!("asset `{duplicate}` is included more than once; it will load once per include");
        }

        manifest
    }

    pub fn from_config(config: &AssetsConfig) -> Self {
        Self::new(
            &AssetResolver::new(&config.static_url),
            &config.stylesheets,
            &config.deferred_scripts,
            &config.local_scripts,
        )
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn scripts(&self) -> impl Iterator<Item = &str> {
        self.deferred_scripts
            .iter()
            .chain(self.local_scripts.iter())
            .map(String::as_str)
    }

    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = vec![];

        for url in self.stylesheets.iter().map(String::as_str).chain(self.scripts()) {
            if !seen.insert(url) && !duplicates.contains(&url) {
                duplicates.push(url);
            }
        }

        duplicates
    }
}

impl Fragment for AssetManifest {
    fn render(&self, _ctx: &RenderContext) -> rinja::Result<String> {
        AssetsTemplate {
            stylesheets: &self.stylesheets,
            deferred_scripts: &self.deferred_scripts,
            local_scripts: &self.local_scripts,
        }
        .render()
    }
}
