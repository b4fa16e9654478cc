use std::collections::{BTreeMap, HashMap};

use rinja::Template as _;
use tracing::debug;

use super::{CompositionError, Error, LayoutRegistry, Node, Result, Template};
use crate::{context::RenderContext, fragment::Fragments};

#[derive(rinja::Template)]
#[template(source = "{{ value }}", ext = "html")]
struct Escaped<'a> {
    value: &'a str,
}

/// A chain merged into one region table.
struct Resolved<'t> {
    template: &'t str,
    document: &'t [Node],
    regions: BTreeMap<&'t str, &'t [Node]>,
}

impl<'t> Resolved<'t> {
    fn new(chain: &[&'t Template]) -> Self {
        let mut regions = BTreeMap::new();
        for template in chain {
            for (name, content) in template.regions() {
                regions.entry(name).or_insert(content);
            }
        }

        Self {
            template: chain.first().map(|leaf| leaf.id()).unwrap_or_default(),
            document: chain.last().map(|base| base.document()).unwrap_or_default(),
            regions,
        }
    }

    fn content(&self, region: &str) -> &'t [Node] {
        self.regions.get(region).copied().unwrap_or_default()
    }

    /// Every defined region must be placed exactly once, and no region may contain itself.
    fn check(&self) -> std::result::Result<(), CompositionError> {
        let mut placed = HashMap::new();
        self.walk(self.document, &mut vec![], &mut placed)?;

        for region in self.regions.keys() {
            if !placed.contains_key(region) {
                return Err(CompositionError::UnplacedRegion {
                    template: self.template.to_string(),
                    region: region.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Whether `nodes`, nested regions included, may pull in `fragment`.
    fn reaches(&self, nodes: &[Node], fragment: &str) -> bool {
        nodes.iter().any(|node| match node {
            Node::Region(name) => self.reaches(self.content(name), fragment),
            node => node.fragment() == Some(fragment),
        })
    }

    fn walk(
        &self,
        nodes: &'t [Node],
        stack: &mut Vec<&'t str>,
        placed: &mut HashMap<&'t str, usize>,
    ) -> std::result::Result<(), CompositionError> {
        for node in nodes {
            let Node::Region(name) = node else {
                continue;
            };

            if stack.contains(&name.as_str()) {
                return Err(CompositionError::RecursiveRegion {
                    template: self.template.to_string(),
                    region: name.clone(),
                });
            }

            let count = placed.entry(name.as_str()).or_insert(0);
            *count += 1;
            if *count > 1 {
                return Err(CompositionError::DuplicatePlacement {
                    template: self.template.to_string(),
                    region: name.clone(),
                });
            }

            stack.push(name);
            self.walk(self.content(name), stack, placed)?;
            stack.pop();
        }

        Ok(())
    }
}

/// Resolves layout chains against a render context.
///
/// Composition is a pure function of the registered templates and the context: the same
/// inputs always produce the same bytes.
#[derive(Debug)]
pub struct Composer {
    templates: LayoutRegistry,
    fragments: Fragments,
    max_depth: usize,
}

impl Composer {
    /// Builds a composer and validates every registered template up front, so a broken chain
    /// fails at startup instead of on each request.
    pub fn new(templates: LayoutRegistry, fragments: Fragments, max_depth: usize) -> Result<Self> {
        let composer = Self {
            templates,
            fragments,
            max_depth,
        };
        composer.validate()?;

        Ok(composer)
    }

    pub fn templates(&self) -> &LayoutRegistry {
        &self.templates
    }

    pub fn validate(&self) -> Result<()> {
        for id in self.templates.ids() {
            let chain = self.templates.chain(id, self.max_depth)?;
            Resolved::new(&chain).check()?;

            for template in &chain {
                if let Some(missing) = template
                    .nodes()
                    .filter_map(Node::fragment)
                    .find(|fragment| !self.fragments.contains(fragment))
                {
                    return Err(Error::FragmentNotFound(missing.to_string()));
                }
            }
        }

        debug!(
            templates = self.templates.ids().count(),
            max_depth = self.max_depth,
            "validated layout templates"
        );

        Ok(())
    }

    /// Renders the full document for `template`.
    pub fn compose(&self, template: &str, ctx: &RenderContext) -> Result<String> {
        let resolved = self.resolve(template)?;

        let mut out = String::new();
        self.render(&resolved, resolved.document, ctx, &mut out)?;
        debug!(template, bytes = out.len(), "composed document");

        Ok(out)
    }

    /// Renders a single resolved region, nested regions included, for partial updates.
    pub fn compose_region(&self, template: &str, region: &str, ctx: &RenderContext) -> Result<String> {
        let resolved = self.resolve(template)?;
        let Some(content) = resolved.regions.get(region).copied() else {
            return Err(Error::UnknownRegion {
                template: template.to_string(),
                region: region.to_string(),
            });
        };

        let mut out = String::new();
        self.render(&resolved, content, ctx, &mut out)?;
        debug!(template, region, bytes = out.len(), "composed region");

        Ok(out)
    }

    /// Whether rendering `region` of `template` can include `fragment`, predicates aside.
    pub fn region_includes(&self, template: &str, region: &str, fragment: &str) -> Result<bool> {
        let resolved = self.resolve(template)?;
        let Some(content) = resolved.regions.get(region).copied() else {
            return Err(Error::UnknownRegion {
                template: template.to_string(),
                region: region.to_string(),
            });
        };

        Ok(resolved.reaches(content, fragment))
    }

    fn resolve(&self, template: &str) -> Result<Resolved<'_>> {
        let chain = self.templates.chain(template, self.max_depth)?;
        let resolved = Resolved::new(&chain);
        resolved.check()?;

        Ok(resolved)
    }

    fn render(
        &self,
        resolved: &Resolved<'_>,
        nodes: &[Node],
        ctx: &RenderContext,
        out: &mut String,
    ) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Var(name) => {
                    let value = ctx.var(name).unwrap_or_default();
                    let escaped = Escaped { value }.render().map_err(|source| Error::Render {
                        fragment: name.clone(),
                        source,
                    })?;
                    out.push_str(&escaped);
                }
                // `check` already rejected self-inclusion, so this recursion terminates.
                Node::Region(name) => self.render(resolved, resolved.content(name), ctx, out)?,
                Node::Include(fragment) => self.include(fragment, ctx, out)?,
                Node::IncludeIf {
                    predicate,
                    fragment,
                } => {
                    if predicate.evaluate(ctx) {
                        self.include(fragment, ctx, out)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn include(&self, name: &str, ctx: &RenderContext, out: &mut String) -> Result<()> {
        let fragment = self
            .fragments
            .get(name)
            .ok_or_else(|| Error::FragmentNotFound(name.to_string()))?;
        let html = fragment.render(ctx).map_err(|source| Error::Render {
            fragment: name.to_string(),
            source,
        })?;
        out.push_str(&html);

        Ok(())
    }
}
