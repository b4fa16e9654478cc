use std::collections::{BTreeMap, HashSet};

use super::{CompositionError, Node};

/// One link of a layout chain.
///
/// A base template (no parent) carries the document skeleton. A child template only
/// overrides regions.
#[derive(Clone, Debug)]
pub struct Template {
    id: String,
    parent: Option<String>,
    document: Vec<Node>,
    regions: Vec<(String, Vec<Node>)>,
}

impl Template {
    pub fn base(id: impl Into<String>, document: impl IntoIterator<Item = Node>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            document: document.into_iter().collect(),
            regions: vec![],
        }
    }

    pub fn extends(id: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
            document: vec![],
            regions: vec![],
        }
    }

    pub fn region(
        mut self,
        name: impl Into<String>,
        content: impl IntoIterator<Item = Node>,
    ) -> Self {
        self.regions
            .push((name.into(), content.into_iter().collect()));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn document(&self) -> &[Node] {
        &self.document
    }

    pub fn regions(&self) -> impl Iterator<Item = (&str, &[Node])> {
        self.regions
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_slice()))
    }

    /// Every node in the template, skeleton included.
    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.document
            .iter()
            .chain(self.regions.iter().flat_map(|(_, content)| content.iter()))
    }

    fn check_regions(&self) -> Result<(), CompositionError> {
        let mut seen = HashSet::new();
        for (name, _) in &self.regions {
            if !seen.insert(name.as_str()) {
                return Err(CompositionError::DuplicateRegion {
                    template: self.id.clone(),
                    region: name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct LayoutRegistry {
    templates: BTreeMap<String, Template>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template. Parent links are only checked once the whole set is known, see
    /// [`LayoutRegistry::chain`].
    pub fn register(&mut self, template: Template) -> Result<&mut Self, CompositionError> {
        template.check_regions()?;

        if self.templates.contains_key(template.id()) {
            return Err(CompositionError::DuplicateTemplate(template.id.clone()));
        }

        tracing::debug!(
            template = template.id(),
            parent = template.parent(),
            "registered layout template"
        );
        self.templates.insert(template.id.clone(), template);

        Ok(self)
    }

    pub fn with(mut self, template: Template) -> Result<Self, CompositionError> {
        self.register(template)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Follows parent links from `id` to its base. The returned chain is ordered most
    /// specific first.
    pub fn chain(&self, id: &str, max_depth: usize) -> Result<Vec<&Template>, CompositionError> {
        let mut current = self
            .get(id)
            .ok_or_else(|| CompositionError::UnknownTemplate(id.to_string()))?;
        let mut seen = HashSet::new();
        let mut chain = vec![];

        loop {
            if !seen.insert(current.id()) {
                return Err(CompositionError::Cycle {
                    template: id.to_string(),
                    repeated: current.id.clone(),
                });
            }

            chain.push(current);
            if chain.len() > max_depth {
                return Err(CompositionError::TooDeep {
                    template: id.to_string(),
                    max_depth,
                });
            }

            let Some(parent) = current.parent() else {
                return Ok(chain);
            };
            current = self
                .get(parent)
                .ok_or_else(|| CompositionError::UnknownParent {
                    template: current.id.clone(),
                    parent: parent.to_string(),
                })?;
        }
    }
}
