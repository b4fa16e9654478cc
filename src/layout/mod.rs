//! Layered layout composition.
//!
//! A base template owns the document skeleton and declares named regions. Templates that
//! extend it override any subset of those regions; for each region the most specific
//! definition in the chain wins. Region content is a flat list of [`Node`]s which may splice
//! in nested regions, view variables and [`Fragment`](crate::fragment::Fragment)s.

mod composer;
mod node;
mod template;

pub use composer::Composer;
pub use node::{Node, Predicate};
pub use template::{LayoutRegistry, Template};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("fragment `{0}` could not be found")]
    FragmentNotFound(String),

    #[error("template `{template}` has no region `{region}`")]
    UnknownRegion { template: String, region: String },

    #[error("fragment `{fragment}` failed to render: {source}")]
    Render {
        fragment: String,
        #[source]
        source: rinja::Error,
    },
}

/// A malformed layout chain. These should surface when templates are registered, not
/// per request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("template `{0}` is not registered")]
    UnknownTemplate(String),

    #[error("template `{0}` is already registered")]
    DuplicateTemplate(String),

    #[error("template `{template}` extends unknown template `{parent}`")]
    UnknownParent { template: String, parent: String },

    #[error("template `{template}` defines region `{region}` more than once")]
    DuplicateRegion { template: String, region: String },

    #[error("template chain starting at `{template}` loops back to `{repeated}`")]
    Cycle { template: String, repeated: String },

    #[error("template chain starting at `{template}` is deeper than {max_depth}")]
    TooDeep { template: String, max_depth: usize },

    #[error("region `{region}` includes itself in template `{template}`")]
    RecursiveRegion { template: String, region: String },

    #[error("region `{region}` is placed more than once in template `{template}`")]
    DuplicatePlacement { template: String, region: String },

    #[error("region `{region}` is defined but never placed in template `{template}`")]
    UnplacedRegion { template: String, region: String },
}
