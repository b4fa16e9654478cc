use crate::context::RenderContext;

/// A request-time condition gating a fragment include.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    Authenticated,
    Anonymous,
    HasMessages,
    /// True when the variable is present and non-empty.
    VarSet(String),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn var_set(name: impl Into<String>) -> Self {
        Predicate::VarSet(name.into())
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    pub fn evaluate(&self, ctx: &RenderContext) -> bool {
        match self {
            Predicate::Authenticated => ctx.is_authenticated,
            Predicate::Anonymous => !ctx.is_authenticated,
            Predicate::HasMessages => !ctx.messages.is_empty(),
            Predicate::VarSet(name) => ctx.var(name).is_some_and(|value| !value.is_empty()),
            Predicate::Not(inner) => !inner.evaluate(ctx),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Markup emitted verbatim.
    Text(String),
    /// A context variable, HTML escaped. Missing variables render empty.
    Var(String),
    /// Placeholder for a nested region.
    Region(String),
    Include(String),
    IncludeIf {
        predicate: Predicate,
        fragment: String,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Node::Var(name.into())
    }

    pub fn region(name: impl Into<String>) -> Self {
        Node::Region(name.into())
    }

    pub fn include(fragment: impl Into<String>) -> Self {
        Node::Include(fragment.into())
    }

    pub fn include_if(predicate: Predicate, fragment: impl Into<String>) -> Self {
        Node::IncludeIf {
            predicate,
            fragment: fragment.into(),
        }
    }

    /// The fragment this node may pull in, regardless of its predicate.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Node::Include(fragment) | Node::IncludeIf { fragment, .. } => Some(fragment),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Message, Severity};

    #[test]
    fn predicates_follow_context() {
        let anonymous = RenderContext::new("en");
        let signed_in = RenderContext::new("en")
            .authenticated(true)
            .with_messages([Message::new(Severity::Info, "hi")])
            .with_var("panel", "open");

        assert!(!Predicate::Authenticated.evaluate(&anonymous));
        assert!(Predicate::Anonymous.evaluate(&anonymous));
        assert!(Predicate::Authenticated.evaluate(&signed_in));
        assert!(Predicate::HasMessages.evaluate(&signed_in));
        assert!(!Predicate::HasMessages.evaluate(&anonymous));
        assert!(Predicate::var_set("panel").evaluate(&signed_in));
        assert!(Predicate::var_set("panel").negate().evaluate(&anonymous));
    }

    #[test]
    fn empty_var_is_not_set() {
        let ctx = RenderContext::new("en").with_var("panel", "");

        assert!(!Predicate::var_set("panel").evaluate(&ctx));
        // Built-in names resolve even when empty, but an empty token is still "unset".
        assert!(!Predicate::var_set("csrf_token").evaluate(&ctx));
    }
}
