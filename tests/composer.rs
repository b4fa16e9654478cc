use baseplate::{
    fragment::Fragments,
    layout::{CompositionError, Error},
    Composer, LayoutRegistry, Message, Node, Predicate, RenderContext, Severity, Template,
};

fn fragments() -> Fragments {
    Fragments::new()
        .with("sidebar", |_: &RenderContext| -> rinja::Result<String> {
            Ok("<aside>sidebar</aside>".to_string())
        })
        .with("messages", |ctx: &RenderContext| -> rinja::Result<String> {
            Ok(ctx
                .messages
                .iter()
                .map(|m| format!("<p class=\"{}\">{}</p>", m.severity, m.text))
                .collect())
        })
}

fn base() -> Template {
    Template::base(
        "base",
        [
            Node::text("<head>"),
            Node::region("head"),
            Node::text("</head><body>"),
            Node::region("body"),
            Node::text("</body>"),
        ],
    )
    .region("head", [Node::text("base head")])
    .region("body", [Node::text("base body")])
}

fn composer(templates: impl IntoIterator<Item = Template>) -> Composer {
    let mut registry = LayoutRegistry::new();
    for template in templates {
        registry.register(template).unwrap();
    }
    Composer::new(registry, fragments(), 8).unwrap()
}

#[test]
fn child_overrides_only_what_it_defines() {
    let composer = composer([
        base(),
        Template::extends("child", "base").region("body", [Node::text("child body")]),
    ]);

    let html = composer.compose("child", &RenderContext::new("en")).unwrap();
    assert_eq!(html, "<head>base head</head><body>child body</body>");
}

#[test]
fn most_specific_definition_wins_regardless_of_declaration_order() {
    let composer = composer([
        Template::extends("leaf", "middle")
            .region("body", [Node::text("leaf body")])
            .region("head", [Node::text("leaf head")]),
        Template::extends("middle", "base")
            .region("head", [Node::text("middle head")])
            .region("body", [Node::text("middle body")]),
        base(),
    ]);

    let ctx = RenderContext::new("en");
    assert_eq!(
        composer.compose("leaf", &ctx).unwrap(),
        "<head>leaf head</head><body>leaf body</body>"
    );
    assert_eq!(
        composer.compose("middle", &ctx).unwrap(),
        "<head>middle head</head><body>middle body</body>"
    );
}

#[test]
fn nested_regions_resolve_independently() {
    let base = Template::base("base", [Node::region("main")])
        .region(
            "main",
            [Node::text("<main>"), Node::region("content"), Node::text("</main>")],
        )
        .region("content", [Node::text("default")]);
    let composer = composer([
        base,
        Template::extends("page", "base").region("content", [Node::text("page content")]),
        Template::extends("wide", "base").region(
            "main",
            [Node::text("<div>"), Node::region("content"), Node::text("</div>")],
        ),
    ]);

    let ctx = RenderContext::new("en");
    assert_eq!(
        composer.compose("page", &ctx).unwrap(),
        "<main>page content</main>"
    );
    assert_eq!(composer.compose("wide", &ctx).unwrap(), "<div>default</div>");
    assert_eq!(
        composer.compose_region("page", "main", &ctx).unwrap(),
        "<main>page content</main>"
    );
}

#[test]
fn every_region_appears_exactly_once() {
    let composer = composer([
        base(),
        Template::extends("child", "base").region("body", [Node::text("[body]")]),
    ]);

    let html = composer.compose("child", &RenderContext::new("en")).unwrap();
    assert_eq!(html.matches("base head").count(), 1);
    assert_eq!(html.matches("[body]").count(), 1);
    assert!(!html.contains("base body"));
}

#[test]
fn undefined_regions_render_empty() {
    let composer = composer([Template::base(
        "base",
        [Node::text("a"), Node::region("nothing"), Node::text("b")],
    )]);

    assert_eq!(
        composer.compose("base", &RenderContext::new("en")).unwrap(),
        "ab"
    );
}

#[test]
fn sidebar_only_for_authenticated_users() {
    let composer = composer([Template::base(
        "base",
        [Node::include_if(Predicate::Authenticated, "sidebar")],
    )]);

    let anonymous = composer.compose("base", &RenderContext::new("en")).unwrap();
    assert!(!anonymous.contains("sidebar"));

    let signed_in = composer
        .compose("base", &RenderContext::new("en").authenticated(true))
        .unwrap();
    assert!(signed_in.contains("<aside>sidebar</aside>"));
}

#[test]
fn messages_render_in_order() {
    let composer = composer([Template::base("base", [Node::include("messages")])]);

    let empty = composer.compose("base", &RenderContext::new("en")).unwrap();
    assert_eq!(empty, "");

    let ctx = RenderContext::new("en").with_messages([
        Message::new(Severity::Success, "saved"),
        Message::new(Severity::Warning, "almost full"),
        Message::new(Severity::Error, "failed"),
    ]);
    let html = composer.compose("base", &ctx).unwrap();
    assert_eq!(
        html,
        "<p class=\"success\">saved</p><p class=\"warning\">almost full</p><p class=\"error\">failed</p>"
    );
}

#[test]
fn variables_are_escaped() {
    let composer = composer([Template::base(
        "base",
        [Node::text("<h1>"), Node::var("title"), Node::text("</h1>")],
    )]);

    let ctx = RenderContext::new("en").with_var("title", "<script>x</script>");
    let html = composer.compose("base", &ctx).unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.starts_with("<h1>&"));
    assert!(html.ends_with("</h1>"));
}

#[test]
fn composition_is_deterministic() {
    let composer = composer([
        base(),
        Template::extends("child", "base").region(
            "body",
            [
                Node::var("user"),
                Node::include_if(Predicate::Authenticated, "sidebar"),
                Node::include("messages"),
            ],
        ),
    ]);
    let ctx = RenderContext::new("en")
        .authenticated(true)
        .with_var("user", "ada")
        .with_messages([Message::new(Severity::Info, "hello")]);

    let first = composer.compose("child", &ctx).unwrap();
    let second = composer.compose("child", &ctx).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn cycles_fail_at_construction() {
    let mut registry = LayoutRegistry::new();
    registry
        .register(Template::extends("a", "b").region("body", []))
        .unwrap();
    registry.register(Template::extends("b", "a")).unwrap();

    let error = Composer::new(registry, fragments(), 8).unwrap_err();
    assert!(matches!(
        error,
        Error::Composition(CompositionError::Cycle { .. })
    ));
}

#[test]
fn excessive_depth_fails_at_construction() {
    let mut registry = LayoutRegistry::new();
    registry.register(base()).unwrap();
    registry.register(Template::extends("one", "base")).unwrap();
    registry.register(Template::extends("two", "one")).unwrap();

    assert!(matches!(
        Composer::new(registry.clone(), fragments(), 2),
        Err(Error::Composition(CompositionError::TooDeep { max_depth: 2, .. }))
    ));
    assert!(Composer::new(registry, fragments(), 3).is_ok());
}

#[test]
fn missing_fragment_is_fatal() {
    let mut registry = LayoutRegistry::new();
    registry
        .register(Template::base("base", [Node::include("navbar")]))
        .unwrap();

    assert!(matches!(
        Composer::new(registry, fragments(), 8),
        Err(Error::FragmentNotFound(name)) if name == "navbar"
    ));
}

#[test]
fn recursive_and_misplaced_regions_are_rejected() {
    let recursive = LayoutRegistry::new()
        .with(Template::base("base", [Node::region("a")]).region("a", [Node::region("a")]))
        .unwrap();
    assert!(matches!(
        Composer::new(recursive, fragments(), 8),
        Err(Error::Composition(CompositionError::RecursiveRegion { .. }))
    ));

    let twice = LayoutRegistry::new()
        .with(Template::base("base", [Node::region("a"), Node::region("a")]))
        .unwrap();
    assert!(matches!(
        Composer::new(twice, fragments(), 8),
        Err(Error::Composition(CompositionError::DuplicatePlacement { .. }))
    ));

    let unplaced = LayoutRegistry::new()
        .with(base())
        .and_then(|r| r.with(Template::extends("child", "base").region("footer", [])))
        .unwrap();
    assert!(matches!(
        Composer::new(unplaced, fragments(), 8),
        Err(Error::Composition(CompositionError::UnplacedRegion { .. }))
    ));
}

#[test]
fn unknown_partial_region() {
    let composer = composer([base()]);

    assert!(matches!(
        composer.compose_region("base", "sidebar", &RenderContext::new("en")),
        Err(Error::UnknownRegion { .. })
    ));
}

#[test]
fn region_includes_follows_nested_regions() {
    let base = Template::base("base", [Node::region("main")])
        .region(
            "main",
            [
                Node::include_if(Predicate::HasMessages, "messages"),
                Node::region("content"),
            ],
        )
        .region("content", [Node::text("content")]);
    let composer = composer([
        base,
        Template::extends("page", "base").region(
            "content",
            [Node::include_if(Predicate::Authenticated, "sidebar")],
        ),
    ]);

    assert!(composer.region_includes("page", "main", "messages").unwrap());
    assert!(!composer.region_includes("page", "content", "messages").unwrap());
    assert!(composer.region_includes("page", "main", "sidebar").unwrap());
    assert!(matches!(
        composer.region_includes("page", "footer", "messages"),
        Err(Error::UnknownRegion { .. })
    ));
}
