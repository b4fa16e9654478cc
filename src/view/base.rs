use crate::{
    fragment::{ASSETS, CSRF_SCRIPT, MESSAGES, NAVBAR, SIDEBAR, SIDEPANEL},
    layout::{Node, Predicate, Template},
};

pub const BASE: &str = "base";

/// The document skeleton every page extends.
///
/// Head: metadata, `title`, the asset manifest, `css`, `javascript`, then the inline
/// anti-forgery hook. Body: `body` (navbar, sidebar for signed in users, `main` wrapping
/// flash messages and `content`), `modal`, `sidepanel`, `inline_javascript`.
pub fn base() -> Template {
    Template::base(
        BASE,
        [
            Node::text("<!DOCTYPE html>\n<html lang=\""),
            Node::var("locale_code"),
            Node::text(
                "\">\n<head>\n<meta charset=\"utf-8\">\n\
                 <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>",
            ),
            Node::region("title"),
            Node::text("</title>\n"),
            Node::include(ASSETS),
            Node::text("\n"),
            Node::region("css"),
            Node::region("javascript"),
            Node::include(CSRF_SCRIPT),
            Node::text("\n</head>\n<body>\n"),
            Node::region("body"),
            Node::region("modal"),
            Node::region("sidepanel"),
            Node::region("inline_javascript"),
            Node::text("\n</body>\n</html>\n"),
        ],
    )
    .region("title", [Node::var("title")])
    .region("css", [])
    .region("javascript", [])
    .region(
        "body",
        [
            Node::include(NAVBAR),
            Node::text("\n<div class=\"d-flex\">\n"),
            Node::include_if(Predicate::Authenticated, SIDEBAR),
            Node::region("main"),
            Node::text("\n</div>\n"),
        ],
    )
    .region(
        "main",
        [
            Node::text("<main id=\"main\" class=\"flex-grow-1 p-4\">\n"),
            Node::include(MESSAGES),
            Node::region("content"),
            Node::text("\n</main>"),
        ],
    )
    .region("content", [])
    .region("modal", [Node::text("<div id=\"modal\"></div>\n")])
    .region("sidepanel", [Node::include(SIDEPANEL)])
    .region("inline_javascript", [])
}
