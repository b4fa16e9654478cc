use crate::layout::{Node, Template};

use super::BASE;

pub const DASHBOARD: &str = "dashboard";

pub fn dashboard() -> Template {
    Template::extends(DASHBOARD, BASE)
        .region("title", [Node::text("Dashboard | "), Node::var("user")])
        .region(
            "content",
            [
                Node::text("<h1 class=\"h3 mb-4\">Welcome back, "),
                Node::var("user"),
                Node::text(
                    "</h1>\n\
                     <button class=\"btn btn-primary\" hx-get=\"/sidepanel\" \
                     hx-target=\"#sidepanel\" hx-swap=\"outerHTML\">New customer</button>",
                ),
            ],
        )
}
