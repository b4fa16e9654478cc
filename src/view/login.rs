use crate::layout::{Node, Template};

use super::BASE;

pub const LOGIN: &str = "login";

pub fn login() -> Template {
    Template::extends(LOGIN, BASE)
        .region("title", [Node::text("Log in")])
        .region(
            "content",
            [
                Node::text(
                    "<form class=\"card p-4 mx-auto\" style=\"max-width: 24rem\" \
                     method=\"post\" action=\"/login\">\n\
                     <input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"",
                ),
                Node::var("csrf_token"),
                Node::text("\">\n<input type=\"hidden\" name=\"next\" value=\""),
                Node::var("next"),
                Node::text(
                    "\">\n<label class=\"form-label\" for=\"username\">Username</label>\n\
                     <input class=\"form-control mb-3\" id=\"username\" name=\"username\" type=\"text\">\n\
                     <button class=\"btn btn-primary\" type=\"submit\">Log in</button>\n</form>",
                ),
            ],
        )
}
