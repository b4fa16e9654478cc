use axum::{
    http::Method,
    response::{Html, IntoResponse},
    Form,
};
use axum_messages::Messages;
use rinja::Template;
use serde::Deserialize;
use tracing::info;

use crate::{error::BaseplateError, extract::CurrentUser, fragment::SidePanelTemplate};

#[derive(Template)]
#[template(path = "fragments/panel_action.html")]
struct PanelAction<'a> {
    heading: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    domain: String,
}

fn saved_message(name: &str) -> String {
    match name.trim() {
        "" => "Saved customer".to_string(),
        name => format!("Saved {name}"),
    }
}

/// Opens the side panel on GET and PUT, closes it on POST and DELETE.
pub async fn sidepanel(
    CurrentUser(user): CurrentUser,
    method: Method,
    messages: Messages,
    form: Option<Form<CustomerForm>>,
) -> Result<impl IntoResponse, BaseplateError> {
    if method == Method::POST {
        let customer = form.map(|Form(customer)| customer).unwrap_or_default();
        info!(%user, name = %customer.name, domain = %customer.domain, "customer submitted");
        messages.success(saved_message(&customer.name));
    }

    let control_class = match method {
        Method::GET | Method::PUT => "active",
        _ => "",
    };
    let panel_action = PanelAction {
        heading: "New customer",
    }
    .render()
    .map_err(anyhow::Error::from)?;

    let html = SidePanelTemplate {
        control_class,
        panel_action: &panel_action,
    }
    .render()
    .map_err(anyhow::Error::from)?;

    Ok(Html(html))
}
