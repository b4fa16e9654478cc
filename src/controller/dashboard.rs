use axum::response::IntoResponse;

use crate::{extract::CurrentUser, page, view::DASHBOARD};

pub async fn dashboard(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    page!(DASHBOARD, {
        "user" => user,
        "section" => "dashboard",
    })
}
