//! Handlers not linked to a specific url

use ntex::web;
use ntex_files::NamedFile;
use serde_json::json;

use crate::front::{errors, middleware::logged_user::MaybeUser, templates};

/// Serve `favicon.ico`
#[web::get("/favicon.ico")]
async fn serve_favicon() -> Result<impl web::Responder, web::Error> {
    Ok(NamedFile::open("web/static/images/favicon.ico")?)
}

/// Return a [UrlNotFound](errors::UserError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::UserError::UrlNotFound.into())
}

/// Endpoint to render the index view
#[web::get("/")]
async fn index(
    MaybeUser(user): MaybeUser,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let context = tera::Context::from_value(json!({
        "username": user.map(|u| u.username),
    }))
    .unwrap_or_default();

    templates::render_page("home/index.html", context, &session, "/")
}
