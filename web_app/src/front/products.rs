use ntex::web;
use serde_json::json;

use crate::{
    front::{AppState, errors, middleware, templates},
    models,
};

#[web::get("")]
async fn get_products_view(
    middleware::logged_user::MaybeUser(user): middleware::logged_user::MaybeUser,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let products = app_state.repo.get_all_products().await.map_err(|e| {
        errors::ServerError::InternalServerError(format!(
            "function get_all_products raised an error: {e}"
        ))
    })?;

    let context = tera::Context::from_value(json!({
        "products": &products,
        "username": user.map(|u| u.username),
    }))
    .unwrap_or_default();

    templates::render_page("products/products.html", context, &session, "/products")
}

#[web::get("/{product_id}")]
async fn get_product_detail_view(
    middleware::logged_user::MaybeUser(user): middleware::logged_user::MaybeUser,
    path: web::types::Path<(i64,)>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let product = app_state
        .repo
        .get_product(path.0)
        .await
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!(
                "function get_product raised an error: {e}"
            ))
        })?
        .ok_or(errors::UserError::UrlNotFound)?;

    let csrf_token = middleware::csrf_token::issue_token(&session, &app_state.csrf_protec)?;

    let context = tera::Context::from_value(json!({
        "product": &product,
        "sizes": models::product::PRODUCT_SIZES
            .iter()
            .map(|(code, name)| json!({"code": code, "name": name}))
            .collect::<Vec<_>>(),
        "csrf_token": csrf_token,
        "username": user.map(|u| u.username),
    }))
    .unwrap_or_default();

    templates::render_page(
        "products/product_detail.html",
        context,
        &session,
        "/products/{product_id}",
    )
}
