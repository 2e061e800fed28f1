use crate::{
    api,
    front::{AppState, errors, flash, forms::profile::ProfileForm, middleware, templates, utils},
    models,
};
use ntex::web;
use serde_json::json;

#[web::get("")]
async fn get_profile_view(
    logged_user: models::user::SessionUser,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let (profile, orders) =
        api::profile::get_profile_with_orders(&app_state.repo, &logged_user.username)
            .await
            .map_err(|e| {
                errors::ServerError::InternalServerError(format!(
                    "function get_profile_with_orders raised an error: {e}"
                ))
            })?
            .ok_or(errors::UserError::UrlNotFound)?;

    let csrf_token = middleware::csrf_token::issue_token(&session, &app_state.csrf_protec)?;

    let context = tera::Context::from_value(json!({
        "profile": &profile,
        "form": ProfileForm::from_profile(&profile),
        "orders": &orders,
        "csrf_token": csrf_token,
        "username": &logged_user.username,
    }))
    .unwrap_or_default();

    templates::render_page("profiles/profile.html", context, &session, "/profile")
}

#[web::post("")]
async fn update_profile(
    logged_user: models::user::SessionUser,
    form: web::types::Form<ProfileForm>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    middleware::csrf_token::verify_form_token(
        &session,
        &app_state.csrf_protec,
        &form.csrfmiddlewaretoken,
    )?;

    let profile = app_state
        .repo
        .get_profile_by_username(&logged_user.username)
        .await
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!(
                "function get_profile_by_username raised an error: {e}"
            ))
        })?
        .ok_or(errors::UserError::UrlNotFound)?;

    match form.validate() {
        Some(defaults) => {
            api::profile::update_delivery_defaults(&app_state.repo, profile.id, &defaults)
                .await
                .map_err(|e| {
                    errors::ServerError::InternalServerError(format!(
                        "function update_delivery_defaults raised an error: {e}"
                    ))
                })?;
            flash::success(&session, "Profile updated successfully");
        }
        None => flash::error(&session, "Update failed. Please ensure the form is valid."),
    }

    utils::redirect_to("/profile")
}

#[web::get("/order_history/{order_number}")]
async fn get_order_history_view(
    logged_user: models::user::SessionUser,
    path: web::types::Path<(String,)>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let (order, line_items) =
        api::profile::get_order_history(&app_state.repo, &logged_user.username, &path.0)
            .await
            .map_err(|e| {
                errors::ServerError::InternalServerError(format!(
                    "function get_order_history raised an error: {e}"
                ))
            })?
            .ok_or(errors::UserError::UrlNotFound)?;

    flash::info(
        &session,
        format!(
            "This is a past confirmation for order number {}. A confirmation email was sent on the order date.",
            order.order_number
        ),
    );

    let context = tera::Context::from_value(json!({
        "order": &order,
        "line_items": &line_items,
        "from_profile": true,
        "username": &logged_user.username,
    }))
    .unwrap_or_default();

    templates::render_page(
        "checkout/checkout_success.html",
        context,
        &session,
        "/profile/order_history",
    )
}
