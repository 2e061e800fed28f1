use ntex::web;
use serde::Deserialize;
use serde_json::json;

use crate::{
    api, config, consts,
    front::{AppState, errors, flash, middleware, templates, utils},
    models::bag::Bag,
};

/// Bag stored in the session. Missing or malformed data reads as empty.
pub fn session_bag(session: &ntex_session::Session) -> Bag {
    session
        .get::<String>(consts::BAG_SESSION_KEY)
        .ok()
        .flatten()
        .map(|bag| Bag::from_json_lossy(&bag))
        .unwrap_or_default()
}

pub fn save_session_bag(
    session: &ntex_session::Session,
    bag: &Bag,
) -> Result<(), errors::ServerError> {
    session
        .set(consts::BAG_SESSION_KEY, bag.to_json())
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!(
                "bag couldnt be stored in the session: {e}"
            ))
        })
}

pub fn clear_session_bag(session: &ntex_session::Session) {
    session.remove(consts::BAG_SESSION_KEY);
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToBagForm {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub product_size: Option<String>,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub csrfmiddlewaretoken: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromBagForm {
    #[serde(default)]
    pub product_size: Option<String>,
    #[serde(default)]
    pub csrfmiddlewaretoken: String,
}

#[web::get("")]
async fn get_bag_view(
    middleware::logged_user::MaybeUser(user): middleware::logged_user::MaybeUser,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let summary = api::bag::bag_contents(
        &session_bag(&session),
        &app_state.repo,
        &app_state.delivery_policy,
    )
    .await
    .map_err(|e| {
        errors::ServerError::InternalServerError(format!(
            "function bag_contents raised an error: {e}"
        ))
    })?;

    let csrf_token = middleware::csrf_token::issue_token(&session, &app_state.csrf_protec)?;

    let context = tera::Context::from_value(json!({
        "bag": &summary,
        "csrf_token": csrf_token,
        "username": user.map(|u| u.username),
    }))
    .unwrap_or_default();

    templates::render_page("bag/bag.html", context, &session, "/bag")
}

#[web::post("/add/{item_id}")]
async fn add_to_bag(
    req: web::HttpRequest,
    path: web::types::Path<(i64,)>,
    form: web::types::Form<AddToBagForm>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    middleware::csrf_token::verify_form_token(
        &session,
        &app_state.csrf_protec,
        &form.csrfmiddlewaretoken,
    )?;

    let item_id = path.0;
    let mut bag = session_bag(&session);

    match api::bag::add_to_bag(
        &mut bag,
        &app_state.repo,
        item_id,
        form.quantity,
        form.product_size.as_deref(),
    )
    .await
    {
        Ok(product) => {
            save_session_bag(&session, &bag)?;
            flash::success(&session, format!("Added {} to your bag", product.name));
        }
        Err(e) => match e.downcast_ref::<api::bag::BagError>() {
            Some(api::bag::BagError::ProductNotFound(_)) => {
                return Err(errors::UserError::UrlNotFound.into());
            }
            Some(bag_error) => flash::error(&session, bag_error.to_string()),
            None => {
                return Err(errors::ServerError::InternalServerError(format!(
                    "function add_to_bag raised an error: {e}"
                ))
                .into());
            }
        },
    }

    let redirect_url = if form.redirect_url.starts_with('/') && !form.redirect_url.starts_with("//")
    {
        Some(form.redirect_url.clone())
    } else {
        utils::same_site_referer(&req, &config::APP_CONFIG.url_host())
    };

    utils::redirect_to(&redirect_url.unwrap_or_else(|| format!("/products/{item_id}")))
}

#[web::post("/remove/{item_id}")]
async fn remove_from_bag(
    path: web::types::Path<(i64,)>,
    form: web::types::Form<RemoveFromBagForm>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    middleware::csrf_token::verify_form_token(
        &session,
        &app_state.csrf_protec,
        &form.csrfmiddlewaretoken,
    )?;

    let mut bag = session_bag(&session);
    let size = form
        .product_size
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    bag.remove(path.0, size);
    save_session_bag(&session, &bag)?;
    flash::success(&session, "Item removed from your bag");

    utils::redirect_to("/bag")
}
