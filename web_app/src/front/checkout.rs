use ntex::web;
use serde::Deserialize;
use serde_json::json;

use crate::{
    api, config, consts,
    front::{
        AppState, bag, errors, flash,
        forms::order::OrderForm,
        middleware::{self, logged_user::MaybeUser},
        templates, utils,
    },
    metric,
    models::{self, bag::BagSummary},
};

#[derive(Debug, Deserialize)]
pub struct CacheCheckoutForm {
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub save_info: String,
    #[serde(default)]
    pub csrfmiddlewaretoken: String,
}

/// Page context for `form` and the payment intent behind `client_secret`.
/// The hidden `client_secret` input always carries the intent rendered in
/// the page, whatever the form held before.
fn checkout_page_context(
    form: &OrderForm,
    summary: &BagSummary,
    stripe_public_key: &str,
    client_secret: &str,
    csrf_token: &str,
    username: Option<&str>,
) -> Result<tera::Context, errors::ServerError> {
    let order_form = OrderForm {
        client_secret: client_secret.to_string(),
        ..form.clone()
    };
    let stripe_public_key = utils::json_script(&stripe_public_key)
        .map_err(|e| errors::ServerError::InternalServerError(e.to_string()))?;
    let client_secret_script = utils::json_script(&client_secret)
        .map_err(|e| errors::ServerError::InternalServerError(e.to_string()))?;

    tera::Context::from_value(json!({
        "order_form": order_form,
        "bag": summary,
        "stripe_public_key": stripe_public_key,
        "client_secret": client_secret_script,
        "csrf_token": csrf_token,
        "username": username,
    }))
    .map_err(|e| errors::ServerError::TemplateError(e.to_string()))
}

fn render_checkout_page(
    form: &OrderForm,
    summary: &BagSummary,
    client_secret: &str,
    csrf_token: &str,
    username: Option<&str>,
    session: &ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let context = checkout_page_context(
        form,
        summary,
        &config::APP_CONFIG.stripe_public_key,
        client_secret,
        csrf_token,
        username,
    )?;

    templates::render_page("checkout/checkout.html", context, session, "/checkout")
}

async fn current_bag_summary(
    app_state: &AppState,
    session: &ntex_session::Session,
) -> Result<BagSummary, errors::ServerError> {
    api::bag::bag_contents(
        &bag::session_bag(session),
        &app_state.repo,
        &app_state.delivery_policy,
    )
    .await
    .map_err(|e| {
        errors::ServerError::InternalServerError(format!(
            "function bag_contents raised an error: {e}"
        ))
    })
}

#[web::get("")]
async fn get_checkout_view(
    MaybeUser(user): MaybeUser,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    if bag::session_bag(&session).is_empty() {
        flash::error(&session, "There's nothing in your bag at the moment");
        return utils::redirect_to("/products");
    }

    let summary = current_bag_summary(&app_state, &session).await?;

    let intent = api::checkout::create_payment_intent(
        &app_state.payment_gateway,
        summary.grand_total,
        &config::APP_CONFIG.stripe_currency,
    )
    .await
    .map_err(|e| {
        errors::ServerError::ExternalServiceError(format!(
            "function create_payment_intent raised an error: {e}"
        ))
    })?;

    let mut form = OrderForm::default();
    if let Some(user) = &user {
        match app_state.repo.get_profile_by_username(&user.username).await {
            Ok(Some(profile)) => form = OrderForm::from_details(&profile.checkout_prefill()),
            Ok(None) => {}
            Err(e) => log::warn!("checkout prefill of {} failed: {e}", user.username),
        }
    }

    if config::APP_CONFIG.stripe_public_key.is_empty() {
        flash::warning(
            &session,
            "Stripe public key is missing. Did you forget to set it in your environment?",
        );
    }

    let csrf_token = middleware::csrf_token::issue_token(&session, &app_state.csrf_protec)?;
    metric::incr_checkout_statds("view");

    render_checkout_page(
        &form,
        &summary,
        &intent.client_secret,
        &csrf_token,
        user.as_ref().map(|u| u.username.as_str()),
        &session,
    )
}

#[web::post("/cache_checkout_data/")]
async fn cache_checkout_data(
    user: MaybeUser,
    form: web::types::Form<CacheCheckoutForm>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    middleware::csrf_token::verify_form_token(
        &session,
        &app_state.csrf_protec,
        &form.csrfmiddlewaretoken,
    )?;

    let result = api::checkout::cache_checkout_data(
        &app_state.payment_gateway,
        &form.client_secret,
        &bag::session_bag(&session),
        form.save_info == "true",
        &user.username(),
    )
    .await;

    if let Err(e) = result {
        logfire::error!(
            "checkout data couldnt be cached: {error}",
            error = e.to_string()
        );
        flash::error(
            &session,
            "Sorry, your payment cannot be processed right now. Please try again later.",
        );
        return Ok(web::HttpResponse::BadRequest()
            .content_type("text/plain")
            .body(e.to_string()));
    }

    metric::incr_checkout_statds("cached");
    Ok(web::HttpResponse::Ok().finish())
}

#[web::post("")]
async fn place_order(
    MaybeUser(user): MaybeUser,
    form: web::types::Form<OrderForm>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    middleware::csrf_token::verify_form_token(
        &session,
        &app_state.csrf_protec,
        &form.csrfmiddlewaretoken,
    )?;

    let bag = bag::session_bag(&session);
    if bag.is_empty() {
        flash::error(&session, "There's nothing in your bag at the moment");
        return utils::redirect_to("/products");
    }

    let details = match form.validate() {
        Ok(details) => details,
        Err(invalid_fields) => {
            log::info!("checkout form rejected, invalid fields: {invalid_fields:?}");
            flash::error(
                &session,
                "There was an error with your form. Please double check your information.",
            );

            let summary = current_bag_summary(&app_state, &session).await?;
            let csrf_token =
                middleware::csrf_token::issue_token(&session, &app_state.csrf_protec)?;

            return render_checkout_page(
                &form,
                &summary,
                &form.client_secret,
                &csrf_token,
                user.as_ref().map(|u| u.username.as_str()),
                &session,
            );
        }
    };

    let stripe_pid = models::stripe::payment_intent_id(&form.client_secret)
        .ok_or(errors::UserError::FormInputValueError(
            "client_secret".to_string(),
        ))?;

    let order = match api::checkout::place_order(
        &app_state.repo,
        details,
        &bag,
        stripe_pid,
        None,
        &app_state.delivery_policy,
    )
    .await
    {
        Ok(order) => order,
        Err(e) => match e.downcast_ref::<api::checkout::CheckoutError>() {
            Some(api::checkout::CheckoutError::ProductNotFound(_)) => {
                flash::error(
                    &session,
                    "One of the products in your bag wasn't found in our database. Please call us for assistance!",
                );
                return utils::redirect_to("/bag");
            }
            _ => {
                return Err(errors::ServerError::InternalServerError(format!(
                    "function place_order raised an error: {e}"
                ))
                .into());
            }
        },
    };

    session
        .set(consts::SAVE_INFO_SESSION_KEY, form.wants_to_save_info())
        .map_err(|e| errors::ServerError::InternalServerError(e.to_string()))?;

    logfire::info!(
        "Order {order_number} placed for {stripe_pid}",
        order_number = order.order_number.clone(),
        stripe_pid = order.stripe_pid.clone()
    );
    metric::incr_checkout_statds("order_created");

    utils::redirect_to(&format!(
        "/checkout/checkout_success/{}",
        order.order_number
    ))
}

#[web::get("/checkout_success/{order_number}")]
async fn checkout_success(
    MaybeUser(user): MaybeUser,
    path: web::types::Path<(String,)>,
    app_state: web::types::State<AppState>,
    session: ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    let mut order = app_state
        .repo
        .get_order_by_number(&path.0)
        .await
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!(
                "function get_order_by_number raised an error: {e}"
            ))
        })?
        .ok_or(errors::UserError::UrlNotFound)?;

    let save_info = session
        .get::<bool>(consts::SAVE_INFO_SESSION_KEY)
        .ok()
        .flatten()
        .unwrap_or_default();

    api::checkout::complete_checkout(
        &app_state.repo,
        &mut order,
        user.as_ref().map(|u| u.username.as_str()),
        save_info,
    )
    .await
    .map_err(|e| {
        errors::ServerError::InternalServerError(format!(
            "function complete_checkout raised an error: {e}"
        ))
    })?;

    let line_items = app_state
        .repo
        .get_order_line_details(order.id)
        .await
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!(
                "function get_order_line_details raised an error: {e}"
            ))
        })?;

    flash::success(
        &session,
        format!(
            "Order successfully processed! Your order number is {}. A confirmation email will be sent to {}.",
            order.order_number, order.details.email
        ),
    );

    bag::clear_session_bag(&session);
    session.remove(consts::SAVE_INFO_SESSION_KEY);

    let context = tera::Context::from_value(json!({
        "order": &order,
        "line_items": &line_items,
        "from_profile": false,
        "username": user.map(|u| u.username),
    }))
    .unwrap_or_default();

    templates::render_page(
        "checkout/checkout_success.html",
        context,
        &session,
        "/checkout/checkout_success",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            bag::{Bag, DeliveryPolicy},
            order::{Order, OrderLineItem},
            product::Product,
        },
        repo::MockAppRepo,
        services::{MockMailService, MockPaymentGateway},
    };
    use csrf::AesGcmCsrfProtection;
    use ntex::{
        http::{StatusCode, header},
        web::test,
    };
    use ntex_session::CookieSession;
    use rust_decimal_macros::dec;

    const CLIENT_SECRET: &str = "pi_1_secret_x";

    fn product() -> Product {
        Product {
            id: 1,
            sku: None,
            name: "Tee".into(),
            description: String::new(),
            has_sizes: false,
            price: dec!(10.00),
            rating: None,
            image_url: None,
            image: None,
        }
    }

    fn summary() -> BagSummary {
        BagSummary {
            bag_items: vec![],
            total: dec!(20.00),
            product_count: 2,
            delivery: dec!(2.00),
            free_delivery_delta: dec!(30.00),
            free_delivery_threshold: dec!(50.00),
            grand_total: dec!(22.00),
        }
    }

    fn app_state(repo: MockAppRepo) -> AppState {
        AppState {
            csrf_protec: AesGcmCsrfProtection::from_key([7; 32]),
            repo: Box::new(repo),
            payment_gateway: Box::new(MockPaymentGateway::new()),
            mail_service: Box::new(MockMailService::new()),
            delivery_policy: DeliveryPolicy::default(),
        }
    }

    fn render(context: tera::Context) -> String {
        let mut context = context;
        context.insert("messages", &Vec::<flash::FlashMessage>::new());
        templates::WEB_TEMPLATES
            .render("checkout/checkout.html", &context)
            .unwrap()
    }

    /// Puts one product in the bag and returns a csrf token of the session
    #[web::get("/start")]
    async fn start_session(
        app_state: web::types::State<AppState>,
        session: ntex_session::Session,
    ) -> Result<web::HttpResponse, web::Error> {
        let mut bag = Bag::default();
        bag.add(1, 2, None);
        bag::save_session_bag(&session, &bag)?;
        let token = middleware::csrf_token::issue_token(&session, &app_state.csrf_protec)?;
        Ok(web::HttpResponse::Ok().body(token))
    }

    #[test]
    fn test_checkout_page_embeds_the_client_secret_twice() {
        let context = checkout_page_context(
            &OrderForm::default(),
            &summary(),
            "pk_test_1",
            CLIENT_SECRET,
            "token",
            None,
        )
        .unwrap();

        let page = render(context);

        assert!(page.contains(r#"value="pi_1_secret_x" name="client_secret""#));
        assert!(page.contains(
            r#"<script id="id_client_secret" type="application/json">"pi_1_secret_x"</script>"#
        ));
        assert!(page.contains(
            r#"<script id="id_stripe_public_key" type="application/json">"pk_test_1"</script>"#
        ));
        assert!(page.contains(r#"name="csrfmiddlewaretoken" value="token""#));
    }

    #[test]
    fn test_rerendered_checkout_page_keeps_posted_values() {
        let posted = OrderForm {
            full_name: "Smith & Jones".into(),
            client_secret: "pi_stale_secret_y".into(),
            ..Default::default()
        };

        let context = checkout_page_context(
            &posted,
            &summary(),
            "pk_test_1",
            CLIENT_SECRET,
            "token",
            Some("ada"),
        )
        .unwrap();
        let page = render(context);

        assert!(page.contains(r#"value="pi_1_secret_x" name="client_secret""#));
        assert!(!page.contains("pi_stale_secret_y"));
        assert!(page.contains(r#"value="Smith &amp; Jones""#));
        assert!(page.contains(r#"name="save-info""#));
    }

    #[ntex::test]
    async fn test_place_order_redirects_to_success_page() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_insert_order()
            .withf(|order: &Order| {
                order.stripe_pid == "pi_1" && order.details.full_name == "Smith & Jones"
            })
            .times(1)
            .returning(|_| Ok(9));
        mock_repo
            .expect_get_product()
            .returning(|_| Ok(Some(product())));
        mock_repo
            .expect_insert_order_line_item()
            .withf(|item: &OrderLineItem| item.order_id == 9 && item.quantity == 2)
            .times(1)
            .returning(|_| Ok(1));
        mock_repo
            .expect_update_order_totals()
            .withf(|order: &Order| order.id == 9 && order.order_total == dec!(20.00))
            .times(1)
            .returning(|_| Ok(()));
        mock_repo.expect_delete_order().never();

        let app = test::init_service(
            web::App::new()
                .wrap(CookieSession::signed(&[0; 32]).secure(false))
                .state(app_state(mock_repo))
                .service(start_session)
                .service(web::scope("/checkout").service(place_order)),
        )
        .await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/start").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string();
        let token = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();

        let form = [
            ("full_name", "Smith & Jones"),
            ("email", "ada@example.com"),
            ("phone_number", "5550100"),
            ("country", "GB"),
            ("postcode", "N1 9GU"),
            ("town_or_city", "London"),
            ("street_address1", "1 Main St"),
            ("client_secret", "pi_1_secret_x"),
            ("csrfmiddlewaretoken", token.as_str()),
        ];
        let req = test::TestRequest::post()
            .uri("/checkout")
            .header(header::COOKIE, cookie)
            .set_form(&form)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        let order_number = location
            .strip_prefix("/checkout/checkout_success/")
            .unwrap();
        assert_eq!(order_number.len(), 32);
    }

    #[ntex::test]
    async fn test_place_order_rejects_a_forged_csrf_token() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_insert_order().never();

        let app = test::init_service(
            web::App::new()
                .wrap(CookieSession::signed(&[0; 32]).secure(false))
                .state(app_state(mock_repo))
                .service(web::scope("/checkout").service(place_order)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/checkout")
            .set_form(&[
                ("client_secret", "pi_1_secret_x"),
                ("csrfmiddlewaretoken", "forged"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
