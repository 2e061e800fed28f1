//! Stripe webhook endpoint
//!
//! Every request must carry a valid `Stripe-Signature` header computed over
//! the raw body with the endpoint secret. Events are processed synchronously
//! and the reply body tells what happened, which Stripe shows in its
//! dashboard.

use super::{handler, schemas, security};
use crate::{config, consts, front::AppState, metric};
use chrono::Utc;
use ntex::{util::Bytes, web};

/// Webhook receiver endpoint (POST)
///
/// # Returns
/// - 400 when the signature or the payload is invalid
/// - 500 when a paid order could not be stored
/// - 200 otherwise
#[web::post("/wh/")]
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let signature = req
        .headers()
        .get(consts::STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !security::verify_signature(
        signature,
        &body,
        &config::APP_CONFIG.stripe_wh_secret,
        consts::STRIPE_WH_TOLERANCE_SECS,
        Utc::now().timestamp(),
    ) {
        return Ok(web::HttpResponse::BadRequest()
            .content_type("text/plain")
            .body("Invalid signature"));
    }

    let event: schemas::StripeEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            logfire::error!(
                "Failed to parse webhook payload: {error}",
                error = e.to_string()
            );
            return Ok(web::HttpResponse::BadRequest()
                .content_type("text/plain")
                .body("Invalid payload"));
        }
    };

    logfire::info!(
        "Stripe webhook {event_id} received: {event_type}",
        event_id = event.id.clone(),
        event_type = event.event_type.clone()
    );
    metric::incr_webhook_statds(&event.event_type);

    let reply = handler::StripeWebhookHandler {
        repo: &app_state.repo,
        mail_service: &app_state.mail_service,
        policy: app_state.delivery_policy,
        contact_email: &config::APP_CONFIG.default_from_email,
        lookup_attempts: consts::ORDER_LOOKUP_ATTEMPTS,
        lookup_delay: consts::ORDER_LOOKUP_DELAY,
    }
    .handle_event(event)
    .await;

    Ok(web::HttpResponse::build(reply.status)
        .content_type("text/plain")
        .body(reply.content))
}
