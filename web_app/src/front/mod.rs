pub mod bag;
pub mod checkout;
pub mod errors;
pub mod flash;
pub mod forms;
pub mod middleware;
pub mod products;
pub mod profile;
pub mod routes;
pub mod server;
pub mod templates;
pub mod utils;

use crate::{models::bag::DeliveryPolicy, repo, services};
use csrf::AesGcmCsrfProtection;

pub struct AppState {
    pub csrf_protec: AesGcmCsrfProtection,
    pub repo: repo::ImplAppRepo,
    pub payment_gateway: services::ImplPaymentGateway,
    pub mail_service: services::ImplMailService,
    pub delivery_policy: DeliveryPolicy,
}
