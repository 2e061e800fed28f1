pub const CSRF_TOKEN_COOKIE_NAME: &str = "csrf_token";
pub const BAG_SESSION_KEY: &str = "bag";
pub const SAVE_INFO_SESSION_KEY: &str = "save_info";
pub const MESSAGES_SESSION_KEY: &str = "messages";

/// Username Stripe metadata carries for guest checkouts
pub const ANONYMOUS_USER: &str = "AnonymousUser";

pub const STRIPE_API_URL: &str = "https://api.stripe.com/v1";
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";
/// Max age of a signed webhook event
pub const STRIPE_WH_TOLERANCE_SECS: i64 = 300;

pub const ORDER_LOOKUP_ATTEMPTS: u32 = 5;
pub const ORDER_LOOKUP_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

pub const MAX_BAG_ITEM_QUANTITY: u32 = 99;

pub const MAX_AGE_COOKIES: i64 = chrono::TimeDelta::hours(4).num_seconds();
