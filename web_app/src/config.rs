//! Application configuration management with security considerations.
//!
//! This module handles all configuration values required for the storefront.
//! Sensitive fields are marked and must never be logged.
//!
//! # Security Notes
//! - Production environments should use secure secret management systems
//! - The Stripe secret key and webhook secret grant full access to payments

use envconfig::Envconfig;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::models::bag::DeliveryPolicy;

/// Application configuration with security-aware field management.
///
/// This struct contains all environment variables used to configure the application.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Database host value (NON-SENSITIVE)
    /// Example: "sqlite:data/storefront.db"
    pub db_host: String,

    /// 🔒 SENSITIVE: Database password to encrypt SQLite data
    pub db_pass_encrypt: String,

    /// Host address for web server binding (NON-SENSITIVE)
    pub wep_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    /// Common values: 80 (HTTP), 443 (HTTPS), 8080 (dev)
    pub wep_server_port: u16,

    /// Path to SSL private key file (SENSITIVE PATH)
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file (NON-SENSITIVE)
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// 🔒 SENSITIVE: CSRF protection password (UUID format)
    pub csrf_pass: String,

    /// 🔒 SENSITIVE: CSRF protection salt (UUID format)
    pub csrf_salt: String,

    /// Stripe publishable key (SEMI-SENSITIVE)
    /// Embedded in the checkout page for Stripe.js
    /// Example: "pk_test_51H..."
    #[envconfig(default = "")]
    pub stripe_public_key: String,

    /// 🔒 SENSITIVE: Stripe secret key used to create and update payment intents
    pub stripe_secret_key: String,

    /// 🔒 SENSITIVE: Signing secret of the Stripe webhook endpoint
    /// Example: "whsec_..."
    pub stripe_wh_secret: String,

    /// Currency of the payment intents (NON-SENSITIVE)
    #[envconfig(default = "usd")]
    pub stripe_currency: String,

    /// Bag total from which delivery is free (NON-SENSITIVE)
    #[envconfig(default = "50")]
    pub free_delivery_threshold: Decimal,

    /// Delivery charge as a percentage of the bag total (NON-SENSITIVE)
    #[envconfig(default = "10")]
    pub standard_delivery_percentage: Decimal,

    /// Sender of the order confirmation emails (NON-SENSITIVE)
    /// Must be a verified SES identity
    pub default_from_email: String,

    /// AWS region of the SES account (NON-SENSITIVE)
    #[envconfig(default = "us-east-2")]
    pub aws_region: String,

    /// 🔒 SENSITIVE: Logfire write token
    #[envconfig(default = "")]
    pub logfire_token: String,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Gets the server URL host with port for non-production environments
    pub fn url_host(&self) -> String {
        if self.is_prod() {
            return self.wep_server_host.to_string();
        }

        format!(
            "{host}:{port}",
            host = self.wep_server_host,
            port = self.wep_server_port
        )
    }

    /// Gets the appropriate protocol (HTTP/HTTPS) based on environment
    pub fn wep_server_protocol(&self) -> String {
        if self.is_prod() {
            return "https".into();
        }
        "http".into()
    }

    /// Constructs the complete base URL for the application
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.wep_server_protocol(), self.url_host())
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            free_delivery_threshold: self.free_delivery_threshold,
            standard_delivery_percentage: self.standard_delivery_percentage,
        }
    }
}

/// Global application configuration instance
///
/// Loaded on first access. If a required variable is missing, the
/// application panics with a descriptive error message.
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    AppConfig::init_from_env()
        .expect("Failed to load application configuration. Check environment variables.")
});
