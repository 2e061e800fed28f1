//! # Storefront Web Application
//!
//! Main entry point for the storefront: product pages, session bag, Stripe
//! checkout and the Stripe webhook. Configures SSL, middleware,
//! cryptographic keys, and route handling.

#![recursion_limit = "256"]

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod metric;
pub mod models;
pub mod repo;
pub mod services;
pub mod utils;
pub mod webhook;

use csrf::AesGcmCsrfProtection;
use logfire::config::MetricsOptions;
use ntex::web;
use ntex_cors::Cors;
use ntex_identity::{CookieIdentityPolicy, IdentityService};
use ntex_session::CookieSession;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = &*config::APP_CONFIG;

    // Initialize logging and metrics, local runs only log to the console
    let shutdown_handler = if app_config.env.to_lowercase() == "local" {
        logger::setup_simple_logger()?;
        None
    } else {
        Some(
            logfire::configure()
                .install_panic_handler()
                .with_metrics(Some(MetricsOptions::default()))
                .send_to_logfire(logfire::config::SendToLogfire::Yes)
                .with_token(&app_config.logfire_token)
                .finish()?,
        )
    };

    // Initialize database connection pool
    let sqlite_repo = repo::sqlite::SqlxSqliteRepo {
        db_pool: utils::setup_sqlite_db_pool(app_config.is_prod()).await?,
    };

    // Initialize AWS services
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(app_config.aws_region.clone()))
        .load()
        .await;

    let mail_service = services::mail::SesMailHandler {
        client: aws_sdk_sesv2::Client::new(&aws_config),
        from_email: app_config.default_from_email.clone(),
    };
    let payment_gateway = services::payment::StripeGateway::new(&app_config.stripe_secret_key);

    // Generate cryptographically secure keys for application security
    // The csrf key is derived from configured password and salt using Argon2
    let csrf_key = utils::build_csrf_key(&app_config.csrf_pass, &app_config.csrf_salt)?;
    let session_key = utils::build_random_csrf_key()?;
    let identity_key = utils::build_random_csrf_key()?;

    // Configure and start the web server
    configure_and_run_server(
        csrf_key,
        session_key,
        identity_key,
        sqlite_repo,
        payment_gateway,
        mail_service,
    )
    .await?;

    if let Some(shutdown_handler) = shutdown_handler {
        shutdown_handler.shutdown()?;
    }

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor() -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    let app_config = &*config::APP_CONFIG;
    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Creates application state from the provided services
fn create_app_state(
    csrf_key: [u8; 32],
    sqlite_repo: repo::sqlite::SqlxSqliteRepo,
    payment_gateway: services::payment::StripeGateway,
    mail_service: services::mail::SesMailHandler,
) -> front::AppState {
    front::AppState {
        csrf_protec: AesGcmCsrfProtection::from_key(csrf_key),
        repo: Box::new(sqlite_repo),
        payment_gateway: Box::new(payment_gateway),
        mail_service: Box::new(mail_service),
        delivery_policy: config::APP_CONFIG.delivery_policy(),
    }
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    csrf_key: [u8; 32],
    session_key: [u8; 32],
    identity_key: [u8; 32],
    sqlite_repo: repo::sqlite::SqlxSqliteRepo,
    payment_gateway: services::payment::StripeGateway,
    mail_service: services::mail::SesMailHandler,
) -> anyhow::Result<()> {
    let app_config = &*config::APP_CONFIG;
    let server_addr = ("0.0.0.0", app_config.wep_server_port);

    let server = web::server(move || {
        web::App::new()
            .wrap(
                Cors::new()
                    .allowed_methods(vec!["GET", "HEAD", "POST", "OPTIONS"])
                    .allowed_origin(&app_config.base_url())
                    .allowed_origin("https://js.stripe.com")
                    .allowed_origin("https://api.stripe.com")
                    .finish(),
            )
            .wrap(
                CookieSession::private(&session_key)
                    .secure(app_config.is_prod())
                    .domain(app_config.wep_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .name("storefront-session"),
            )
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&identity_key)
                    .name("user_id")
                    .domain(app_config.wep_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .secure(app_config.is_prod()),
            ))
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(
                csrf_key,
                sqlite_repo.clone(),
                payment_gateway.clone(),
                mail_service.clone(),
            ))
            .configure(front::routes::products)
            .configure(front::routes::bag)
            .configure(front::routes::checkout)
            .configure(front::routes::user_profile)
            .service((
                ntex_files::Files::new("/static", "web/static/"),
                front::server::serve_favicon,
                front::server::index,
            ))
            .default_service(web::route().to(front::server::serve_not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor()?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
