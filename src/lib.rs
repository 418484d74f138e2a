pub mod application;
pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;
pub mod state;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use errors::StartupError;
pub use state::AppState;

use handlers::{
    auth, customers, deliveries, health, orders, pos, products, services, shipments, tracks,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), StartupError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StartupError::Migration(e.to_string()))?;
    Ok(())
}

/// Registers shared state, extractor configs and every JSON route.
///
/// Literal segments (`/export`, `/low-stock`) are registered before the
/// `/{id}` routes they would otherwise be captured by.
pub fn configure_api(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(state)
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(handlers::path_config())
            .route("/ping", web::get().to(health::ping))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            .route("/worker/scan", web::post().to(tracks::record_scan))
            .service(
                web::scope("/admin")
                    .route("/login", web::post().to(auth::admin_login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/api/analytics", web::get().to(orders::analytics))
                    .service(
                        web::scope("/api/orders")
                            .route("", web::get().to(orders::list_orders))
                            .route("/export", web::get().to(orders::export_orders))
                            .route("/{id}", web::get().to(orders::get_order))
                            .route("/{id}", web::put().to(orders::update_order))
                            .route("/{id}", web::delete().to(orders::delete_order))
                            .route("/{id}/advance", web::post().to(orders::advance_order))
                            .route("/{id}/revert", web::post().to(orders::revert_order))
                            .route("/{id}/cancel", web::post().to(orders::cancel_order)),
                    )
                    .service(
                        web::scope("/api/customers")
                            .route("", web::get().to(customers::list_customers))
                            .route("", web::post().to(customers::create_customer))
                            .route("/export", web::get().to(customers::export_customers))
                            .route("/{id}", web::get().to(customers::get_customer))
                            .route("/{id}", web::put().to(customers::update_customer))
                            .route("/{id}", web::delete().to(customers::delete_customer)),
                    )
                    .service(
                        web::scope("/api/services")
                            .route("", web::get().to(services::list_services))
                            .route("", web::post().to(services::create_service))
                            .route("/{id}", web::get().to(services::get_service))
                            .route("/{id}", web::put().to(services::update_service))
                            .route("/{id}", web::delete().to(services::delete_service)),
                    ),
            )
            .service(
                web::scope("/api")
                    .route("/services", web::get().to(services::list_active_services))
                    .route("/orders", web::post().to(orders::place_order))
                    .route("/orders", web::get().to(orders::list_customer_orders))
                    .route("/orders/{id}", web::put().to(orders::update_customer_order))
                    .route("/orders/{id}", web::delete().to(orders::delete_customer_order))
                    .route("/orders/{id}/qr", web::get().to(orders::order_qr))
                    .route("/deliveries", web::get().to(deliveries::list_deliveries))
                    .route("/deliveries", web::post().to(deliveries::create_delivery))
                    .route("/deliveries/{id}", web::get().to(deliveries::get_delivery))
                    .route("/deliveries/{id}", web::put().to(deliveries::update_delivery))
                    .route("/shipments", web::get().to(shipments::list_shipments))
                    .route("/shipments", web::post().to(shipments::create_shipment))
                    .route("/shipments/{id}", web::get().to(shipments::get_shipment))
                    .route(
                        "/shipments/{id}/advance",
                        web::post().to(shipments::advance_shipment),
                    )
                    .route("/tracks", web::post().to(tracks::record_scan))
                    .route("/tracks", web::get().to(tracks::list_tracks))
                    .route("/pos/transactions", web::post().to(pos::create_transaction))
                    .route("/pos/transactions", web::get().to(pos::list_transactions))
                    .route("/products", web::get().to(products::list_products))
                    .route("/products", web::post().to(products::create_product))
                    .route("/products/low-stock", web::get().to(products::low_stock))
                    .route("/products/{id}", web::get().to(products::get_product))
                    .route("/products/{id}", web::put().to(products::update_product))
                    .route("/products/{id}", web::delete().to(products::delete_product)),
            );
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server. When `static_dir` is set the dashboard is served from it
/// after every API route.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
    static_dir: Option<PathBuf>,
) -> std::io::Result<actix_web::dev::Server> {
    let doc = openapi::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .configure(configure_api(state.clone()))
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", doc.clone()));
        if let Some(dir) = &static_dir {
            app = app.service(handlers::spa::spa_service(dir));
        }
        app
    })
    .bind((host.to_string(), port))?
    .run())
}
