use actix_web::web;
use dotenvy::dotenv;
use fabclean_service::config::AppConfig;
use fabclean_service::{build_server, create_pool, run_migrations, AppState, StartupError};

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let state = AppState::from_pool(pool, config.session_ttl(), config.bcrypt_cost);
    match &config.admin_password {
        Some(password) => {
            state.auth.seed_admin(&config.admin_username, password)?;
        }
        None => log::warn!("ADMIN_PASSWORD not set, skipping admin seeding"),
    }
    if config.static_dir.is_none() {
        log::info!("STATIC_DIR not set, serving the API only");
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(
        web::Data::new(state),
        &config.host,
        config.port,
        config.static_dir.clone(),
    )?
    .await?;
    Ok(())
}
