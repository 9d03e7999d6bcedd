use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

use hotel_inventory_api::{config::AppConfig, db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    log::info!("Connecting to database...");
    let pool = db::get_db_pool().await;

    // Run migrations
    log::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    log::info!(
        "Starting server at http://{} (validation: {:?}, room-type writes: {})",
        config.bind_addr,
        config.validation_mode,
        config.room_type_writes_enabled
    );

    let bind_addr = config.bind_addr.clone();
    let pool_data = web::Data::new(pool);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
