mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{MongoSensorStore, MongoUserStore, SensorStore, UserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Weather Studies API...");
    log::info!("📊 Database: {}", config.database.database_name);

    let db = match database::MongoDB::new(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("✅ MongoDB connected successfully");

    let users: Arc<dyn UserStore> = Arc::new(MongoUserStore::new(&db));
    let sensors: Arc<dyn SensorStore> = Arc::new(MongoSensorStore::new(&db));
    let users_data = web::Data::from(users);
    let sensors_data = web::Data::from(sensors);

    let bind_address = config.bind_address();
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}", bind_address);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(users_data.clone())
            .app_data(sensors_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
