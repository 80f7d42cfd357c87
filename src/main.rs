mod clients;
mod database;
mod engine;
mod handlers;
mod models;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::env;

use crate::clients::photo_storage::PhotoStorageClient;
use crate::database::Database;
use crate::handlers::FavoritesStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let bind_address = format!("{}:{}", host, port);
    let photo_storage_url =
        env::var("PHOTO_STORAGE_URL").unwrap_or_else(|_| "http://localhost:8084".to_string());

    let database_url = env::var("DATABASE_URL").map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "DATABASE_URL must be set in environment",
        )
    })?;

    let db = Database::connect(&database_url).await.map_err(|err| {
        log::error!("Failed to initialize database: {err:?}");
        std::io::Error::new(std::io::ErrorKind::Other, err)
    })?;

    let db_data = web::Data::new(db);
    let storage_client = web::Data::new(PhotoStorageClient::new(photo_storage_url));
    let favorites = web::Data::new(FavoritesStore::default());

    log::info!("🚀 Starting MyBuo Directory Service on {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(db_data.clone())
            .app_data(storage_client.clone())
            .app_data(favorites.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                web::scope("/api/v1")
                    // Health
                    .service(handlers::health_check)
                    // Directory views (engine-derived)
                    .service(handlers::list_featured)
                    .service(handlers::list_new_arrivals)
                    .service(handlers::list_categories)
                    .service(handlers::browse_directory)
                    .service(handlers::list_directory_events)
                    // Businesses
                    .service(handlers::create_business)
                    .service(handlers::get_business)
                    .service(handlers::list_businesses_for_user)
                    .service(handlers::update_business)
                    .service(handlers::delete_business)
                    // Reviews
                    .service(handlers::submit_review)
                    .service(handlers::edit_review)
                    .service(handlers::list_business_reviews)
                    // Events
                    .service(handlers::create_event)
                    .service(handlers::list_business_events)
                    .service(handlers::delete_event)
                    // Photos
                    .service(handlers::register_photos)
                    .service(handlers::reorder_photos)
                    .service(handlers::delete_photo)
                    // Favorites
                    .service(handlers::toggle_favorite)
                    .service(handlers::list_favorites),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
