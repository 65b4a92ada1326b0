mod adapters;
mod application;
mod domain;
mod services;

use std::sync::Arc;

use adapters::{
    controllers::{
        auth_controller::AuthController, health_controller::HealthController,
        photo_controller::PhotoController, settings_controller::SettingsController,
    },
    middleware::require_auth,
    repositories::{PgPhotoRepository, PgSettingsRepository, PgUserRepository},
    state::AppState,
    storage_resolver::StorageResolver,
};
use application::repositories::{
    photo_repository::PhotoRepository, settings_repository::SettingsRepository,
    user_repository::UserRepository,
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use domain::config::auth::{AuthConfig, DEFAULT_TOKEN_TTL};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize AWS SDK crypto provider (required for aws-sdk-s3)
    // This must be called before any AWS SDK operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let database_url = std::env::var("DATABASE_URL")
        .expect("ERROR: DATABASE_URL environment variable must be set");

    let jwt_secret =
        std::env::var("JWT_SECRET").expect("ERROR: JWT_SECRET environment variable must be set");

    let token_ttl = std::env::var("TOKEN_TTL_SECONDS")
        .ok()
        .map(|v| v.parse::<u64>().expect("TOKEN_TTL_SECONDS must be a valid u64"))
        .unwrap_or(DEFAULT_TOKEN_TTL);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8787".to_string())
        .parse::<u16>()
        .expect("PORT must be a valid u16");

    // Configure CORS
    let cors = if let Ok(allowed_origins) = std::env::var("CORS_ALLOWED_ORIGINS") {
        // Parse comma-separated origins
        let origins: Vec<_> = allowed_origins
            .split(',')
            .map(|s| s.trim().parse().expect("Invalid CORS origin"))
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow all origins if not specified (only for development)
        CorsLayer::permissive()
    };

    tracing::info!("Connecting to database...");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("ERROR: Failed to connect to PostgreSQL database. Check DATABASE_URL and network connectivity.");
    tracing::info!("Database connection established");

    let settings_repo =
        Arc::new(PgSettingsRepository::new(pool.clone())) as Arc<dyn SettingsRepository>;

    let app_state = AppState {
        auth: AuthConfig::new(jwt_secret, token_ttl),
        photo_repository: Arc::new(PgPhotoRepository::new(pool.clone()))
            as Arc<dyn PhotoRepository>,
        user_repository: Arc::new(PgUserRepository::new(pool)) as Arc<dyn UserRepository>,
        settings_repository: settings_repo.clone(),
        storage: StorageResolver::new(settings_repo),
    };

    // Provision the admin account on first start if credentials are given
    if let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        match app_state.user_repository.find_by_username(&username).await {
            Ok(None) => {
                let hash = application::services::password::hash_password(&password)
                    .expect("Failed to hash admin password");
                app_state
                    .user_repository
                    .create_user(&username, &hash)
                    .await
                    .expect("Failed to create admin user");
                tracing::info!("Created admin user: {}", username);
            }
            Ok(Some(_)) => {}
            Err(e) => tracing::warn!("Admin bootstrap skipped: {:?}", e),
        }
    }

    // Admin routes require a valid Bearer token
    let admin_routes = Router::new()
        .route("/api/admin/photos", post(PhotoController::upload_photo))
        .route(
            "/api/admin/photos/{id}",
            patch(PhotoController::update_photo).delete(PhotoController::delete_photo),
        )
        .route(
            "/api/admin/settings",
            get(SettingsController::get_settings).patch(SettingsController::update_settings),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Public routes that don't require authentication
    let public_routes = Router::new()
        .route("/", get(HealthController::health_check))
        .route("/api/auth/login", post(AuthController::login))
        .route("/api/photos", get(PhotoController::get_photos))
        .route(
            "/api/photos/featured",
            get(PhotoController::get_featured_photos),
        )
        .route("/api/categories", get(PhotoController::get_categories))
        .route(
            "/api/admin/settings/public",
            get(SettingsController::get_public_settings),
        );

    // Combine routes and add CORS layer
    let router = Router::new()
        .merge(admin_routes)
        .merge(public_routes)
        .layer(cors)
        .with_state(app_state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
