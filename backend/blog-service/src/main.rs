use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::handlers;
use blog_service::services::{ImageStore, Mailer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match blog_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Database connection pool
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {}", e)))?;

    tracing::info!("Connected to database, migrations applied");

    // Mailer is constructed once here and injected; no lazy global client
    let mailer = Mailer::new(&config.email)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Mailer setup failed: {}", e)))?;
    if !mailer.is_enabled() {
        tracing::warn!("newsletter dispatch will run in no-op mode");
    }

    let image_store = ImageStore::new(&config.uploads.dir, &config.uploads.public_prefix);
    image_store.ensure_dir().await.map_err(|e| {
        io::Error::new(io::ErrorKind::Other, format!("Upload dir setup failed: {}", e))
    })?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });
    let mailer_data = web::Data::new(mailer);
    let image_store_data = web::Data::new(image_store.clone());
    let config_data = web::Data::new(config.clone());

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(config_data.clone())
            .app_data(mailer_data.clone())
            .app_data(image_store_data.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/api/health", web::get().to(health_summary))
            .route("/api/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/posts")
                            .route("/admin", web::get().to(handlers::list_all_posts))
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_posts))
                                    .route(web::post().to(handlers::create_post)),
                            )
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::put().to(handlers::update_post))
                                    .route(web::delete().to(handlers::delete_post)),
                            ),
                    )
                    .service(
                        web::scope("/comments")
                            .route("/post/{post_id}", web::get().to(handlers::get_thread))
                            .route("/admin", web::get().to(handlers::list_moderation_queue))
                            .service(
                                web::resource("")
                                    .route(web::post().to(handlers::submit_comment)),
                            )
                            .route(
                                "/{comment_id}/approve",
                                web::patch().to(handlers::approve_comment),
                            )
                            .route("/{comment_id}/reply", web::post().to(handlers::admin_reply))
                            .route("/{comment_id}", web::delete().to(handlers::delete_comment)),
                    )
                    .service(
                        web::scope("/subscribe")
                            .route("/admin", web::get().to(handlers::list_subscribers))
                            .service(
                                web::resource("")
                                    .route(web::post().to(handlers::subscribe))
                                    .route(web::get().to(handlers::list_subscribers)),
                            ),
                    )
                    .service(
                        web::scope("/newsletter")
                            .route("/send", web::post().to(handlers::send_newsletter))
                            .route("/stats", web::get().to(handlers::newsletter_stats)),
                    ),
            )
            .service(actix_files::Files::new(
                &config.uploads.public_prefix,
                image_store.dir(),
            ))
    })
    .bind(&bind_address)?
    .run()
    .await
}
