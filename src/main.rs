use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::dev::{ServiceRequest, ServiceResponse, fn_service};
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer};
use dotenvy::dotenv;
use serde_json::json;
use std::path::Path;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hrms::config::Config;
use hrms::db::{init_db, init_schema, seed_employees, seed_reference_data};
use hrms::docs::ApiDoc;
use hrms::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;
    init_schema(&pool)
        .await
        .expect("Failed to create database schema");
    seed_reference_data(&pool)
        .await
        .expect("Failed to seed reference data");
    seed_employees(&pool)
        .await
        .expect("Failed to seed employees");

    // The frontend bundle is optional; the fallback handler reports when it
    // is missing.
    std::fs::create_dir_all(&config.static_dir)?;

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }

        let index_file = Path::new(&config.static_dir).join("index.html");

        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(cors)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .configure(routes::configure)
            // Everything unmatched falls through to the SPA bundle: real
            // files as-is, anything else the index page.
            .service(
                Files::new("/", &config.static_dir)
                    .index_file("index.html")
                    .default_handler(fn_service(move |req: ServiceRequest| {
                        let index_file = index_file.clone();
                        async move {
                            let (req, _) = req.into_parts();
                            match NamedFile::open_async(&index_file).await {
                                Ok(index) => {
                                    let res = index.into_response(&req);
                                    Ok(ServiceResponse::new(req, res))
                                }
                                Err(_) => Ok(ServiceResponse::new(
                                    req,
                                    HttpResponse::Ok().json(json!({
                                        "message": "Frontend not built. Please run npm run build."
                                    })),
                                )),
                            }
                        }
                    })),
            )
    })
    .bind(server_addr)?
    .run()
    .await
}
