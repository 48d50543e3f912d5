pub mod api;
mod emails;
mod http_error;

use self::http_error::HttpError;
use crate::config::Config;
use crate::database::Database;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::middleware::{Compress, DefaultHeaders, Logger};
use actix_web::web::{self, Data, Json, ServiceConfig};
use actix_web::{get, App, HttpServer, Responder, Result};
use anyhow::Context;
use log::info;
use serde_json::json;

/// Run a blocking database operation on actix's blocking thread pool
async fn with_db<T, F>(db: &Data<Database>, operation: F) -> Result<T, HttpError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = Data::clone(db);
    web::block(move || operation(db.get_ref()))
        .await?
        .map_err(HttpError::from)
}

#[get("/health")]
async fn health(db: Data<Database>) -> Result<impl Responder> {
    with_db(&db, Database::ping).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Register all of the server's routes
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(health)
        .service(web::scope("/emails").configure(emails::configure));
}

/// Build the CORS policy, allowing any origin when none are configured
fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_any_header()
        .max_age(3600);
    if allowed_origins.is_empty() {
        cors.allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

/// Create the HTTP server and bind it to the configured address
pub fn create_server(db: Database, config: &Config) -> anyhow::Result<Server> {
    let db = Data::new(db);
    let allowed_origins = config.allowed_origins.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::clone(&db))
            .wrap(cors(&allowed_origins))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Powered-By", "inbox")))
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| {
        format!(
            "Failed to bind HTTP server to {}:{}",
            config.host, config.port
        )
    })?;

    for addr in server.addrs() {
        info!("Starting HTTP server on http://{addr}");
    }
    Ok(server.run())
}
