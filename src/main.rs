mod config;
mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;

use actix_web::web::{get, post, resource, scope, Data};
use actix_web::{App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::impls::signer::jwt::JwtMediaSigner;
use crate::middlewares::jwt::JWTMiddleware;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let signer = JwtMediaSigner::new(config.jwt_secret.clone(), &config.media_base_url, config.signed_url_ttl_secs);
    let bind = (config.bind_address.clone(), config.port);
    log::info!("listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(signer.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(handlers::path_config())
            .app_data(handlers::query_config())
            .app_data(handlers::json_config())
            .service(resource("/media/{key:.*}").route(get().to(handlers::media::fetch)))
            .service(
                scope("/practice")
                    .wrap(JWTMiddleware::new(config.jwt_secret.clone()))
                    .service(resource("/annotations").route(post().to(handlers::annotation::annotate)))
                    .service(
                        scope("/questions")
                            .route("", get().to(handlers::practice::questions))
                            .service(
                                scope("/{question_id}")
                                    .route("", get().to(handlers::practice::detail))
                                    .route("/responses", post().to(handlers::practice::submit))
                                    .route("/responses", get().to(handlers::practice::history)),
                            ),
                    ),
            )
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}
