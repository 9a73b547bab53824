use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use tagchat::config::Config;
use tagchat::db::Db;
use tagchat::routes;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Info by default, overridable through RUST_LOG
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cfg = Config::init();

    let db = Db::connect_and_migrate(&cfg.database_path).await?;

    log::info!("starting server at {}", cfg.listen);

    let listen = cfg.listen.clone();
    let uploads_dir = cfg.uploads_dir.clone();
    HttpServer::new(move || {
        let cors = Cors::permissive()
            .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "DELETE"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(Data::new(cfg.clone()))
            .app_data(Data::new(db.clone()))
            .configure(routes::configure)
            .service(actix_files::Files::new("/uploads", &uploads_dir))
    })
    .bind(&listen)?
    .run()
    .await?;

    Ok(())
}
