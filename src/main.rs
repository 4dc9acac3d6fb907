use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use seraj_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::QuranAiService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let quran_ai = QuranAiService::new(config.quran_ai.clone());
    if !quran_ai.is_enabled() {
        log::warn!("Quran AI is not configured; /ai/ask will be unavailable");
    }

    let notification_service = NotificationService::new(pool.clone());
    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        notification_service.clone(),
    );
    let user_service = UserService::new(pool.clone(), notification_service.clone());
    let event_service = EventService::new(pool.clone(), notification_service.clone());
    let circle_service = CircleService::new(pool.clone(), notification_service.clone());
    let session_service = SessionService::new(pool.clone());
    let ai_service = AiService::new(pool.clone(), quran_ai);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(circle_service.clone()))
            .app_data(web::Data::new(session_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(ai_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::event_config)
                    .configure(handlers::circle_config)
                    .configure(handlers::session_config)
                    .configure(handlers::notification_config)
                    .configure(handlers::ai_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
