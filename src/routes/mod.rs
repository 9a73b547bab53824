pub mod auth;
pub mod channels;
pub mod health;
pub mod messages;

use actix_web::web;

pub fn configure(app: &mut web::ServiceConfig) {
    app.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login)),
        )
        .service(
            web::scope("/channels")
                .route("/mine", web::get().to(channels::get_my_channels))
                .route("", web::post().to(channels::create_channel))
                .route("/{id}", web::get().to(channels::get_channel))
                .route("/{id}", web::patch().to(channels::update_channel))
                .route("/{id}", web::delete().to(channels::delete_channel))
                .route("/{id}/members/me", web::delete().to(channels::leave_channel))
                .route("/{id}/members/{user_id}", web::post().to(channels::add_member))
                .route(
                    "/{id}/members/{user_id}",
                    web::delete().to(channels::kick_member),
                )
                .route("/{id}/messages", web::get().to(messages::get_messages))
                .route("/{id}/messages", web::post().to(messages::create_message)),
        )
        .service(
            web::scope("/messages")
                .route("/{id}", web::patch().to(messages::update_message))
                .route("", web::delete().to(messages::delete_messages)),
        );
}
