// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                // Trailer browsing
                .route("/trailers", web::get().to(handlers::list_trailers))
                .route("/trailers/featured", web::get().to(handlers::featured_trailers))
                .route("/trailers/new-releases", web::get().to(handlers::new_releases))
                .route(
                    "/trailers/categories",
                    web::get().to(handlers::trending_categories),
                )
                .route(
                    "/trailers/continue-watching",
                    web::get().to(handlers::continue_watching),
                )
                .route("/trailers/{id}", web::get().to(handlers::get_trailer))
                .route(
                    "/trailers/{id}/related",
                    web::get().to(handlers::related_trailers),
                )
                // Engagement
                .route("/trailers/{id}/view", web::post().to(handlers::track_view))
                .route("/trailers/{id}/like", web::post().to(handlers::toggle_like))
                .route("/trailers/{id}/like", web::get().to(handlers::like_status))
                .route(
                    "/trailers/{id}/comments",
                    web::get().to(handlers::list_comments),
                )
                .route(
                    "/trailers/{id}/comments",
                    web::post().to(handlers::add_comment),
                )
                .route("/trailers/{id}/share", web::post().to(handlers::share_trailer))
                // Contact form & newsletter
                .route("/contact", web::post().to(handlers::contact))
                .route("/newsletter", web::post().to(handlers::subscribe))
                // Ads (public placement lookup)
                .route("/ads/active", web::get().to(handlers::active_ad))
                // Admin surface; each handler re-checks the admin role
                .service(
                    web::scope("/admin")
                        .route("/trailers", web::post().to(handlers::create_trailer))
                        .route("/trailers/{id}", web::put().to(handlers::update_trailer))
                        .route("/trailers/{id}", web::delete().to(handlers::delete_trailer))
                        .route("/comments/{id}", web::delete().to(handlers::delete_comment))
                        .route("/ads", web::get().to(handlers::list_ads))
                        .route("/ads", web::post().to(handlers::create_ad))
                        .route("/ads/{id}", web::put().to(handlers::update_ad))
                        .route("/ads/{id}", web::delete().to(handlers::delete_ad))
                        .route("/uploads", web::post().to(handlers::upload_media)),
                ),
        );
}
