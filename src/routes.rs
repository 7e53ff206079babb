use crate::{
    api::{dashboard, submission, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("per_millisecond and burst_size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = build_limiter(config.rate_login_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .wrap(login_limiter)
            .service(web::resource("/login").route(web::post().to(handlers::login)))
            .service(web::resource("/logout").route(web::post().to(handlers::logout))),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            // authentication
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
            .service(
                web::scope("/submissions")
                    // /submissions
                    .service(web::resource("").route(web::post().to(submission::submit)))
                    // /submissions/today
                    .service(web::resource("/today").route(web::get().to(submission::get_today))),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/submissions")
                            .route(web::get().to(dashboard::list_submissions)),
                    )
                    .service(web::resource("/stats").route(web::get().to(dashboard::admin_stats)))
                    .service(web::resource("/export").route(web::get().to(dashboard::export)))
                    // /admin/users
                    .service(
                        web::resource("/users")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::add_user)),
                    )
                    // /admin/users/{id}
                    .service(
                        web::resource("/users/{id}").route(web::delete().to(user::remove_user)),
                    ),
            ),
    );
}

// LOGIN
//  └─ token (SESSION_TTL, or REMEMBER_TTL when remembered)
//       └─ session record: session-scoped storage, or durable when remembered

// API REQUEST
//  └─ Authorization: Bearer token
//       └─ rejected once the session is logged out or the user is removed
