use crate::{
    api::{attendance, daily_report, dashboard, notification, report, settings, users},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check-in")
                            .route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out")
                            .route(web::post().to(attendance::check_out)),
                    )
                    .service(web::resource("/me").route(web::get().to(attendance::my_attendance)))
                    .service(
                        web::resource("/stats").route(web::get().to(attendance::attendance_stats)),
                    )
                    .service(
                        web::resource("/calendar/{user_id}")
                            .route(web::get().to(attendance::attendance_calendar)),
                    )
                    .service(
                        web::resource("/wfh-request")
                            .route(web::post().to(attendance::create_wfh_request)),
                    )
                    .service(
                        web::resource("/wfh-request/{id}")
                            .route(web::put().to(attendance::update_wfh_request)),
                    )
                    .service(
                        web::resource("/wfh-requests")
                            .route(web::get().to(attendance::wfh_requests)),
                    )
                    // /attendance
                    .service(
                        web::resource("").route(web::get().to(attendance::all_attendance)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(
                        web::resource("/daily")
                            .route(web::post().to(daily_report::create_daily_report)),
                    )
                    .service(
                        web::resource("/daily/{id}")
                            .route(web::put().to(daily_report::review_daily_report))
                            .route(web::get().to(daily_report::employee_daily_reports)),
                    )
                    .service(
                        web::resource("/attendance")
                            .route(web::get().to(report::attendance_report)),
                    )
                    .service(
                        web::resource("/performance")
                            .route(web::get().to(report::performance_report)),
                    )
                    .service(
                        web::resource("/key-insights").route(web::get().to(report::key_insights)),
                    )
                    .service(web::resource("/export").route(web::get().to(report::export_report))),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("/read-all")
                            .route(web::put().to(notification::mark_all_read)),
                    )
                    .service(
                        web::resource("/{id}/read").route(web::put().to(notification::mark_read)),
                    )
                    // /notifications
                    .service(
                        web::resource("")
                            .route(web::get().to(notification::list_notifications))
                            .route(web::post().to(notification::create_notification)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .service(web::resource("/summary").route(web::get().to(dashboard::summary))),
            )
            .service(
                web::scope("/settings")
                    // /settings
                    .service(
                        web::resource("")
                            .route(web::get().to(settings::get_settings))
                            .route(web::put().to(settings::update_settings)),
                    ),
            )
            .service(
                web::scope("/users")
                    // /users
                    .service(web::resource("").route(web::get().to(users::list_users))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
