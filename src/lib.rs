mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::auth::TokenKeys;
use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::{Build, Rocket, http::Method};
use rocket_cors::{AllowedHeaders, AllowedOrigins, Cors, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG overrides the configured level, e.g.
    //   RUST_LOG=bookstore_inventory::routes=debug
    //   RUST_LOG=info,sqlx=warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed when several rockets are built in one process.
    if json_format {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SecretCheck {
    Set,
    /// Tokens would be signed with an empty HMAC key.
    Empty,
    /// Empty secret outside the debug profile.
    Rejected,
    AuthDisabled,
}

fn check_jwt_secret(auth_config: &config::AuthConfig, profile: &str) -> SecretCheck {
    if !auth_config.enabled {
        SecretCheck::AuthDisabled
    } else if !auth_config.jwt_secret.trim().is_empty() {
        SecretCheck::Set
    } else if profile == "debug" {
        SecretCheck::Empty
    } else {
        SecretCheck::Rejected
    }
}

fn ensure_jwt_secret(auth_config: &config::AuthConfig) {
    let profile = std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "debug".to_string());

    match check_jwt_secret(auth_config, &profile) {
        SecretCheck::Rejected => panic!(
            "JWT_SECRET is required for profile '{}'. Generate one with: openssl rand -base64 32",
            profile
        ),
        SecretCheck::Empty => warn!(
            profile = %profile,
            "JWT_SECRET is empty: bearer tokens are signed with an empty key and can be forged"
        ),
        SecretCheck::Set | SecretCheck::AuthDisabled => {}
    }
}

/// A single `*` entry allows any origin and is answered with a literal `*`,
/// which `rocket_cors` refuses to combine with credentials.
fn build_cors(cors_config: &config::CorsConfig) -> Result<Cors, rocket_cors::Error> {
    let (allowed_origins, send_wildcard) = match cors_config.allowed_origins.as_slice() {
        [origin] if origin == "*" => (AllowedOrigins::all(), true),
        origins => (AllowedOrigins::some_exact(origins), false),
    };

    CorsOptions {
        allowed_origins,
        send_wildcard,
        allowed_methods: [Method::Get, Method::Post, Method::Put, Method::Patch, Method::Delete]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::some(&["Authorization", "Content-Type"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
    .to_cors()
}

/// `"api/"`, `"/api"` and `" /api// "` all mount at `/api`; blank means `/`.
fn normalize_base_path(raw: &str) -> String {
    match raw.trim().trim_matches('/') {
        "" => config::DEFAULT_API_BASE_PATH.to_string(),
        path => format!("/{}", path),
    }
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let joined = format!("{}/{}", base_path.trim_end_matches('/'), path.trim_start_matches('/'));
    if joined.len() > 1 {
        joined.trim_end_matches('/').to_string()
    } else {
        joined
    }
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (index_routes, index_openapi) = app_routes::index::routes();
    let (health_routes, health_openapi) = app_routes::health::routes();
    let (user_routes, user_openapi) = app_routes::user::routes();
    let (book_routes, book_openapi) = app_routes::book::routes();

    vec![
        RouteSpec {
            path: "",
            routes: index_routes,
            openapi: index_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
        RouteSpec {
            path: "",
            routes: user_routes,
            openapi: user_openapi,
        },
        RouteSpec {
            path: "/books",
            routes: book_routes,
            openapi: book_openapi,
        },
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Rocket<Build> {
    let mut openapi_list = Vec::new();
    for spec in collect_route_specs() {
        rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        openapi_list.push((spec.path, spec.openapi));
    }

    if !enable_swagger {
        return rocket;
    }

    let openapi_docs = match marge_spec_list(&openapi_list) {
        Ok(docs) => docs,
        Err(err) => panic!("Could not merge OpenAPI spec: {}", err),
    };

    let settings = rocket_okapi::settings::OpenApiSettings::default();
    rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

    rocket.mount(
        join_base_path(base_path, "docs"),
        make_swagger_ui(&SwaggerUIConfig {
            url: join_base_path(base_path, "openapi.json"),
            ..Default::default()
        }),
    )
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_jwt_secret(&config.auth);

    let cors = match build_cors(&config.cors) {
        Ok(cors) => cors,
        Err(err) => panic!("Invalid CORS configuration: {}", err),
    };
    let base_path = normalize_base_path(&config.api.base_path);

    let rocket = rocket::custom(config.rocket_figment())
        .manage(TokenKeys::from_config(&config.auth))
        .manage(config.books)
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database));

    mount_api_routes(rocket, &base_path, config.api.enable_swagger)
        .register(base_path.as_str(), app_routes::error::catchers())
}
