use crate::auth::TokenKeys;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::user::{CredentialsRequest, LoginResponse, UserResponse};
use crate::service::auth::AuthService;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// List registered users (id and email only)
#[openapi(tag = "Authentication")]
#[get("/register")]
pub async fn list_users(pool: &State<PgPool>, keys: &State<TokenKeys>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(AuthService::new(&repo, keys.inner()).list_users().await?))
}

/// Register a new user
#[openapi(tag = "Authentication")]
#[post("/register", data = "<payload>")]
pub async fn register(pool: &State<PgPool>, keys: &State<TokenKeys>, payload: JsonBody<CredentialsRequest>) -> Result<Custom<String>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    AuthService::new(&repo, keys.inner()).register(&payload).await?;
    Ok(Custom(Status::Created, "User registered successfully".to_string()))
}

/// Exchange email and password for a bearer token valid for one hour
#[openapi(tag = "Authentication")]
#[post("/login", data = "<payload>")]
pub async fn login(pool: &State<PgPool>, keys: &State<TokenKeys>, payload: JsonBody<CredentialsRequest>) -> Result<Json<LoginResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let issued = AuthService::new(&repo, keys.inner()).login(&payload).await?;
    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_users, register, login]
}
