use crate::config::AuthConfig;
use crate::error::app_error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user the token was issued to.
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signing material and policy for bearer tokens, built once from [`AuthConfig`]
/// and managed by Rocket.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    enabled: bool,
}

impl TokenKeys {
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(config.token_ttl_seconds),
            enabled: config.enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn issue(&self, user_id: i32) -> Result<IssuedToken, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|source| AppError::TokenEncoding { source })?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(AppError::invalid_token)
    }
}

/// Identity of the caller of a protected route.
///
/// `user_id` is `None` only when authentication is disabled.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: Option<i32>,
}

pub(crate) enum BearerHeader<'a> {
    Missing,
    Token(&'a str),
    Malformed,
}

pub(crate) fn parse_bearer_header(value: Option<&str>) -> BearerHeader<'_> {
    let Some(value) = value.map(str::trim) else {
        return BearerHeader::Missing;
    };

    let (scheme, token) = match value.split_once(' ') {
        Some((scheme, token)) => (scheme, token.trim()),
        None => (value, ""),
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return BearerHeader::Malformed;
    }

    if token.is_empty() { BearerHeader::Missing } else { BearerHeader::Token(token) }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(keys) = req.rocket().state::<TokenKeys>() else {
            error!("token keys are not managed by this rocket instance");
            return Outcome::Error((Status::InternalServerError, AppError::MissingState { name: "TokenKeys" }));
        };

        if !keys.enabled() {
            let anonymous = AuthenticatedUser { user_id: None };
            req.local_cache(|| Some(anonymous.clone()));
            return Outcome::Success(anonymous);
        }

        match parse_bearer_header(req.headers().get_one("Authorization")) {
            BearerHeader::Missing => {
                warn!(method = %req.method(), uri = %req.uri(), "no bearer token provided");
                Outcome::Error((Status::Forbidden, AppError::MissingToken))
            }
            BearerHeader::Malformed => {
                warn!(method = %req.method(), uri = %req.uri(), "authorization header is not a bearer token");
                Outcome::Error((Status::Unauthorized, AppError::invalid_token(jsonwebtoken::errors::ErrorKind::InvalidToken.into())))
            }
            BearerHeader::Token(token) => match keys.verify(token) {
                Ok(claims) => {
                    let user = AuthenticatedUser { user_id: Some(claims.sub) };
                    req.local_cache(|| Some(user.clone()));
                    Outcome::Success(user)
                }
                Err(err) => {
                    warn!(method = %req.method(), uri = %req.uri(), error = ?err, "bearer token rejected");
                    Outcome::Error((Status::Unauthorized, err))
                }
            },
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for AuthenticatedUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Bearer token. Obtain one via POST /login.".to_string()),
            data: SecuritySchemeData::Http {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("bearerAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("bearerAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - invalid or expired token".to_string(),
                ..Default::default()
            }),
        );
        responses.responses.insert(
            "403".to_string(),
            RefOr::Object(Response {
                description: "Forbidden - no token provided".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
