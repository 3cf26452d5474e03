use crate::auth::{IssuedToken, TokenKeys};
use crate::database::user::{UserRepository, dummy_verify, hash_password, verify_password};
use crate::error::app_error::AppError;
use crate::models::user::{CredentialsRequest, User, UserResponse};
use tracing::info;
use validator::Validate;

pub struct AuthService<'a, R: UserRepository + Sync> {
    repository: &'a R,
    keys: &'a TokenKeys,
}

impl<'a, R: UserRepository + Sync> AuthService<'a, R> {
    pub fn new(repository: &'a R, keys: &'a TokenKeys) -> Self {
        AuthService { repository, keys }
    }

    pub async fn register(&self, request: &CredentialsRequest) -> Result<User, AppError> {
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        let user = self.repository.create_user(&request.email, &password_hash).await?;
        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password both yield [`AppError::InvalidCredentials`].
    pub async fn login(&self, request: &CredentialsRequest) -> Result<IssuedToken, AppError> {
        let Some(user) = self.repository.get_user_by_email(&request.email).await? else {
            dummy_verify(&request.password);
            return Err(AppError::InvalidCredentials);
        };

        verify_password(&user, &request.password)?;

        let issued = self.keys.issue(user.id)?;
        info!(user_id = user.id, "user logged in");
        Ok(issued)
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.repository.list_users().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }
}
