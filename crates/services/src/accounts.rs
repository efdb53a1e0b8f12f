//! Registration and login. Credential checks are delegated to the
//! [`PasswordHasher`] port; nothing here touches raw hashes.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use domains::validation::{validate_email, validate_password, validate_username};
use domains::{DomainError, FieldErrors, NewUser, PasswordHasher, Result, User, UserRepository};

pub const BAD_CREDENTIALS: &str = "Username/Password combination is incorrect";
pub const ACCOUNT_EXISTS: &str = "Username or email already exists";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    /// Username, or email when it contains `@`
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<User> {
        let mut errors = FieldErrors::new();
        errors
            .check("username", validate_username(&form.username))
            .check("password", validate_password(&form.password))
            .check("email", validate_email(&form.email));
        errors.into_result().map_err(DomainError::Validation)?;

        let password_hash = self.hasher.hash(&form.password).await?;
        let email = Some(form.email.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        match self
            .users
            .create_user(NewUser {
                username: form.username.clone(),
                email,
                password_hash,
            })
            .await
        {
            Ok(user) => {
                info!(user_id = %user.user_id, "user registered");
                Ok(user)
            }
            Err(DomainError::Conflict(_)) => Err(DomainError::Rejected(ACCOUNT_EXISTS.to_string())),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip_all, fields(login = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<User> {
        let mut errors = FieldErrors::new();
        errors
            .check("username", validate_username(&form.username))
            .check("password", validate_password(&form.password));
        errors.into_result().map_err(DomainError::Validation)?;

        let Some(credentials) = self.users.find_credentials(&form.username).await? else {
            warn!("login for unknown account");
            return Err(DomainError::Rejected(BAD_CREDENTIALS.to_string()));
        };
        if !self.hasher.verify(&form.password, &credentials.password_hash).await {
            warn!(user_id = %credentials.user_id, "login with wrong password");
            return Err(DomainError::Rejected(BAD_CREDENTIALS.to_string()));
        }

        self.users
            .find_user(credentials.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("user", credentials.user_id.to_string()))
    }

    pub async fn user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.users.find_user(user_id).await
    }
}
