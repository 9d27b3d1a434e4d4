use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::AdminUserConfig;
use crate::dto::auth_dto::{ForgotPasswordRequest, RegisterRequest, UpdateProfileRequest, UserResponse};
use crate::model::user::{User, ROLE_ADMIN, ROLE_CUSTOMER};
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::JwtTokenUtils;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

const ALREADY_REGISTERED: &str = "Already registered, please login";

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthSession {
    pub user: UserResponse,
    pub token: String,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<UserResponse, ServiceError>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError>;
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), ServiceError>;
    async fn profile(&self, user_id: &ObjectId) -> Result<UserResponse, ServiceError>;
    async fn update_profile(&self, user_id: &ObjectId, request: UpdateProfileRequest) -> Result<UserResponse, ServiceError>;
    async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError>;
    /// Creates the configured admin unless the email is taken. Returns whether a user was created.
    async fn seed_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError>;
}

pub struct UserServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    jwt_utils: Arc<dyn JwtTokenUtils>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_utils: Arc<dyn JwtTokenUtils>) -> Self {
        Self { user_repo, jwt_utils }
    }

    fn hash(password: &str) -> Result<String, ServiceError> {
        PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))
    }

    async fn create_user(&self, user: User) -> Result<User, ServiceError> {
        if self.user_repo.find_by_email(&user.email).await?.is_some() {
            return Err(ServiceError::Conflict(ALREADY_REGISTERED.to_string()));
        }
        self.user_repo.insert(user).await.map_err(|e| match e {
            RepositoryError::AlreadyExists(_) => ServiceError::Conflict(ALREADY_REGISTERED.to_string()),
            other => ServiceError::from(other),
        })
    }

    async fn load(&self, user_id: &ObjectId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<UserResponse, ServiceError> {
        info!("Registering new user");
        let user = User {
            id: None,
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            password: Self::hash(&request.password)?,
            phone: request.phone.trim().to_string(),
            address: request.address.trim().to_string(),
            answer: request.answer.trim().to_string(),
            role: ROLE_CUSTOMER,
            created_at: None,
            updated_at: None,
        };

        let result = self.create_user(user).await;
        match &result {
            Ok(_) => info!("User registered successfully"),
            Err(e) => error!("Failed to register user: {e}"),
        }
        Ok(UserResponse::from(&result?))
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError> {
        info!("User login attempt");
        let email = normalize_email(email);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Email is not registered".to_string()))?;

        let valid = PasswordUtilsImpl::verify_password(password, &user.password)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!("Invalid password for user: {}", email);
            return Err(ServiceError::Unauthorized("Invalid password".to_string()));
        }

        let user_id = user.id.map(|id| id.to_hex()).unwrap_or_default();
        let token = self
            .jwt_utils
            .generate_token(&user_id, &user.email, user.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;

        info!("User logged in successfully");
        Ok(AuthSession { user: UserResponse::from(&user), token })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), ServiceError> {
        let wrong = || ServiceError::NotFound("Wrong email or answer".to_string());

        let user = self
            .user_repo
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or_else(wrong)?;
        if user.answer != request.answer.trim() {
            warn!("Security answer mismatch");
            return Err(wrong());
        }
        let id = user.id.ok_or_else(wrong)?;

        let user = User { password: Self::hash(&request.new_password)?, ..user };
        self.user_repo.update(id, user).await?;
        info!("Password reset successfully");
        Ok(())
    }

    async fn profile(&self, user_id: &ObjectId) -> Result<UserResponse, ServiceError> {
        Ok(UserResponse::from(&self.load(user_id).await?))
    }

    #[instrument(skip(self, request), fields(user_id = %user_id))]
    async fn update_profile(&self, user_id: &ObjectId, request: UpdateProfileRequest) -> Result<UserResponse, ServiceError> {
        let mut user = self.load(user_id).await?;

        if let Some(password) = request.password.as_deref() {
            user.password = Self::hash(password)?;
        }
        let keep_or_replace = |current: &mut String, value: Option<String>| {
            if let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                *current = value;
            }
        };
        keep_or_replace(&mut user.name, request.name);
        keep_or_replace(&mut user.phone, request.phone);
        keep_or_replace(&mut user.address, request.address);

        let updated = self.user_repo.update(*user_id, user).await?;
        info!("Profile updated");
        Ok(UserResponse::from(&updated))
    }

    async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError> {
        let users = self.user_repo.list().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self, config), fields(email = %config.email))]
    async fn seed_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError> {
        let email = normalize_email(&config.email);
        if let Some(existing) = self.user_repo.find_by_email(&email).await? {
            if !existing.is_admin() {
                warn!("Configured admin email belongs to a customer account; not promoting");
            }
            info!("Admin user already exists, skipping creation.");
            return Ok(false);
        }

        let admin = User {
            id: None,
            name: config.name.trim().to_string(),
            email,
            password: Self::hash(&config.password)?,
            phone: config.phone.trim().to_string(),
            address: config.address.trim().to_string(),
            answer: config.answer.trim().to_string(),
            role: ROLE_ADMIN,
            created_at: None,
            updated_at: None,
        };
        self.create_user(admin).await?;
        info!("First admin user created.");
        Ok(true)
    }
}
