//! Registration, login and profile management

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hr_auth::{CurrentUser, JwtService, PasswordHasher, TwoFactorStore};
use hr_contracts::{
    validate_optional_text, Registration, RegistrationContract, SYSTEM_CODE_PREFIX,
};
use hr_core::config::{AuthConfig, EmailConfig};
use hr_core::error::ValidationErrors;
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_core::{HrError, HrResult};
use hr_db::{Repository, UserStore};
use hr_models::{NewUser, ProfileUpdate, Role, User, UserUpdate};
use hr_notifications::{render_two_factor_code, EmailAddress, EmailSender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::base::{found, validate};

const INVALID_LOGIN: &str = "Invalid email or password";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl Registration for RegisterRequest {
    fn employee_code(&self) -> &str {
        &self.employee_code
    }

    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password(&self) -> &str {
        &self.password
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued token together with the account it belongs to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginOutcome {
    Authenticated(AuthSession),
    /// A code was mailed; finish with `verify_code`
    #[serde(rename_all = "camelCase")]
    TwoFactorRequired {
        email: String,
        expires_at: DateTime<Utc>,
    },
}

/// Settings the auth service reads from [`AuthConfig`] and friends
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub token_ttl_seconds: u64,
    pub password_min_length: usize,
    /// Require a code for every account, not only opted-in ones
    pub two_factor_for_all: bool,
    pub email: EmailConfig,
}

impl AuthSettings {
    pub fn new(auth: &AuthConfig, two_factor_enabled: bool, email: &EmailConfig) -> Self {
        Self {
            token_ttl_seconds: auth.token_expiration_seconds,
            password_min_length: auth.password_min_length,
            two_factor_for_all: two_factor_enabled,
            email: email.clone(),
        }
    }
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtService>,
    codes: Arc<dyn TwoFactorStore>,
    mailer: Arc<dyn EmailSender>,
    hasher: PasswordHasher,
    settings: AuthSettings,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt: Arc<JwtService>,
        codes: Arc<dyn TwoFactorStore>,
        mailer: Arc<dyn EmailSender>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            jwt,
            codes,
            mailer,
            hasher: PasswordHasher::new(),
            settings,
        }
    }

    fn session(&self, user: User) -> HrResult<AuthSession> {
        let token = self
            .jwt
            .create_user_token(user.id, &user.email, user.role, self.settings.token_ttl_seconds)
            .map_err(|e| HrError::Internal(e.to_string()))?;
        Ok(AuthSession { token, user })
    }

    fn hash(&self, password: &str) -> HrResult<String> {
        self.hasher
            .hash(password)
            .map_err(|e| HrError::Internal(e.to_string()))
    }

    fn requires_two_factor(&self, user: &User) -> bool {
        self.settings.two_factor_for_all || user.two_factor_enabled
    }

    /// Self-registration; new accounts are always employees
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> HrResult<AuthSession> {
        request.email = normalize_email(&request.email);
        request.employee_code = request.employee_code.trim().to_string();
        request.first_name = request.first_name.trim().to_string();
        request.last_name = request.last_name.trim().to_string();

        validate(
            &RegistrationContract::new(self.settings.password_min_length),
            &request,
        )?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(HrError::conflict("Email is already registered"));
        }
        if self
            .users
            .find_by_employee_code(&request.employee_code)
            .await?
            .is_some()
        {
            return Err(HrError::conflict("Employee code is already registered"));
        }

        let user = self
            .users
            .create(NewUser {
                password_hash: self.hash(&request.password)?,
                employee_code: request.employee_code,
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                role: Role::Employee,
                department: blank_to_none(request.department),
                position: blank_to_none(request.position),
            })
            .await?;

        info!(user_id = user.id, "User registered");
        self.session(user)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> HrResult<LoginOutcome> {
        let email = normalize_email(&request.email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|user| self.hasher.verify(&request.password, &user.password_hash))
            .ok_or_else(|| {
                debug!("Login rejected");
                HrError::unauthorized(INVALID_LOGIN)
            })?;

        if self.requires_two_factor(&user) {
            let expires_at = self.mail_code(&user).await?;
            return Ok(LoginOutcome::TwoFactorRequired {
                email: user.email,
                expires_at,
            });
        }

        info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome::Authenticated(self.session(user)?))
    }

    /// Mail a fresh code. Unknown addresses get the same answer so the
    /// endpoint does not reveal who has an account.
    #[instrument(skip(self))]
    pub async fn send_code(&self, email: &str) -> HrResult<()> {
        let email = normalize_email(email);
        match self.users.find_by_email(&email).await? {
            Some(user) => {
                self.mail_code(&user).await?;
            }
            None => debug!("Code requested for unknown address"),
        }
        Ok(())
    }

    async fn mail_code(&self, user: &User) -> HrResult<DateTime<Utc>> {
        let issued = self.codes.issue(&user.email);
        let message = render_two_factor_code(
            &self.settings.email,
            EmailAddress::new(&user.email).with_name(user.full_name()),
            &issued.code,
            issued.expires_at,
        );

        self.mailer.send(&message).await.map_err(|e| {
            warn!(user_id = user.id, error = %e, "Could not send verification code");
            HrError::from(e)
        })?;
        info!(user_id = user.id, "Verification code sent");
        Ok(issued.expires_at)
    }

    #[instrument(skip(self, code))]
    pub async fn verify_code(&self, email: &str, code: &str) -> HrResult<AuthSession> {
        let email = normalize_email(email);
        self.codes.verify(&email, code)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| HrError::unauthorized(INVALID_LOGIN))?;

        info!(user_id = user.id, "User logged in with verification code");
        self.session(user)
    }

    pub async fn profile(&self, current: &CurrentUser) -> HrResult<User> {
        let user = self.users.find_by_id(current.id).await?;
        found("user", current.id, user)
    }

    #[instrument(skip(self, update), fields(user_id = current.id))]
    pub async fn update_profile(
        &self,
        current: &CurrentUser,
        update: ProfileUpdate,
    ) -> HrResult<User> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("firstName", &update.first_name),
            ("lastName", &update.last_name),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    errors.add(field, "can't be blank");
                }
            }
        }
        validate_optional_text("firstName", update.first_name.as_deref(), 100, &mut errors);
        validate_optional_text("lastName", update.last_name.as_deref(), 100, &mut errors);
        validate_optional_text("department", update.department.as_deref(), 100, &mut errors);
        validate_optional_text("position", update.position.as_deref(), 100, &mut errors);
        errors.into_result()?;

        let user = self.users.update(current.id, UserUpdate::from(update)).await?;
        info!("Profile updated");
        Ok(user)
    }

    pub async fn list_users(
        &self,
        current: &CurrentUser,
        params: PaginationParams,
    ) -> HrResult<Page<User>> {
        current.require_admin()?;
        Ok(self.users.find_all(params.normalized()).await?)
    }

    /// Promote or demote an account
    #[instrument(skip(self), fields(admin_id = current.id))]
    pub async fn set_role(&self, current: &CurrentUser, user_id: Id, role: Role) -> HrResult<User> {
        current.require_admin()?;
        if user_id == current.id {
            return Err(HrError::forbidden("You cannot change your own role"));
        }

        let user = self
            .users
            .update(
                user_id,
                UserUpdate {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id, %role, "Role changed");
        Ok(user)
    }

    /// Re-read the account behind a token so role changes and deletions
    /// apply to tokens that were already issued
    pub async fn current_user(&self, claimed: CurrentUser) -> HrResult<CurrentUser> {
        match self.users.find_by_id(claimed.id).await? {
            Some(user) => Ok(CurrentUser::new(user.id, user.email, user.role)),
            None => {
                debug!(user_id = claimed.id, "Token for a removed account");
                Err(HrError::unauthorized("Account no longer exists"))
            }
        }
    }

    /// Create the configured admin account if it does not exist yet
    pub async fn ensure_admin(&self, email: &str, password: &str) -> HrResult<User> {
        let email = normalize_email(email);
        if let Some(existing) = self.users.find_by_email(&email).await? {
            if !existing.is_admin() {
                warn!(user_id = existing.id, "Bootstrap admin address belongs to a non-admin account");
            }
            return Ok(existing);
        }

        let mut errors = ValidationErrors::new();
        RegistrationContract::validate_email(&email, &mut errors);
        if password.chars().count() < self.settings.password_min_length {
            errors.add("password", "is too short");
        }
        errors.into_result()?;

        let user = self
            .users
            .create(NewUser {
                employee_code: format!("{}{}", SYSTEM_CODE_PREFIX, email),
                first_name: "Portal".to_string(),
                last_name: "Administrator".to_string(),
                email,
                role: Role::Admin,
                department: None,
                position: None,
                password_hash: self.hash(password)?,
            })
            .await?;
        info!(user_id = user.id, "Bootstrap admin created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_auth::MemoryTwoFactorStore;
    use hr_core::config::AppConfig;
    use hr_db::MemoryUserStore;
    use hr_notifications::MemoryEmailSender;

    struct Fixture {
        service: AuthService,
        mailer: Arc<MemoryEmailSender>,
        jwt: Arc<JwtService>,
    }

    fn fixture(two_factor_for_all: bool) -> Fixture {
        let config = AppConfig::default();
        let jwt = Arc::new(JwtService::new(b"auth-service-test-secret-32-bytes"));
        let mailer = Arc::new(MemoryEmailSender::new());
        let service = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            jwt.clone(),
            Arc::new(MemoryTwoFactorStore::new(300, 3)),
            mailer.clone(),
            AuthSettings::new(&config.auth, two_factor_for_all, &config.email),
        );
        Fixture {
            service,
            mailer,
            jwt,
        }
    }

    fn registration(code: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            employee_code: code.to_string(),
            first_name: "Rosa".to_string(),
            last_name: "Lim".to_string(),
            email: email.to_string(),
            password: "assembly-line-7".to_string(),
            department: Some("Assembly".to_string()),
            position: Some("  ".to_string()),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn code_from(mailer: &MemoryEmailSender, email: &str) -> String {
        let body = mailer.last_to(email).unwrap().text_body;
        body.split_whitespace()
            .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_register_issues_employee_token() {
        let f = fixture(false);
        let session = f
            .service
            .register(registration("EMP-1", " Rosa@Example.com "))
            .await
            .unwrap();

        assert_eq!(session.user.email, "rosa@example.com");
        assert_eq!(session.user.role, Role::Employee);
        assert_eq!(session.user.position, None);

        let claims = f.jwt.validate_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id.to_string());
    }

    #[tokio::test]
    async fn test_register_conflicts() {
        let f = fixture(false);
        f.service
            .register(registration("EMP-1", "rosa@example.com"))
            .await
            .unwrap();

        let same_email = f
            .service
            .register(registration("EMP-2", "ROSA@example.com"))
            .await
            .unwrap_err();
        assert_eq!(same_email.status_code(), 409);

        let same_code = f
            .service
            .register(registration("EMP-1", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(same_code.status_code(), 409);
    }

    #[tokio::test]
    async fn test_register_validates() {
        let f = fixture(false);
        let mut request = registration("EMP-1", "not-an-email");
        request.password = "short".to_string();

        match f.service.register(request).await {
            Err(HrError::Validation(errors)) => {
                assert!(errors.has_error("email"));
                assert!(errors.has_error("password"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login() {
        let f = fixture(false);
        f.service
            .register(registration("EMP-1", "rosa@example.com"))
            .await
            .unwrap();

        let outcome = f
            .service
            .login(login("rosa@example.com", "assembly-line-7"))
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated(_)));

        let wrong = f
            .service
            .login(login("rosa@example.com", "wrong-password"))
            .await
            .unwrap_err();
        assert_eq!(wrong.status_code(), 401);

        let unknown = f
            .service
            .login(login("nobody@example.com", "assembly-line-7"))
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_two_factor_login() {
        let f = fixture(true);
        f.service
            .register(registration("EMP-1", "rosa@example.com"))
            .await
            .unwrap();

        let outcome = f
            .service
            .login(login("rosa@example.com", "assembly-line-7"))
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::TwoFactorRequired { .. }));

        let code = code_from(&f.mailer, "rosa@example.com");
        let session = f.service.verify_code("rosa@example.com", &code).await.unwrap();
        assert_eq!(session.user.email, "rosa@example.com");

        // codes are single use
        let reused = f.service.verify_code("rosa@example.com", &code).await;
        assert_eq!(reused.unwrap_err().status_code(), 401);
    }

    #[tokio::test]
    async fn test_opt_in_two_factor() {
        let f = fixture(false);
        let session = f
            .service
            .register(registration("EMP-1", "rosa@example.com"))
            .await
            .unwrap();
        let current = CurrentUser::employee(session.user.id, "rosa@example.com");

        f.service
            .update_profile(
                &current,
                ProfileUpdate {
                    two_factor_enabled: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let outcome = f
            .service
            .login(login("rosa@example.com", "assembly-line-7"))
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::TwoFactorRequired { .. }));
    }

    #[tokio::test]
    async fn test_send_code_unknown_address_is_silent() {
        let f = fixture(false);
        f.service.send_code("ghost@example.com").await.unwrap();
        assert!(f.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_profile_update_validation() {
        let f = fixture(false);
        let session = f
            .service
            .register(registration("EMP-1", "rosa@example.com"))
            .await
            .unwrap();
        let current = CurrentUser::employee(session.user.id, "rosa@example.com");

        let err = f
            .service
            .update_profile(
                &current,
                ProfileUpdate {
                    first_name: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);

        let user = f
            .service
            .update_profile(
                &current,
                ProfileUpdate {
                    position: Some("Line lead".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.position.as_deref(), Some("Line lead"));
        assert_eq!(f.service.profile(&current).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_admin_operations() {
        let f = fixture(false);
        let admin_user = f
            .service
            .ensure_admin("admin@example.com", "admin-password")
            .await
            .unwrap();
        assert!(admin_user.is_admin());
        // idempotent
        let again = f
            .service
            .ensure_admin("admin@example.com", "admin-password")
            .await
            .unwrap();
        assert_eq!(again.id, admin_user.id);

        let employee = f
            .service
            .register(registration("EMP-1", "rosa@example.com"))
            .await
            .unwrap()
            .user;
        let admin = CurrentUser::admin(admin_user.id, "admin@example.com");
        let as_employee = CurrentUser::employee(employee.id, "rosa@example.com");

        let users = f
            .service
            .list_users(&admin, PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(users.total, 2);
        assert!(f
            .service
            .list_users(&as_employee, PaginationParams::default())
            .await
            .is_err());

        let promoted = f.service.set_role(&admin, employee.id, Role::Admin).await.unwrap();
        assert!(promoted.is_admin());
        // stale employee claims pick up the stored role
        let current = f.service.current_user(as_employee.clone()).await.unwrap();
        assert!(current.is_admin());

        f.service.set_role(&admin, employee.id, Role::Employee).await.unwrap();
        let current = f.service.current_user(current).await.unwrap();
        assert!(!current.is_admin());
        assert_eq!(
            f.service
                .set_role(&admin, admin.id, Role::Employee)
                .await
                .unwrap_err()
                .status_code(),
            403
        );
    }

    #[tokio::test]
    async fn test_current_user_for_removed_account() {
        let f = fixture(false);
        let ghost = CurrentUser::admin(404, "ghost@example.com");
        let err = f.service.current_user(ghost).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_code_cannot_collide() {
        let f = fixture(false);
        f.service
            .register(registration("ADMIN", "rosa@example.com"))
            .await
            .unwrap();

        let admin = f
            .service
            .ensure_admin("admin@example.com", "admin-password")
            .await
            .unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.employee_code, "SYSTEM:admin@example.com");

        let reserved = f
            .service
            .register(registration("SYSTEM:admin@example.com", "eve@example.com"))
            .await
            .unwrap_err();
        assert_eq!(reserved.status_code(), 422);
    }
}
