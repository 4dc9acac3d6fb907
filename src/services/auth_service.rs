use crate::entities::{
    UserRole, password_reset_token_entity as reset_tokens, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterUserRequest,
    ResetPasswordRequest, UserResponse,
};
use crate::services::NotificationService;
use crate::utils::{
    JwtService, hash_password, validate_email, validate_gender, validate_password, validate_phone,
    validate_username, verify_password,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

const RESET_TOKEN_VALID_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    notification_service: NotificationService,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            notification_service,
        }
    }

    /// Self-service student registration; the account is usable immediately.
    pub async fn register_student(&self, request: RegisterUserRequest) -> AppResult<AuthResponse> {
        let user = self.register(request, "student").await?;
        self.issue_tokens(user).await
    }

    /// Professor sign-up lands in the verification queue; an admin has to
    /// approve the account before login works.
    pub async fn register_professor(
        &self,
        request: RegisterUserRequest,
    ) -> AppResult<UserResponse> {
        if request.academic_rank.is_none() || request.specialization.is_none() {
            return Err(AppError::ValidationError(
                "Academic rank and specialization are required for professors".to_string(),
            ));
        }

        let user = self.register(request, "professor").await?;
        self.notification_service
            .notify_admins(
                "New professor application",
                &format!("{} has applied for a professor account.", user.full_name),
            )
            .await;
        Ok(user)
    }

    /// Staff sign-up, verification-gated like professors.
    pub async fn register_staff(&self, request: RegisterUserRequest) -> AppResult<UserResponse> {
        if request.employee_id.is_none() || request.department.is_none() {
            return Err(AppError::ValidationError(
                "Employee id and department are required for staff".to_string(),
            ));
        }

        let user = self.register(request, "staff").await?;
        self.notification_service
            .notify_admins(
                "New staff application",
                &format!("{} has applied for a staff account.", user.full_name),
            )
            .await;
        Ok(user)
    }

    async fn register(
        &self,
        request: RegisterUserRequest,
        user_type: &str,
    ) -> AppResult<UserResponse> {
        validate_username(&request.username)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;
        validate_phone(&request.phone)?;
        validate_gender(&request.gender)?;

        let existing = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(&request.username))
                    .add(users::Column::Email.eq(&request.email)),
            )
            .one(&self.pool)
            .await?;
        if let Some(existing) = existing {
            let field = if existing.username == request.username {
                "Username"
            } else {
                "Email"
            };
            return Err(AppError::ValidationError(format!(
                "{field} is already registered"
            )));
        }

        let is_student = user_type == "student";
        let password_hash = hash_password(&request.password)?;

        let user = users::ActiveModel {
            username: Set(request.username),
            email: Set(request.email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            phone: Set(request.phone),
            landline: Set(request.landline),
            gender: Set(request.gender),
            user_type: Set(user_type.to_string()),
            is_verified: Set(is_student),
            student_id: Set(request.student_id),
            entrance_year: Set(request.entrance_year),
            degree: Set(request.degree),
            field_of_study: Set(request.field_of_study),
            academic_rank: Set(request.academic_rank),
            specialization: Set(request.specialization),
            teaching_experience: Set(request.teaching_experience),
            professor_code: Set(request.professor_code),
            office_hours: Set(request.office_hours),
            website: Set(request.website),
            employee_id: Set(request.employee_id),
            department: Set(request.department),
            position: Set(request.position),
            office_phone: Set(request.office_phone),
            responsibility: Set(request.responsibility),
            province: Set(request.province),
            city: Set(request.city),
            university: Set(request.university),
            faculty: Set(request.faculty),
            address: Set(request.address),
            role: Set(if is_student {
                UserRole::Participant
            } else {
                UserRole::Manager
            }),
            is_active: Set(is_student),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        // Unique indexes on username and email back the pre-check.
        let user = match user.insert(&self.pool).await {
            Ok(model) => model,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::ValidationError(
                    "Username or email is already registered".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        log::info!("Registered new {} account {}", user.user_type, user.id);
        Ok(user.into())
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(&request.username_or_email))
                    .add(users::Column::Email.eq(&request.username_or_email)),
            )
            .one(&self.pool)
            .await?;

        // Same error for unknown user and wrong password.
        let Some(user) = user else {
            return Err(AppError::AuthError("Invalid credentials".to_string()));
        };
        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid credentials".to_string()));
        }

        if !user.is_active {
            return Err(AppError::AuthError(
                "Account is disabled or awaiting approval".to_string(),
            ));
        }
        if matches!(user.user_type.as_str(), "professor" | "staff") && !user.is_verified {
            return Err(AppError::AuthError(
                "Account is awaiting verification".to_string(),
            ));
        }

        let mut model = user.clone().into_active_model();
        model.last_login = Set(Some(Utc::now()));
        let user = model.update(&self.pool).await?;

        self.issue_tokens(user.into()).await
    }

    pub async fn refresh(&self, request: RefreshTokenRequest) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(&request.refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid refresh token".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Unknown user".to_string()))?;

        if !user.is_active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        self.issue_tokens(user.into()).await
    }

    /// Issues a single-use reset token. Responds identically whether or not
    /// the email exists.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> AppResult<()> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&request.email))
            .one(&self.pool)
            .await?;

        let Some(user) = user else {
            log::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = Uuid::new_v4().simple().to_string();
        let reset_token = reset_tokens::ActiveModel {
            user_id: Set(user.id),
            token: Set(token),
            expires_at: Set(Utc::now() + Duration::hours(RESET_TOKEN_VALID_HOURS)),
            used: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        reset_token.insert(&self.pool).await?;

        self.notification_service
            .notify(
                user.id,
                "Password reset",
                &format!(
                    "A password reset link was issued for your account. It is valid for {RESET_TOKEN_VALID_HOURS} hours."
                ),
            )
            .await;

        Ok(())
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<()> {
        validate_password(&request.password)?;

        let txn = self.pool.begin().await?;

        let reset_token = reset_tokens::Entity::find()
            .filter(reset_tokens::Column::Token.eq(&request.token))
            .filter(reset_tokens::Column::Used.eq(false))
            .one(&txn)
            .await?;

        let Some(reset_token) = reset_token else {
            return Err(AppError::ValidationError(
                "Invalid or expired reset token".to_string(),
            ));
        };
        if reset_token.is_expired(Utc::now()) {
            return Err(AppError::ValidationError(
                "Invalid or expired reset token".to_string(),
            ));
        }

        let user = users::Entity::find_by_id(reset_token.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let user_id = user.id;
        let mut user_model = user.into_active_model();
        user_model.password_hash = Set(hash_password(&request.password)?);
        user_model.update(&txn).await?;

        let mut token_model = reset_token.into_active_model();
        token_model.used = Set(true);
        token_model.update(&txn).await?;

        txn.commit().await?;

        self.notification_service
            .notify(user_id, "Password changed", "Your password was changed.")
            .await;

        Ok(())
    }

    async fn issue_tokens(&self, user: UserResponse) -> AppResult<AuthResponse> {
        let role = user.role.to_string();
        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.username, &role)?;
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.username, &role)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    fn register_request(username: &str, email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "Password123".to_string(),
            first_name: "Ali".to_string(),
            last_name: "Rezaei".to_string(),
            phone: "09123456789".to_string(),
            landline: None,
            gender: "male".to_string(),
            province: "Tehran".to_string(),
            city: "Tehran".to_string(),
            university: "University of Tehran".to_string(),
            faculty: "Theology".to_string(),
            address: None,
            student_id: Some("400123456".to_string()),
            entrance_year: Some("1400".to_string()),
            degree: None,
            field_of_study: None,
            academic_rank: None,
            specialization: None,
            teaching_experience: None,
            professor_code: None,
            office_hours: None,
            website: None,
            employee_id: None,
            department: None,
            position: None,
            office_phone: None,
            responsibility: None,
        }
    }

    fn service(db: &DatabaseConnection) -> AuthService {
        AuthService::new(
            db.clone(),
            JwtService::new("test-secret", 3600, 86400),
            NotificationService::new(db.clone()),
        )
    }

    #[tokio::test]
    async fn test_student_registration_and_login() {
        let db = setup_test_db().await;
        let service = service(&db);

        let auth = service
            .register_student(register_request("ali", "ali@seraj.ac.ir"))
            .await
            .unwrap();
        assert!(auth.user.is_verified);
        assert!(auth.user.is_active);
        assert!(!auth.access_token.is_empty());

        let login = service
            .login(LoginRequest {
                username_or_email: "ali".to_string(),
                password: "Password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, auth.user.id);
        assert!(login.user.last_login.is_some());

        // login by email works too
        assert!(service
            .login(LoginRequest {
                username_or_email: "ali@seraj.ac.ir".to_string(),
                password: "Password123".to_string(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = setup_test_db().await;
        let service = service(&db);

        service
            .register_student(register_request("ali", "ali@seraj.ac.ir"))
            .await
            .unwrap();

        let duplicate = service
            .register_student(register_request("ali", "other@seraj.ac.ir"))
            .await;
        assert!(matches!(duplicate, Err(AppError::ValidationError(_))));

        let duplicate_email = service
            .register_student(register_request("other", "ali@seraj.ac.ir"))
            .await;
        assert!(matches!(duplicate_email, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_professor_pending_verification_cannot_login() {
        let db = setup_test_db().await;
        let service = service(&db);

        let mut request = register_request("ostad", "ostad@seraj.ac.ir");
        request.academic_rank = Some("assistant_professor".to_string());
        request.specialization = Some("Tafsir".to_string());

        let user = service.register_professor(request).await.unwrap();
        assert!(!user.is_verified);
        assert!(!user.is_active);

        let login = service
            .login(LoginRequest {
                username_or_email: "ostad".to_string(),
                password: "Password123".to_string(),
            })
            .await;
        assert!(matches!(login, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let db = setup_test_db().await;
        let service = service(&db);

        service
            .register_student(register_request("ali", "ali@seraj.ac.ir"))
            .await
            .unwrap();

        let login = service
            .login(LoginRequest {
                username_or_email: "ali".to_string(),
                password: "WrongPassword1".to_string(),
            })
            .await;
        assert!(matches!(login, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let db = setup_test_db().await;
        let service = service(&db);

        let auth = service
            .register_student(register_request("ali", "ali@seraj.ac.ir"))
            .await
            .unwrap();

        service
            .forgot_password(ForgotPasswordRequest {
                email: "ali@seraj.ac.ir".to_string(),
            })
            .await
            .unwrap();

        let token = reset_tokens::Entity::find()
            .filter(reset_tokens::Column::UserId.eq(auth.user.id))
            .one(&db)
            .await
            .unwrap()
            .unwrap();

        service
            .reset_password(ResetPasswordRequest {
                token: token.token.clone(),
                password: "NewPassword123".to_string(),
            })
            .await
            .unwrap();

        // the token is single-use
        let reuse = service
            .reset_password(ResetPasswordRequest {
                token: token.token,
                password: "AnotherPassword123".to_string(),
            })
            .await;
        assert!(matches!(reuse, Err(AppError::ValidationError(_))));

        // old password no longer works, the new one does
        assert!(service
            .login(LoginRequest {
                username_or_email: "ali".to_string(),
                password: "Password123".to_string(),
            })
            .await
            .is_err());
        assert!(service
            .login(LoginRequest {
                username_or_email: "ali".to_string(),
                password: "NewPassword123".to_string(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_is_silent() {
        let db = setup_test_db().await;
        let service = service(&db);

        assert!(service
            .forgot_password(ForgotPasswordRequest {
                email: "nobody@seraj.ac.ir".to_string(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_refresh_reissues_tokens() {
        let db = setup_test_db().await;
        let service = service(&db);

        let auth = service
            .register_student(register_request("ali", "ali@seraj.ac.ir"))
            .await
            .unwrap();

        let refreshed = service
            .refresh(RefreshTokenRequest {
                refresh_token: auth.refresh_token,
            })
            .await
            .unwrap();
        assert_eq!(refreshed.user.id, auth.user.id);

        // an access token is not a valid refresh token
        let bad = service
            .refresh(RefreshTokenRequest {
                refresh_token: auth.access_token,
            })
            .await;
        assert!(bad.is_err());
    }
}
