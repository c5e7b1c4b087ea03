use std::sync::Arc;

use crates::domain::{
    repositories::users::UserRepository,
    value_objects::{
        enums::roles::Role,
        iam::{Actor, AuthTokenModel, LoginModel, RegisterUserModel, UserModel},
    },
};
use tracing::{error, info, warn};

use crate::{
    auth::{self, JwtAuthenticator},
    usecases::errors::{ServiceError, UseCaseResult},
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

pub struct AccountUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repository: Arc<U>,
    authenticator: Arc<JwtAuthenticator>,
}

impl<U> AccountUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repository: Arc<U>, authenticator: Arc<JwtAuthenticator>) -> Self {
        Self {
            user_repository,
            authenticator,
        }
    }

    pub async fn register(
        &self,
        register_user_model: RegisterUserModel,
    ) -> UseCaseResult<AuthTokenModel> {
        register_user_model.validate()?;

        let password_hash = auth::hash_password(&register_user_model.password)?;

        let user = self
            .user_repository
            .create(register_user_model.to_entity(password_hash)?)
            .await
            .map_err(|err| {
                let err = ServiceError::from_repository(err);
                match &err {
                    ServiceError::Conflict(_) => {
                        warn!(status = 409u16, "accounts: email already registered")
                    }
                    _ => error!(db_error = ?err, "accounts: failed to create user"),
                }
                err
            })?;

        info!(user_id = %user.id, "accounts: user registered");

        self.token_for(UserModel::try_from(user)?)
    }

    pub async fn login(&self, login_model: LoginModel) -> UseCaseResult<AuthTokenModel> {
        let email = login_model.email.trim().to_lowercase();

        let user = self
            .user_repository
            .find_by_email(email)
            .await
            .map_err(ServiceError::from_repository)?
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !auth::verify_password(&login_model.password, &user.password_hash) {
            warn!(user_id = %user.id, "accounts: wrong password");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let user = UserModel::try_from(user)?;
        info!(user_id = %user.id, "accounts: user logged in");

        self.token_for(user)
    }

    pub async fn me(&self, actor: Actor) -> UseCaseResult<UserModel> {
        let user = self
            .user_repository
            .find_by_id(actor.user_id)
            .await
            .map_err(ServiceError::from_repository)?
            .ok_or_else(|| ServiceError::not_found(format!("user {}", actor.user_id)))?;

        Ok(UserModel::try_from(user)?)
    }

    fn token_for(&self, user: UserModel) -> UseCaseResult<AuthTokenModel> {
        let role: Role = user.role;
        let token = self.authenticator.issue(user.id, &user.email, role)?;

        Ok(AuthTokenModel {
            token,
            token_type: "Bearer",
            expires_in: self.authenticator.ttl_seconds(),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::users::UserEntity, repositories::users::MockUserRepository,
        value_objects::addresses::Address,
    };
    use uuid::Uuid;

    use crate::usecases::test_support::InMemoryStore;

    fn usecase() -> (Arc<JwtAuthenticator>, AccountUseCase<InMemoryStore>) {
        let authenticator = Arc::new(JwtAuthenticator::new("accounts-test-secret", 600));
        let usecase = AccountUseCase::new(Arc::new(InMemoryStore::new()), Arc::clone(&authenticator));
        (authenticator, usecase)
    }

    fn registration(email: &str) -> RegisterUserModel {
        RegisterUserModel {
            name: "Meera".to_string(),
            email: email.to_string(),
            password: "s3cret!".to_string(),
            phone: "9000000001".to_string(),
            address: Some(Address {
                street: "1 Temple Street".to_string(),
                city: "Madurai".to_string(),
                state: "TN".to_string(),
                pincode: "625001".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn register_issues_a_token_for_a_plain_user() {
        let (authenticator, usecase) = usecase();

        let issued = usecase.register(registration("Meera@Example.com")).await.unwrap();

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 600);
        assert_eq!(issued.user.email, "meera@example.com");
        assert_eq!(issued.user.role, Role::User);

        let verified = authenticator.verify(&issued.token).unwrap();
        assert_eq!(verified.user_id, issued.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (_, usecase) = usecase();
        usecase.register(registration("meera@example.com")).await.unwrap();

        let result = usecase.register(registration(" MEERA@example.com")).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn invalid_registrations_are_rejected() {
        let (_, usecase) = usecase();
        let mut short = registration("meera@example.com");
        short.password = "123".to_string();

        let result = usecase.register(short).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn login_checks_the_password() {
        let (_, usecase) = usecase();
        let registered = usecase.register(registration("meera@example.com")).await.unwrap();

        let ok = usecase
            .login(LoginModel {
                email: "MEERA@example.com".to_string(),
                password: "s3cret!".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.id, registered.user.id);

        let wrong = usecase
            .login(LoginModel {
                email: "meera@example.com".to_string(),
                password: "guess".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(ServiceError::Unauthorized(_))));

        let unknown = usecase
            .login(LoginModel {
                email: "nobody@example.com".to_string(),
                password: "s3cret!".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn me_returns_the_profile() {
        let (_, usecase) = usecase();
        let registered = usecase.register(registration("meera@example.com")).await.unwrap();

        let profile = usecase
            .me(Actor::new(registered.user.id, Role::User))
            .await
            .unwrap();

        assert_eq!(profile.address.map(|a| a.city), Some("Madurai".to_string()));
    }

    #[tokio::test]
    async fn me_for_a_deleted_user_is_not_found() {
        let mut user_repository = MockUserRepository::new();
        user_repository.expect_find_by_id().returning(|_| Ok(None));
        let usecase = AccountUseCase::new(
            Arc::new(user_repository),
            Arc::new(JwtAuthenticator::new("accounts-test-secret", 600)),
        );

        let result = usecase.me(Actor::new(Uuid::new_v4(), Role::User)).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_stored_role_gets_no_token() {
        let password_hash = auth::hash_password("s3cret!").unwrap();
        let mut user_repository = MockUserRepository::new();
        user_repository.expect_find_by_email().returning(move |email| {
            let now = chrono::Utc::now();
            Ok(Some(UserEntity {
                id: Uuid::new_v4(),
                name: "Meera".to_string(),
                email,
                password_hash: password_hash.clone(),
                phone: "9000000001".to_string(),
                address: None,
                role: "superuser".to_string(),
                created_at: now,
                updated_at: now,
            }))
        });
        let usecase = AccountUseCase::new(
            Arc::new(user_repository),
            Arc::new(JwtAuthenticator::new("accounts-test-secret", 600)),
        );

        let result = usecase
            .login(LoginModel {
                email: "meera@example.com".to_string(),
                password: "s3cret!".to_string(),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }
}
