use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::users::UserRepository,
        value_objects::iam::{LoginModel, RegisterUserModel},
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
};

use crate::{
    auth::{AuthUser, JwtAuthenticator},
    axum_http::extractors::JsonBody,
    usecases::{accounts::AccountUseCase, errors::ServiceError},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, authenticator: Arc<JwtAuthenticator>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let account_usecase = AccountUseCase::new(Arc::new(user_repository), authenticator);

    Router::new()
        .route("/register", post(register::<UserPostgres>))
        .route("/login", post(login::<UserPostgres>))
        .route("/me", get(me::<UserPostgres>))
        .with_state(Arc::new(account_usecase))
}

pub async fn register<U>(
    State(account_usecase): State<Arc<AccountUseCase<U>>>,
    JsonBody(register_user_model): JsonBody<RegisterUserModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let issued = account_usecase.register(register_user_model).await?;

    Ok((StatusCode::CREATED, Json(issued)))
}

pub async fn login<U>(
    State(account_usecase): State<Arc<AccountUseCase<U>>>,
    JsonBody(login_model): JsonBody<LoginModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let issued = account_usecase.login(login_model).await?;

    Ok(Json(issued))
}

pub async fn me<U>(
    State(account_usecase): State<Arc<AccountUseCase<U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let profile = account_usecase.me(auth.actor()).await?;

    Ok(Json(profile))
}
