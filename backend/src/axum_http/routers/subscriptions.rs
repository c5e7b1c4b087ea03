use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use crates::{
    domain::{
        repositories::{
            medicines::MedicineRepository, subscriptions::SubscriptionRepository,
            users::UserRepository,
        },
        value_objects::subscriptions::{RenewSubscriptionModel, SubscribeModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            medicines::MedicinePostgres, subscriptions::SubscriptionPostgres, users::UserPostgres,
        },
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::{
        extractors::{JsonBody, JsonBodyOrDefault, PathParam},
        routers::MessageResponse,
    },
    usecases::{errors::ServiceError, subscriptions::SubscriptionUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let medicine_repository = MedicinePostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let subscription_usecase = SubscriptionUseCase::new(
        Arc::new(medicine_repository),
        Arc::new(subscription_repository),
        Arc::new(user_repository),
    );

    Router::new()
        .route(
            "/",
            post(subscribe::<MedicinePostgres, SubscriptionPostgres, UserPostgres>),
        )
        .route(
            "/my-subscriptions",
            get(list_mine::<MedicinePostgres, SubscriptionPostgres, UserPostgres>),
        )
        .route(
            "/:id/cancel",
            put(cancel::<MedicinePostgres, SubscriptionPostgres, UserPostgres>),
        )
        .route(
            "/:id/renew",
            post(renew::<MedicinePostgres, SubscriptionPostgres, UserPostgres>),
        )
        .with_state(Arc::new(subscription_usecase))
}

pub async fn subscribe<M, S, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<M, S, U>>>,
    auth: AuthUser,
    JsonBody(subscribe_model): JsonBody<SubscribeModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let order = subscription_usecase
        .subscribe(auth.actor(), subscribe_model)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_mine<M, S, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<M, S, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(
        subscription_usecase
            .list_my_subscriptions(auth.actor())
            .await?,
    ))
}

pub async fn cancel<M, S, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<M, S, U>>>,
    auth: AuthUser,
    PathParam(subscription_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    subscription_usecase
        .cancel_subscription(auth.actor(), subscription_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "subscription cancelled successfully",
    }))
}

/// The body is optional; an empty request renews with the profile address and card payment.
/// A body that is present must be valid JSON.
pub async fn renew<M, S, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<M, S, U>>>,
    auth: AuthUser,
    PathParam(subscription_id): PathParam<Uuid>,
    JsonBodyOrDefault(renew_model): JsonBodyOrDefault<RenewSubscriptionModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let order = subscription_usecase
        .renew_subscription(auth.actor(), subscription_id, renew_model)
        .await?;

    Ok(Json(order))
}
