use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use crates::{
    domain::{
        repositories::{medicines::MedicineRepository, orders::OrderRepository},
        value_objects::orders::{CreateOrderModel, UpdateOrderStatusModel, UpdatePaymentStatusModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{medicines::MedicinePostgres, orders::OrderPostgres},
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::extractors::{JsonBody, PathParam},
    usecases::{errors::ServiceError, orders::OrderUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let medicine_repository = MedicinePostgres::new(Arc::clone(&db_pool));
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let order_usecase = OrderUseCase::new(Arc::new(medicine_repository), Arc::new(order_repository));

    Router::new()
        .route(
            "/",
            get(list_all::<MedicinePostgres, OrderPostgres>)
                .post(create::<MedicinePostgres, OrderPostgres>),
        )
        .route("/my-orders", get(list_mine::<MedicinePostgres, OrderPostgres>))
        .route("/:id", get(get_mine::<MedicinePostgres, OrderPostgres>))
        .route("/:id/cancel", put(cancel::<MedicinePostgres, OrderPostgres>))
        .route("/:id/status", put(set_status::<MedicinePostgres, OrderPostgres>))
        .route(
            "/:id/payment-status",
            put(set_payment_status::<MedicinePostgres, OrderPostgres>),
        )
        .with_state(Arc::new(order_usecase))
}

pub async fn create<M, O>(
    State(order_usecase): State<Arc<OrderUseCase<M, O>>>,
    auth: AuthUser,
    JsonBody(create_order_model): JsonBody<CreateOrderModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let order = order_usecase
        .create_order(auth.actor(), create_order_model)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_mine<M, O>(
    State(order_usecase): State<Arc<OrderUseCase<M, O>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(order_usecase.list_my_orders(auth.actor()).await?))
}

pub async fn get_mine<M, O>(
    State(order_usecase): State<Arc<OrderUseCase<M, O>>>,
    auth: AuthUser,
    PathParam(order_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(order_usecase.get_my_order(auth.actor(), order_id).await?))
}

pub async fn cancel<M, O>(
    State(order_usecase): State<Arc<OrderUseCase<M, O>>>,
    auth: AuthUser,
    PathParam(order_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(order_usecase.cancel_order(auth.actor(), order_id).await?))
}

pub async fn list_all<M, O>(
    State(order_usecase): State<Arc<OrderUseCase<M, O>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(order_usecase.list_all_orders(auth.actor()).await?))
}

pub async fn set_status<M, O>(
    State(order_usecase): State<Arc<OrderUseCase<M, O>>>,
    auth: AuthUser,
    PathParam(order_id): PathParam<Uuid>,
    JsonBody(update_order_status_model): JsonBody<UpdateOrderStatusModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let order = order_usecase
        .set_order_status(auth.actor(), order_id, update_order_status_model.status)
        .await?;

    Ok(Json(order))
}

pub async fn set_payment_status<M, O>(
    State(order_usecase): State<Arc<OrderUseCase<M, O>>>,
    auth: AuthUser,
    PathParam(order_id): PathParam<Uuid>,
    JsonBody(update_payment_status_model): JsonBody<UpdatePaymentStatusModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let order = order_usecase
        .set_payment_status(
            auth.actor(),
            order_id,
            update_payment_status_model.payment_status,
        )
        .await?;

    Ok(Json(order))
}
