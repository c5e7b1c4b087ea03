use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use crates::{
    domain::{
        repositories::{carts::CartRepository, medicines::MedicineRepository, orders::OrderRepository},
        value_objects::carts::{AddCartItemModel, CheckoutCartModel, UpdateCartItemModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{carts::CartPostgres, medicines::MedicinePostgres, orders::OrderPostgres},
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::extractors::{JsonBody, PathParam},
    usecases::{carts::CartUseCase, errors::ServiceError, orders::OrderUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let medicine_repository = Arc::new(MedicinePostgres::new(Arc::clone(&db_pool)));
    let cart_repository = CartPostgres::new(Arc::clone(&db_pool));
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));

    let order_usecase = OrderUseCase::new(Arc::clone(&medicine_repository), Arc::new(order_repository));
    let cart_usecase = CartUseCase::new(
        medicine_repository,
        Arc::new(cart_repository),
        Arc::new(order_usecase),
    );

    Router::new()
        .route("/", get(get_cart::<MedicinePostgres, CartPostgres, OrderPostgres>))
        .route("/add", post(add_item::<MedicinePostgres, CartPostgres, OrderPostgres>))
        .route(
            "/update/:medicine_id",
            put(update_item::<MedicinePostgres, CartPostgres, OrderPostgres>),
        )
        .route(
            "/remove/:medicine_id",
            delete(remove_item::<MedicinePostgres, CartPostgres, OrderPostgres>),
        )
        .route("/clear", delete(clear::<MedicinePostgres, CartPostgres, OrderPostgres>))
        .route(
            "/checkout",
            post(checkout::<MedicinePostgres, CartPostgres, OrderPostgres>),
        )
        .with_state(Arc::new(cart_usecase))
}

pub async fn get_cart<M, C, O>(
    State(cart_usecase): State<Arc<CartUseCase<M, C, O>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(cart_usecase.get_cart(auth.actor()).await?))
}

pub async fn add_item<M, C, O>(
    State(cart_usecase): State<Arc<CartUseCase<M, C, O>>>,
    auth: AuthUser,
    JsonBody(add_cart_item_model): JsonBody<AddCartItemModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let cart = cart_usecase
        .add_item(auth.actor(), add_cart_item_model)
        .await?;

    Ok(Json(cart))
}

pub async fn update_item<M, C, O>(
    State(cart_usecase): State<Arc<CartUseCase<M, C, O>>>,
    auth: AuthUser,
    PathParam(medicine_id): PathParam<Uuid>,
    JsonBody(update_cart_item_model): JsonBody<UpdateCartItemModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let cart = cart_usecase
        .update_item(auth.actor(), medicine_id, update_cart_item_model.quantity)
        .await?;

    Ok(Json(cart))
}

pub async fn remove_item<M, C, O>(
    State(cart_usecase): State<Arc<CartUseCase<M, C, O>>>,
    auth: AuthUser,
    PathParam(medicine_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(cart_usecase.remove_item(auth.actor(), medicine_id).await?))
}

pub async fn clear<M, C, O>(
    State(cart_usecase): State<Arc<CartUseCase<M, C, O>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(cart_usecase.clear(auth.actor()).await?))
}

pub async fn checkout<M, C, O>(
    State(cart_usecase): State<Arc<CartUseCase<M, C, O>>>,
    auth: AuthUser,
    JsonBody(checkout_cart_model): JsonBody<CheckoutCartModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    let order = cart_usecase
        .checkout(auth.actor(), checkout_cart_model)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}
