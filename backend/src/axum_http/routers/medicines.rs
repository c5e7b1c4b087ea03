use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::medicines::MedicineRepository,
        value_objects::medicines::{InsertMedicineModel, UpdateMedicineModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::medicines::MedicinePostgres,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::{
        extractors::{JsonBody, PathParam},
        routers::MessageResponse,
    },
    usecases::{errors::ServiceError, medicines::MedicineUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let medicine_repository = MedicinePostgres::new(Arc::clone(&db_pool));
    let medicine_usecase = MedicineUseCase::new(Arc::new(medicine_repository));

    Router::new()
        .route(
            "/",
            get(list::<MedicinePostgres>).post(create::<MedicinePostgres>),
        )
        .route(
            "/subscription/available",
            get(list_available_for_subscription::<MedicinePostgres>),
        )
        .route(
            "/:id",
            get(get_one::<MedicinePostgres>)
                .put(update::<MedicinePostgres>)
                .delete(delete_one::<MedicinePostgres>),
        )
        .with_state(Arc::new(medicine_usecase))
}

pub async fn list<M>(
    State(medicine_usecase): State<Arc<MedicineUseCase<M>>>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    Ok(Json(medicine_usecase.list().await?))
}

pub async fn list_available_for_subscription<M>(
    State(medicine_usecase): State<Arc<MedicineUseCase<M>>>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    Ok(Json(medicine_usecase.list_available_for_subscription().await?))
}

pub async fn get_one<M>(
    State(medicine_usecase): State<Arc<MedicineUseCase<M>>>,
    PathParam(medicine_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    Ok(Json(medicine_usecase.get(medicine_id).await?))
}

pub async fn create<M>(
    State(medicine_usecase): State<Arc<MedicineUseCase<M>>>,
    auth: AuthUser,
    JsonBody(insert_medicine_model): JsonBody<InsertMedicineModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    let medicine = medicine_usecase
        .create(auth.actor(), insert_medicine_model)
        .await?;

    Ok((StatusCode::CREATED, Json(medicine)))
}

pub async fn update<M>(
    State(medicine_usecase): State<Arc<MedicineUseCase<M>>>,
    auth: AuthUser,
    PathParam(medicine_id): PathParam<Uuid>,
    JsonBody(update_medicine_model): JsonBody<UpdateMedicineModel>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    let medicine = medicine_usecase
        .update(auth.actor(), medicine_id, update_medicine_model)
        .await?;

    Ok(Json(medicine))
}

pub async fn delete_one<M>(
    State(medicine_usecase): State<Arc<MedicineUseCase<M>>>,
    auth: AuthUser,
    PathParam(medicine_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    medicine_usecase.delete(auth.actor(), medicine_id).await?;

    Ok(Json(MessageResponse {
        message: "medicine deleted successfully",
    }))
}
