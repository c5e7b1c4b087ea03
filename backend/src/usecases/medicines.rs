use std::sync::Arc;

use crates::domain::{
    repositories::medicines::MedicineRepository,
    value_objects::{
        iam::Actor,
        medicines::{InsertMedicineModel, MedicineModel, UpdateMedicineModel},
    },
};
use tracing::{error, info};
use uuid::Uuid;

use crate::usecases::errors::{ActorPolicy, ServiceError, UseCaseResult};

pub struct MedicineUseCase<M>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    medicine_repository: Arc<M>,
}

impl<M> MedicineUseCase<M>
where
    M: MedicineRepository + Send + Sync + 'static,
{
    pub fn new(medicine_repository: Arc<M>) -> Self {
        Self {
            medicine_repository,
        }
    }

    pub async fn list(&self) -> UseCaseResult<Vec<MedicineModel>> {
        let medicines = self
            .medicine_repository
            .list()
            .await
            .map_err(ServiceError::from_repository)?;

        Ok(medicines.into_iter().map(MedicineModel::from).collect())
    }

    pub async fn list_available_for_subscription(&self) -> UseCaseResult<Vec<MedicineModel>> {
        let medicines = self
            .medicine_repository
            .list_available_for_subscription()
            .await
            .map_err(ServiceError::from_repository)?;

        Ok(medicines.into_iter().map(MedicineModel::from).collect())
    }

    pub async fn get(&self, medicine_id: Uuid) -> UseCaseResult<MedicineModel> {
        self.medicine_repository
            .find_by_id(medicine_id)
            .await
            .map_err(ServiceError::from_repository)?
            .map(MedicineModel::from)
            .ok_or_else(|| ServiceError::not_found(format!("medicine {medicine_id}")))
    }

    pub async fn create(
        &self,
        actor: Actor,
        insert_medicine_model: InsertMedicineModel,
    ) -> UseCaseResult<MedicineModel> {
        actor.require_admin()?;
        insert_medicine_model.validate()?;

        let medicine = self
            .medicine_repository
            .create(insert_medicine_model.to_entity())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "medicines: failed to create medicine");
                ServiceError::from_repository(err)
            })?;

        info!(
            admin_id = %actor.user_id,
            medicine_id = %medicine.id,
            stock = medicine.stock,
            "medicines: medicine created"
        );

        Ok(medicine.into())
    }

    pub async fn update(
        &self,
        actor: Actor,
        medicine_id: Uuid,
        update_medicine_model: UpdateMedicineModel,
    ) -> UseCaseResult<MedicineModel> {
        actor.require_admin()?;
        update_medicine_model.validate()?;

        let medicine = self
            .medicine_repository
            .update(medicine_id, update_medicine_model.to_entity())
            .await
            .map_err(ServiceError::from_repository)?
            .ok_or_else(|| ServiceError::not_found(format!("medicine {medicine_id}")))?;

        info!(admin_id = %actor.user_id, %medicine_id, "medicines: medicine updated");

        Ok(medicine.into())
    }

    pub async fn delete(&self, actor: Actor, medicine_id: Uuid) -> UseCaseResult<()> {
        actor.require_admin()?;

        let deleted = self
            .medicine_repository
            .delete(medicine_id)
            .await
            .map_err(ServiceError::from_repository)?;
        if !deleted {
            return Err(ServiceError::not_found(format!("medicine {medicine_id}")));
        }

        info!(admin_id = %actor.user_id, %medicine_id, "medicines: medicine deleted");

        Ok(())
    }
}
