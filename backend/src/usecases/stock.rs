use std::collections::{HashMap, HashSet};

use crates::domain::{
    entities::{medicines::MedicineEntity, orders::NewOrderLine},
    repositories::medicines::MedicineRepository,
    value_objects::{medicines::MedicineSummary, orders::OrderLineModel},
};
use tracing::warn;
use uuid::Uuid;

use crate::usecases::errors::{ServiceError, UseCaseResult};

/// Order lines priced from the catalog as it is right now.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PricedLines {
    pub lines: Vec<NewOrderLine>,
    pub total_amount_minor: i64,
    pub prescription_required: bool,
}

impl PricedLines {
    /// A single line at a fixed price with no stock involvement.
    pub fn single(medicine: &MedicineEntity, price_minor: i64) -> Self {
        Self {
            lines: vec![NewOrderLine {
                medicine_id: medicine.id,
                quantity: 1,
                price_minor,
            }],
            total_amount_minor: price_minor,
            prescription_required: medicine.prescription_required,
        }
    }
}

pub(crate) async fn load_medicine<M>(
    medicine_repository: &M,
    medicine_id: Uuid,
) -> UseCaseResult<MedicineEntity>
where
    M: MedicineRepository + Send + Sync,
{
    medicine_repository
        .find_by_id(medicine_id)
        .await
        .map_err(ServiceError::from_repository)?
        .ok_or_else(|| ServiceError::not_found(format!("medicine {medicine_id}")))
}

/// Advisory check against the stock read now. Only the order transaction is binding.
pub(crate) fn ensure_in_stock(medicine: &MedicineEntity, quantity: i64) -> UseCaseResult<()> {
    if i64::from(medicine.stock) < quantity {
        warn!(
            medicine_id = %medicine.id,
            stock = medicine.stock,
            requested = quantity,
            "stock: insufficient stock"
        );
        return Err(ServiceError::InsufficientStock {
            medicine_id: medicine.id,
        });
    }
    Ok(())
}

pub(crate) fn ensure_positive_quantity(quantity: i32) -> UseCaseResult<()> {
    if quantity < 1 {
        return Err(ServiceError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Looks up every requested medicine in input order and prices the lines with the
/// current catalog price. Repeated medicines are checked against their summed quantity.
pub(crate) async fn price_order_lines<M>(
    medicine_repository: &M,
    items: &[OrderLineModel],
) -> UseCaseResult<PricedLines>
where
    M: MedicineRepository + Send + Sync,
{
    if items.is_empty() {
        return Err(ServiceError::Validation(
            "order must contain at least one item".to_string(),
        ));
    }
    for item in items {
        ensure_positive_quantity(item.quantity)?;
    }

    let mut requested: HashMap<Uuid, i64> = HashMap::new();
    let mut lines = Vec::with_capacity(items.len());
    let mut total_amount_minor = 0i64;
    let mut prescription_required = false;

    for item in items {
        let medicine = load_medicine(medicine_repository, item.medicine_id).await?;

        let cumulative = requested.entry(medicine.id).or_insert(0);
        *cumulative += i64::from(item.quantity);
        ensure_in_stock(&medicine, *cumulative)?;

        total_amount_minor = medicine
            .price_minor
            .checked_mul(i64::from(item.quantity))
            .and_then(|line_total| total_amount_minor.checked_add(line_total))
            .ok_or_else(|| ServiceError::Validation("order total is too large".to_string()))?;

        prescription_required |= medicine.prescription_required;

        lines.push(NewOrderLine {
            medicine_id: medicine.id,
            quantity: item.quantity,
            price_minor: medicine.price_minor,
        });
    }

    Ok(PricedLines {
        lines,
        total_amount_minor,
        prescription_required,
    })
}

/// One catalog read for all the medicines a response mentions. Deleted medicines are
/// simply absent from the map.
pub(crate) async fn medicine_summaries<M>(
    medicine_repository: &M,
    medicine_ids: impl IntoIterator<Item = Uuid>,
) -> UseCaseResult<HashMap<Uuid, MedicineSummary>>
where
    M: MedicineRepository + Send + Sync,
{
    let medicine_ids: Vec<Uuid> = medicine_ids
        .into_iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if medicine_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let medicines = medicine_repository
        .find_many(&medicine_ids)
        .await
        .map_err(ServiceError::from_repository)?;

    Ok(medicines
        .iter()
        .map(|medicine| (medicine.id, MedicineSummary::from(medicine)))
        .collect())
}
