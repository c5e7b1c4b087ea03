use std::collections::HashMap;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::orders::{OrderAggregate, OrderItemEntity},
    value_objects::{
        addresses::Address,
        enums::{
            order_statuses::OrderStatus, order_types::OrderType, payment_methods::PaymentMethod,
            payment_statuses::PaymentStatus,
        },
        medicines::MedicineSummary,
    },
};

/// A requested line. Prices are never taken from the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineModel {
    pub medicine_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionDetailsRequest {
    pub duration_days: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderModel {
    pub items: Vec<OrderLineModel>,
    #[serde(default)]
    pub order_type: OrderType,
    pub subscription_details: Option<SubscriptionDetailsRequest>,
    pub shipping_address: Address,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub prescription_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusModel {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentStatusModel {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderItemModel {
    pub medicine_id: Uuid,
    /// `None` once the medicine has been removed from the catalog.
    pub medicine: Option<MedicineSummary>,
    pub quantity: i32,
    pub price_minor: i64,
}

impl From<OrderItemEntity> for OrderItemModel {
    fn from(entity: OrderItemEntity) -> Self {
        Self {
            medicine_id: entity.medicine_id,
            medicine: None,
            quantity: entity.quantity,
            price_minor: entity.price_minor,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionDetailsModel {
    pub duration_days: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemModel>,
    pub total_amount_minor: i64,
    pub order_type: OrderType,
    pub subscription_details: Option<SubscriptionDetailsModel>,
    pub status: OrderStatus,
    pub shipping_address: Option<Address>,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub prescription_required: bool,
    pub prescription_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderModel {
    pub fn medicine_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.items.iter().map(|item| item.medicine_id)
    }

    pub fn attach_medicines(&mut self, medicines: &HashMap<Uuid, MedicineSummary>) {
        for item in &mut self.items {
            item.medicine = medicines.get(&item.medicine_id).cloned();
        }
    }
}

impl TryFrom<OrderAggregate> for OrderModel {
    type Error = anyhow::Error;

    fn try_from(aggregate: OrderAggregate) -> Result<Self, Self::Error> {
        let OrderAggregate { order, items } = aggregate;
        let order_id = order.id;
        let unknown = |column: &str, value: &str| {
            anyhow!("order {order_id} has unknown {column} {value:?}")
        };

        let order_type = OrderType::from_str(&order.order_type)
            .ok_or_else(|| unknown("order type", &order.order_type))?;
        let status = OrderStatus::from_str(&order.status)
            .ok_or_else(|| unknown("status", &order.status))?;
        let payment_status = PaymentStatus::from_str(&order.payment_status)
            .ok_or_else(|| unknown("payment status", &order.payment_status))?;
        let payment_method = PaymentMethod::from_str(&order.payment_method)
            .ok_or_else(|| unknown("payment method", &order.payment_method))?;
        let shipping_address = Address::from_json(order.shipping_address)
            .with_context(|| format!("order {order_id} has an unreadable shipping address"))?;

        let subscription_details = match (
            order.subscription_duration_days,
            order.subscription_start_date,
            order.subscription_end_date,
            order.subscription_renewal_date,
        ) {
            (Some(duration_days), Some(start_date), Some(end_date), Some(renewal_date)) => {
                Some(SubscriptionDetailsModel {
                    duration_days,
                    start_date,
                    end_date,
                    renewal_date,
                })
            }
            _ => None,
        };

        Ok(Self {
            id: order.id,
            user_id: order.user_id,
            items: items.into_iter().map(OrderItemModel::from).collect(),
            total_amount_minor: order.total_amount_minor,
            order_type,
            subscription_details,
            status,
            shipping_address,
            payment_status,
            payment_method,
            prescription_required: order.prescription_required,
            prescription_url: order.prescription_url,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::orders::OrderEntity;

    fn stored(status: &str, shipping_address: Option<serde_json::Value>) -> OrderAggregate {
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        OrderAggregate {
            order: OrderEntity {
                id: order_id,
                user_id: Uuid::new_v4(),
                total_amount_minor: 500,
                order_type: "regular".to_string(),
                subscription_duration_days: None,
                subscription_start_date: None,
                subscription_end_date: None,
                subscription_renewal_date: None,
                status: status.to_string(),
                shipping_address,
                payment_status: "pending".to_string(),
                payment_method: "upi".to_string(),
                prescription_required: false,
                prescription_url: None,
                stock_reserved: true,
                created_at: now,
                updated_at: now,
            },
            items: vec![OrderItemEntity {
                id: Uuid::new_v4(),
                order_id,
                line_no: 1,
                medicine_id: Uuid::new_v4(),
                quantity: 2,
                price_minor: 250,
            }],
        }
    }

    #[test]
    fn stored_columns_load_as_typed_fields() {
        let address = serde_json::json!({
            "street": "12 MG Road", "city": "Pune", "state": "MH", "pincode": "411001"
        });
        let order = OrderModel::try_from(stored("shipped", Some(address))).unwrap();

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.payment_method, PaymentMethod::Upi);
        assert_eq!(
            order.shipping_address.map(|address| address.city),
            Some("Pune".to_string())
        );
        assert_eq!(order.items[0].medicine, None);
    }

    #[test]
    fn unknown_status_is_not_replaced_by_a_default() {
        let err = OrderModel::try_from(stored("returned", None)).unwrap_err();
        assert!(err.to_string().contains("returned"), "{err}");
    }

    #[test]
    fn unreadable_shipping_address_fails_to_load() {
        let aggregate = stored("pending", Some(serde_json::json!("12 MG Road")));
        assert!(OrderModel::try_from(aggregate).is_err());
    }

    #[test]
    fn attached_summaries_match_lines_by_medicine() {
        let mut order = OrderModel::try_from(stored("pending", None)).unwrap();
        let medicine_id = order.items[0].medicine_id;
        let summary = MedicineSummary {
            id: medicine_id,
            name: "Paracetamol".to_string(),
            dosage: "500mg".to_string(),
            manufacturer: "Cipla".to_string(),
            image_url: None,
        };

        order.attach_medicines(&HashMap::from([(medicine_id, summary.clone())]));

        assert_eq!(order.items[0].medicine, Some(summary));
    }
}
