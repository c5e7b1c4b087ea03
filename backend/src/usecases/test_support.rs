//! In-memory repositories for use-case tests. Every trait method runs under one lock,
//! which gives the same all-or-nothing behavior the Postgres transactions provide.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{
        carts::CartEntity,
        medicines::{InsertMedicineEntity, MedicineEntity, UpdateMedicineEntity},
        orders::{
            NewOrder, OrderAggregate, OrderEntity, OrderItemEntity, UpdateOrderStatusEntity,
        },
        user_subscriptions::{InsertUserSubscriptionEntity, UserSubscriptionEntity},
        users::{InsertUserEntity, UserEntity},
    },
    repositories::{
        carts::CartRepository,
        errors::{DuplicateEmail, OrderStatusConflict, StockError, SubscriptionMissing},
        medicines::MedicineRepository,
        orders::OrderRepository,
        subscriptions::SubscriptionRepository,
        users::UserRepository,
    },
    value_objects::{
        enums::{
            order_statuses::OrderStatus, payment_statuses::PaymentStatus,
            subscription_statuses::SubscriptionStatus,
        },
        medicines::SubscriptionOption,
    },
};
use tokio::sync::Mutex;
use uuid::Uuid;

pub fn medicine(price_minor: i64, stock: i32) -> MedicineEntity {
    let now = Utc::now();
    MedicineEntity {
        id: Uuid::new_v4(),
        name: "Paracetamol 500mg".to_string(),
        description: "Pain relief".to_string(),
        manufacturer: "Medirural Labs".to_string(),
        price_minor,
        stock,
        category: "analgesic".to_string(),
        prescription_required: false,
        image_url: None,
        dosage: "1 tablet every 6 hours".to_string(),
        expiry_time_frame_months: 24,
        is_available_for_subscription: false,
        subscription_options: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn subscribable_medicine(options: &[(i32, i64)]) -> MedicineEntity {
    let mut entity = medicine(1_000, 50);
    entity.is_available_for_subscription = true;
    entity.subscription_options = options
        .iter()
        .map(|&(duration_days, price_minor)| SubscriptionOption {
            duration_days,
            price_minor,
        })
        .collect();
    entity
}

#[derive(Default)]
struct State {
    medicines: HashMap<Uuid, MedicineEntity>,
    users: Vec<UserEntity>,
    carts: HashMap<Uuid, CartEntity>,
    orders: Vec<OrderAggregate>,
    subscriptions: Vec<UserSubscriptionEntity>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_medicine(&self, medicine: MedicineEntity) {
        self.state
            .lock()
            .await
            .medicines
            .insert(medicine.id, medicine);
    }

    pub async fn put_user(&self, user: UserEntity) {
        self.state.lock().await.users.push(user);
    }

    pub async fn stock_of(&self, medicine_id: Uuid) -> Option<i32> {
        self.state
            .lock()
            .await
            .medicines
            .get(&medicine_id)
            .map(|medicine| medicine.stock)
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn subscription_count(&self) -> usize {
        self.state.lock().await.subscriptions.len()
    }

    pub async fn subscription(&self, subscription_id: Uuid) -> Option<UserSubscriptionEntity> {
        self.state
            .lock()
            .await
            .subscriptions
            .iter()
            .find(|entry| entry.id == subscription_id)
            .cloned()
    }
}

impl State {
    fn insert_order(&mut self, new_order: NewOrder) -> Result<OrderAggregate> {
        let NewOrder { order, lines } = new_order;

        if order.stock_reserved {
            let mut reserved: HashMap<Uuid, i32> = HashMap::new();
            for line in &lines {
                let available = match reserved.get(&line.medicine_id) {
                    Some(stock) => Some(*stock),
                    None => self
                        .medicines
                        .get(&line.medicine_id)
                        .map(|medicine| medicine.stock),
                };
                match available {
                    Some(stock) if stock >= line.quantity => {
                        reserved.insert(line.medicine_id, stock - line.quantity);
                    }
                    _ => {
                        return Err(StockError::Insufficient {
                            medicine_id: line.medicine_id,
                        }
                        .into());
                    }
                }
            }
            for (medicine_id, stock) in reserved {
                if let Some(medicine) = self.medicines.get_mut(&medicine_id) {
                    medicine.stock = stock;
                }
            }
        }

        let order = OrderEntity {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            total_amount_minor: order.total_amount_minor,
            order_type: order.order_type,
            subscription_duration_days: order.subscription_duration_days,
            subscription_start_date: order.subscription_start_date,
            subscription_end_date: order.subscription_end_date,
            subscription_renewal_date: order.subscription_renewal_date,
            status: order.status,
            shipping_address: order.shipping_address,
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            prescription_required: order.prescription_required,
            prescription_url: order.prescription_url,
            stock_reserved: order.stock_reserved,
            created_at: order.created_at,
            updated_at: order.updated_at,
        };
        let items = lines
            .iter()
            .zip(1..)
            .map(|(line, line_no)| OrderItemEntity {
                id: Uuid::new_v4(),
                order_id: order.id,
                line_no,
                medicine_id: line.medicine_id,
                quantity: line.quantity,
                price_minor: line.price_minor,
            })
            .collect();

        let aggregate = OrderAggregate { order, items };
        self.orders.push(aggregate.clone());
        Ok(aggregate)
    }

    fn order_mut(&mut self, order_id: Uuid) -> Option<&mut OrderAggregate> {
        self.orders
            .iter_mut()
            .find(|aggregate| aggregate.order.id == order_id)
    }
}

fn newest_first(mut orders: Vec<OrderAggregate>) -> Vec<OrderAggregate> {
    orders.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
    orders
}

#[async_trait]
impl MedicineRepository for InMemoryStore {
    async fn find_by_id(&self, medicine_id: Uuid) -> Result<Option<MedicineEntity>> {
        Ok(self.state.lock().await.medicines.get(&medicine_id).cloned())
    }

    async fn find_many(&self, medicine_ids: &[Uuid]) -> Result<Vec<MedicineEntity>> {
        let state = self.state.lock().await;
        Ok(medicine_ids
            .iter()
            .filter_map(|medicine_id| state.medicines.get(medicine_id).cloned())
            .collect())
    }

    async fn list(&self) -> Result<Vec<MedicineEntity>> {
        let mut medicines: Vec<_> = self.state.lock().await.medicines.values().cloned().collect();
        medicines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(medicines)
    }

    async fn list_available_for_subscription(&self) -> Result<Vec<MedicineEntity>> {
        let medicines = MedicineRepository::list(self).await?;
        Ok(medicines
            .into_iter()
            .filter(|medicine| medicine.is_available_for_subscription)
            .collect())
    }

    async fn create(
        &self,
        insert_medicine_entity: InsertMedicineEntity,
    ) -> Result<MedicineEntity> {
        let entity = MedicineEntity {
            id: Uuid::new_v4(),
            name: insert_medicine_entity.name,
            description: insert_medicine_entity.description,
            manufacturer: insert_medicine_entity.manufacturer,
            price_minor: insert_medicine_entity.price_minor,
            stock: insert_medicine_entity.stock,
            category: insert_medicine_entity.category,
            prescription_required: insert_medicine_entity.prescription_required,
            image_url: insert_medicine_entity.image_url,
            dosage: insert_medicine_entity.dosage,
            expiry_time_frame_months: insert_medicine_entity.expiry_time_frame_months,
            is_available_for_subscription: insert_medicine_entity.is_available_for_subscription,
            subscription_options: serde_json::from_value(
                insert_medicine_entity.subscription_options,
            )?,
            created_at: insert_medicine_entity.created_at,
            updated_at: insert_medicine_entity.updated_at,
        };
        self.put_medicine(entity.clone()).await;
        Ok(entity)
    }

    async fn update(
        &self,
        medicine_id: Uuid,
        update_medicine_entity: UpdateMedicineEntity,
    ) -> Result<Option<MedicineEntity>> {
        let mut state = self.state.lock().await;
        let Some(medicine) = state.medicines.get_mut(&medicine_id) else {
            return Ok(None);
        };

        let UpdateMedicineEntity {
            name,
            description,
            manufacturer,
            price_minor,
            stock,
            category,
            prescription_required,
            image_url,
            dosage,
            expiry_time_frame_months,
            is_available_for_subscription,
            subscription_options,
            updated_at,
        } = update_medicine_entity;

        if let Some(name) = name {
            medicine.name = name;
        }
        if let Some(description) = description {
            medicine.description = description;
        }
        if let Some(manufacturer) = manufacturer {
            medicine.manufacturer = manufacturer;
        }
        if let Some(price_minor) = price_minor {
            medicine.price_minor = price_minor;
        }
        if let Some(stock) = stock {
            medicine.stock = stock;
        }
        if let Some(category) = category {
            medicine.category = category;
        }
        if let Some(prescription_required) = prescription_required {
            medicine.prescription_required = prescription_required;
        }
        if image_url.is_some() {
            medicine.image_url = image_url;
        }
        if let Some(dosage) = dosage {
            medicine.dosage = dosage;
        }
        if let Some(months) = expiry_time_frame_months {
            medicine.expiry_time_frame_months = months;
        }
        if let Some(available) = is_available_for_subscription {
            medicine.is_available_for_subscription = available;
        }
        if let Some(options) = subscription_options {
            medicine.subscription_options = serde_json::from_value(options)?;
        }
        medicine.updated_at = updated_at;

        Ok(Some(medicine.clone()))
    }

    async fn delete(&self, medicine_id: Uuid) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .await
            .medicines
            .remove(&medicine_id)
            .is_some())
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<CartEntity>> {
        Ok(self.state.lock().await.carts.get(&user_id).cloned())
    }

    async fn save(&self, cart_entity: CartEntity) -> Result<CartEntity> {
        self.state
            .lock()
            .await
            .carts
            .insert(cart_entity.user_id, cart_entity.clone());
        Ok(cart_entity)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn place_order(&self, new_order: NewOrder) -> Result<OrderAggregate> {
        self.state.lock().await.insert_order(new_order)
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderAggregate>> {
        Ok(self.state.lock().await.order_mut(order_id).map(|o| o.clone()))
    }

    async fn find_by_id_for_user(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrderAggregate>> {
        Ok(self
            .state
            .lock()
            .await
            .order_mut(order_id)
            .filter(|aggregate| aggregate.order.user_id == user_id)
            .map(|o| o.clone()))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderAggregate>> {
        let orders = self
            .state
            .lock()
            .await
            .orders
            .iter()
            .filter(|aggregate| aggregate.order.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn list_all(&self) -> Result<Vec<OrderAggregate>> {
        Ok(newest_first(self.state.lock().await.orders.clone()))
    }

    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        changes: UpdateOrderStatusEntity,
        restock: bool,
    ) -> Result<OrderAggregate> {
        let mut state = self.state.lock().await;

        let conflict = OrderStatusConflict {
            order_id,
            expected: from.to_string(),
        };
        let aggregate = match state.order_mut(order_id) {
            Some(aggregate) if aggregate.order.status == from.as_str() => aggregate,
            _ => return Err(conflict.into()),
        };

        if let Some(status) = changes.status {
            aggregate.order.status = status;
        }
        if let Some(payment_status) = changes.payment_status {
            aggregate.order.payment_status = payment_status;
        }
        aggregate.order.updated_at = changes.updated_at;
        let aggregate = aggregate.clone();

        if restock {
            for item in &aggregate.items {
                if let Some(medicine) = state.medicines.get_mut(&item.medicine_id) {
                    medicine.stock += item.quantity;
                }
            }
        }

        Ok(aggregate)
    }

    async fn transition_payment_status(
        &self,
        order_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<OrderAggregate> {
        let mut state = self.state.lock().await;

        match state.order_mut(order_id) {
            Some(aggregate) if aggregate.order.payment_status == from.as_str() => {
                aggregate.order.payment_status = to.to_string();
                aggregate.order.updated_at = Utc::now();
                Ok(aggregate.clone())
            }
            _ => Err(OrderStatusConflict {
                order_id,
                expected: from.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<UserSubscriptionEntity>> {
        let mut entries: Vec<_> = self
            .state
            .lock()
            .await
            .subscriptions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn find_for_user(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UserSubscriptionEntity>> {
        Ok(self
            .state
            .lock()
            .await
            .subscriptions
            .iter()
            .find(|entry| entry.id == subscription_id && entry.user_id == user_id)
            .cloned())
    }

    async fn complete_expired(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut state = self.state.lock().await;
        let active = SubscriptionStatus::Active.to_string();

        let mut completed = 0;
        for entry in state.subscriptions.iter_mut().filter(|entry| {
            entry.user_id == user_id && entry.status == active && entry.end_date < now
        }) {
            entry.status = SubscriptionStatus::Completed.to_string();
            entry.updated_at = now;
            completed += 1;
        }
        Ok(completed)
    }

    async fn subscribe(
        &self,
        insert_subscription_entity: InsertUserSubscriptionEntity,
        new_order: NewOrder,
    ) -> Result<(UserSubscriptionEntity, OrderAggregate)> {
        let mut state = self.state.lock().await;

        let aggregate = state.insert_order(new_order)?;
        let entry = UserSubscriptionEntity {
            id: Uuid::new_v4(),
            user_id: insert_subscription_entity.user_id,
            medicine_id: insert_subscription_entity.medicine_id,
            duration_days: insert_subscription_entity.duration_days,
            start_date: insert_subscription_entity.start_date,
            end_date: insert_subscription_entity.end_date,
            status: insert_subscription_entity.status,
            created_at: insert_subscription_entity.created_at,
            updated_at: insert_subscription_entity.updated_at,
        };
        state.subscriptions.push(entry.clone());

        Ok((entry, aggregate))
    }

    async fn renew(
        &self,
        subscription_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        new_order: NewOrder,
    ) -> Result<(UserSubscriptionEntity, OrderAggregate)> {
        let mut state = self.state.lock().await;

        if !state
            .subscriptions
            .iter()
            .any(|entry| entry.id == subscription_id)
        {
            return Err(SubscriptionMissing { subscription_id }.into());
        }

        let aggregate = state.insert_order(new_order)?;

        let entry = state
            .subscriptions
            .iter_mut()
            .find(|entry| entry.id == subscription_id)
            .ok_or(SubscriptionMissing { subscription_id })?;
        entry.start_date = start_date;
        entry.end_date = end_date;
        entry.status = SubscriptionStatus::Active.to_string();
        entry.updated_at = Utc::now();

        Ok((entry.clone(), aggregate))
    }

    async fn cancel(&self, subscription_id: Uuid) -> Result<UserSubscriptionEntity> {
        let mut state = self.state.lock().await;

        let entry = state
            .subscriptions
            .iter_mut()
            .find(|entry| entry.id == subscription_id)
            .ok_or(SubscriptionMissing { subscription_id })?;
        entry.status = SubscriptionStatus::Cancelled.to_string();
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, insert_user_entity: InsertUserEntity) -> Result<UserEntity> {
        let mut state = self.state.lock().await;

        if state
            .users
            .iter()
            .any(|user| user.email == insert_user_entity.email)
        {
            return Err(DuplicateEmail {
                email: insert_user_entity.email,
            }
            .into());
        }

        let user = UserEntity {
            id: Uuid::new_v4(),
            name: insert_user_entity.name,
            email: insert_user_entity.email,
            password_hash: insert_user_entity.password_hash,
            phone: insert_user_entity.phone,
            address: insert_user_entity.address,
            role: insert_user_entity.role,
            created_at: insert_user_entity.created_at,
            updated_at: insert_user_entity.updated_at,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }
}
