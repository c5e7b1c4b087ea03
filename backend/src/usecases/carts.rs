use std::sync::Arc;

use crates::domain::{
    repositories::{
        carts::CartRepository, medicines::MedicineRepository, orders::OrderRepository,
    },
    value_objects::{
        carts::{AddCartItemModel, Cart, CheckoutCartModel},
        enums::order_types::OrderType,
        iam::Actor,
        orders::{CreateOrderModel, OrderLineModel, OrderModel},
    },
};
use tracing::{error, info};
use uuid::Uuid;

use crate::usecases::{
    errors::{ServiceError, UseCaseResult},
    orders::OrderUseCase,
    stock,
};

pub struct CartUseCase<M, C, O>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    medicine_repository: Arc<M>,
    cart_repository: Arc<C>,
    order_usecase: Arc<OrderUseCase<M, O>>,
}

impl<M, C, O> CartUseCase<M, C, O>
where
    M: MedicineRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    pub fn new(
        medicine_repository: Arc<M>,
        cart_repository: Arc<C>,
        order_usecase: Arc<OrderUseCase<M, O>>,
    ) -> Self {
        Self {
            medicine_repository,
            cart_repository,
            order_usecase,
        }
    }

    pub async fn get_cart(&self, actor: Actor) -> UseCaseResult<Cart> {
        self.load(actor.user_id).await
    }

    /// Stock is checked against the quantity the line will hold after the add.
    pub async fn add_item(
        &self,
        actor: Actor,
        add_cart_item_model: AddCartItemModel,
    ) -> UseCaseResult<Cart> {
        let AddCartItemModel {
            medicine_id,
            quantity,
        } = add_cart_item_model;
        stock::ensure_positive_quantity(quantity)?;

        let medicine = stock::load_medicine(self.medicine_repository.as_ref(), medicine_id).await?;
        let mut cart = self.load(actor.user_id).await?;

        let already = cart.item(medicine_id).map_or(0, |item| item.quantity);
        stock::ensure_in_stock(&medicine, i64::from(already) + i64::from(quantity))?;

        cart.add(medicine_id, quantity, medicine.price_minor);

        info!(
            user_id = %actor.user_id,
            %medicine_id,
            quantity,
            "carts: item added"
        );

        self.save(actor.user_id, cart).await
    }

    pub async fn update_item(
        &self,
        actor: Actor,
        medicine_id: Uuid,
        quantity: i32,
    ) -> UseCaseResult<Cart> {
        stock::ensure_positive_quantity(quantity)?;

        let mut cart = self.load(actor.user_id).await?;
        if cart.item(medicine_id).is_none() {
            return Err(ServiceError::not_found(format!("cart item {medicine_id}")));
        }

        let medicine = stock::load_medicine(self.medicine_repository.as_ref(), medicine_id).await?;
        stock::ensure_in_stock(&medicine, i64::from(quantity))?;

        cart.set_quantity(medicine_id, quantity);

        self.save(actor.user_id, cart).await
    }

    pub async fn remove_item(&self, actor: Actor, medicine_id: Uuid) -> UseCaseResult<Cart> {
        let mut cart = self.load(actor.user_id).await?;
        cart.remove(medicine_id);

        self.save(actor.user_id, cart).await
    }

    pub async fn clear(&self, actor: Actor) -> UseCaseResult<Cart> {
        let mut cart = self.load(actor.user_id).await?;
        cart.clear();

        self.save(actor.user_id, cart).await
    }

    /// Places a regular order for the cart's lines at today's catalog prices, then empties
    /// the cart. A failure to empty the cart does not undo the order.
    pub async fn checkout(
        &self,
        actor: Actor,
        checkout_cart_model: CheckoutCartModel,
    ) -> UseCaseResult<OrderModel> {
        let user_id = actor.user_id;
        let mut cart = self.load(user_id).await?;
        if cart.is_empty() {
            return Err(ServiceError::Validation("cart is empty".to_string()));
        }

        let create_order_model = CreateOrderModel {
            items: cart
                .items()
                .iter()
                .map(|item| OrderLineModel {
                    medicine_id: item.medicine_id,
                    quantity: item.quantity,
                })
                .collect(),
            order_type: OrderType::Regular,
            subscription_details: None,
            shipping_address: checkout_cart_model.shipping_address,
            payment_method: checkout_cart_model.payment_method,
            prescription_url: checkout_cart_model.prescription_url,
        };

        let order = self
            .order_usecase
            .create_order(actor, create_order_model)
            .await?;

        cart.clear();
        if let Err(err) = self.save(user_id, cart).await {
            error!(
                %user_id,
                order_id = %order.id,
                error = ?err,
                "carts: order placed but cart could not be cleared"
            );
        }

        info!(%user_id, order_id = %order.id, "carts: checked out");

        Ok(order)
    }

    async fn load(&self, user_id: Uuid) -> UseCaseResult<Cart> {
        let cart = self
            .cart_repository
            .find_by_user(user_id)
            .await
            .map_err(ServiceError::from_repository)?;

        match cart {
            Some(entity) => Ok(Cart::try_from(entity)?),
            None => Ok(Cart::default()),
        }
    }

    async fn save(&self, user_id: Uuid, cart: Cart) -> UseCaseResult<Cart> {
        let saved = self
            .cart_repository
            .save(cart.to_entity(user_id)?)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "carts: failed to save cart");
                ServiceError::from_repository(err)
            })?;

        Ok(Cart::try_from(saved)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::carts::CartEntity,
        repositories::carts::MockCartRepository,
        value_objects::{
            addresses::Address, enums::payment_methods::PaymentMethod, enums::roles::Role,
        },
    };

    use crate::usecases::test_support::{InMemoryStore, medicine};

    type InMemoryCarts = CartUseCase<InMemoryStore, InMemoryStore, InMemoryStore>;

    fn in_memory() -> (Arc<InMemoryStore>, InMemoryCarts) {
        let store = Arc::new(InMemoryStore::new());
        let orders = Arc::new(OrderUseCase::new(Arc::clone(&store), Arc::clone(&store)));
        let usecase = CartUseCase::new(Arc::clone(&store), Arc::clone(&store), orders);
        (store, usecase)
    }

    fn user() -> Actor {
        Actor::new(Uuid::new_v4(), Role::User)
    }

    fn add(medicine_id: Uuid, quantity: i32) -> AddCartItemModel {
        AddCartItemModel {
            medicine_id,
            quantity,
        }
    }

    fn checkout_model() -> CheckoutCartModel {
        CheckoutCartModel {
            shipping_address: Address {
                street: "4 Station Road".to_string(),
                city: "Nashik".to_string(),
                state: "MH".to_string(),
                pincode: "422001".to_string(),
            },
            payment_method: PaymentMethod::Upi,
            prescription_url: None,
        }
    }

    #[tokio::test]
    async fn missing_cart_reads_as_empty() {
        let (_store, usecase) = in_memory();

        let cart = usecase.get_cart(user()).await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_amount_minor(), 0);
    }

    #[tokio::test]
    async fn total_follows_every_cart_operation() {
        let (store, usecase) = in_memory();
        let paracetamol = medicine(250, 10);
        let cetirizine = medicine(120, 10);
        store.put_medicine(paracetamol.clone()).await;
        store.put_medicine(cetirizine.clone()).await;
        let actor = user();

        let cart = usecase.add_item(actor, add(paracetamol.id, 2)).await.unwrap();
        assert_eq!(cart.total_amount_minor(), 500);

        let cart = usecase.add_item(actor, add(cetirizine.id, 3)).await.unwrap();
        assert_eq!(cart.total_amount_minor(), 500 + 360);

        let cart = usecase.update_item(actor, paracetamol.id, 5).await.unwrap();
        assert_eq!(cart.total_amount_minor(), 1_250 + 360);

        let cart = usecase.remove_item(actor, cetirizine.id).await.unwrap();
        assert_eq!(cart.total_amount_minor(), 1_250);

        let cart = usecase.clear(actor).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount_minor(), 0);

        assert_eq!(store.stock_of(paracetamol.id).await, Some(10));
    }

    #[tokio::test]
    async fn repeated_adds_are_checked_cumulatively() {
        let (store, usecase) = in_memory();
        let paracetamol = medicine(250, 5);
        store.put_medicine(paracetamol.clone()).await;
        let actor = user();

        usecase.add_item(actor, add(paracetamol.id, 3)).await.unwrap();
        let result = usecase.add_item(actor, add(paracetamol.id, 3)).await;

        assert!(matches!(result, Err(ServiceError::InsufficientStock { .. })));
        let cart = usecase.get_cart(actor).await.unwrap();
        assert_eq!(cart.item(paracetamol.id).map(|item| item.quantity), Some(3));
    }

    #[tokio::test]
    async fn price_snapshot_is_kept_from_the_first_add() {
        let (store, usecase) = in_memory();
        let mut paracetamol = medicine(250, 10);
        store.put_medicine(paracetamol.clone()).await;
        let actor = user();

        usecase.add_item(actor, add(paracetamol.id, 1)).await.unwrap();
        paracetamol.price_minor = 300;
        store.put_medicine(paracetamol.clone()).await;
        let cart = usecase.add_item(actor, add(paracetamol.id, 1)).await.unwrap();

        assert_eq!(cart.total_amount_minor(), 500);
    }

    #[tokio::test]
    async fn update_rejects_absent_lines_and_excess_quantity() {
        let (store, usecase) = in_memory();
        let paracetamol = medicine(250, 4);
        store.put_medicine(paracetamol.clone()).await;
        let actor = user();

        let absent = usecase.update_item(actor, paracetamol.id, 1).await;
        assert!(matches!(absent, Err(ServiceError::NotFound(_))));

        usecase.add_item(actor, add(paracetamol.id, 1)).await.unwrap();
        let excess = usecase.update_item(actor, paracetamol.id, 5).await;
        assert!(matches!(excess, Err(ServiceError::InsufficientStock { .. })));

        let zero = usecase.update_item(actor, paracetamol.id, 0).await;
        assert!(matches!(zero, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn adding_an_unknown_medicine_is_not_found() {
        let (_store, usecase) = in_memory();

        let result = usecase.add_item(user(), add(Uuid::new_v4(), 1)).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn checkout_reprices_orders_and_empties_the_cart() {
        let (store, usecase) = in_memory();
        let mut paracetamol = medicine(250, 10);
        store.put_medicine(paracetamol.clone()).await;
        let actor = user();

        usecase.add_item(actor, add(paracetamol.id, 4)).await.unwrap();
        paracetamol.price_minor = 200;
        store.put_medicine(paracetamol.clone()).await;

        let order = usecase.checkout(actor, checkout_model()).await.unwrap();

        assert_eq!(order.total_amount_minor, 800);
        assert_eq!(order.payment_method, PaymentMethod::Upi);
        assert_eq!(store.stock_of(paracetamol.id).await, Some(6));
        assert!(usecase.get_cart(actor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_of_an_empty_cart_is_rejected() {
        let (store, usecase) = in_memory();

        let result = usecase.checkout(user(), checkout_model()).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn failed_checkout_keeps_the_cart() {
        let (store, usecase) = in_memory();
        let mut paracetamol = medicine(250, 10);
        store.put_medicine(paracetamol.clone()).await;
        let actor = user();

        usecase.add_item(actor, add(paracetamol.id, 4)).await.unwrap();
        paracetamol.stock = 1;
        store.put_medicine(paracetamol.clone()).await;

        let result = usecase.checkout(actor, checkout_model()).await;

        assert!(matches!(result, Err(ServiceError::InsufficientStock { .. })));
        assert_eq!(usecase.get_cart(actor).await.unwrap().items().len(), 1);
    }

    #[tokio::test]
    async fn cart_storage_failures_are_internal() {
        let store = Arc::new(InMemoryStore::new());
        let mut cart_repository = MockCartRepository::new();
        cart_repository
            .expect_find_by_user()
            .returning(|_| Err(anyhow::anyhow!("pool exhausted")));

        let orders = Arc::new(OrderUseCase::new(Arc::clone(&store), Arc::clone(&store)));
        let usecase = CartUseCase::new(Arc::clone(&store), Arc::new(cart_repository), orders);

        let result = usecase.get_cart(user()).await;

        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }

    #[tokio::test]
    async fn unreadable_stored_cart_is_internal_and_not_overwritten() {
        let store = Arc::new(InMemoryStore::new());
        let paracetamol = medicine(250, 10);
        store.put_medicine(paracetamol.clone()).await;
        let actor = user();

        let mut cart_repository = MockCartRepository::new();
        cart_repository.expect_find_by_user().returning(|user_id| {
            Ok(Some(CartEntity {
                user_id,
                items: serde_json::json!({ "lines": "garbled" }),
                total_amount_minor: 500,
                updated_at: Utc::now(),
            }))
        });
        cart_repository.expect_save().never();

        let orders = Arc::new(OrderUseCase::new(Arc::clone(&store), Arc::clone(&store)));
        let usecase = CartUseCase::new(Arc::clone(&store), Arc::new(cart_repository), orders);

        assert!(matches!(
            usecase.get_cart(actor).await,
            Err(ServiceError::Internal(_))
        ));
        assert!(matches!(
            usecase.add_item(actor, add(paracetamol.id, 1)).await,
            Err(ServiceError::Internal(_))
        ));
    }
}
