use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, PgConnection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{medicines, order_items, orders},
};
use domain::{
    entities::orders::{
        InsertOrderItemEntity, NewOrder, OrderAggregate, OrderEntity, OrderItemEntity,
        UpdateOrderStatusEntity,
    },
    repositories::{
        errors::{OrderStatusConflict, StockError},
        orders::OrderRepository,
    },
    value_objects::enums::{order_statuses::OrderStatus, payment_statuses::PaymentStatus},
};

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn place_order(&self, new_order: NewOrder) -> Result<OrderAggregate> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let aggregate =
            conn.transaction::<_, anyhow::Error, _>(|tx| insert_order(tx, new_order))?;

        Ok(aggregate)
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderAggregate>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = orders::table
            .filter(orders::id.eq(order_id))
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        match order {
            Some(order) => Ok(Some(load_aggregate(&mut conn, order)?)),
            None => Ok(None),
        }
    }

    async fn find_by_id_for_user(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrderAggregate>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = orders::table
            .filter(orders::id.eq(order_id))
            .filter(orders::user_id.eq(user_id))
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        match order {
            Some(order) => Ok(Some(load_aggregate(&mut conn, order)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderAggregate>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderEntity::as_select())
            .load::<OrderEntity>(&mut conn)?;

        load_aggregates(&mut conn, results)
    }

    async fn list_all(&self) -> Result<Vec<OrderAggregate>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = orders::table
            .order(orders::created_at.desc())
            .select(OrderEntity::as_select())
            .load::<OrderEntity>(&mut conn)?;

        load_aggregates(&mut conn, results)
    }

    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        changes: UpdateOrderStatusEntity,
        restock: bool,
    ) -> Result<OrderAggregate> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let aggregate = conn.transaction::<_, anyhow::Error, _>(|tx| {
            let order = update(orders::table)
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq(from.to_string()))
                .set(&changes)
                .returning(OrderEntity::as_returning())
                .get_result::<OrderEntity>(tx)
                .optional()?
                .ok_or_else(|| OrderStatusConflict {
                    order_id,
                    expected: from.to_string(),
                })?;

            let aggregate = load_aggregate(tx, order)?;

            if restock {
                restore_stock(tx, &aggregate.items)?;
            }

            Ok(aggregate)
        })?;

        Ok(aggregate)
    }

    async fn transition_payment_status(
        &self,
        order_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<OrderAggregate> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = update(orders::table)
            .filter(orders::id.eq(order_id))
            .filter(orders::payment_status.eq(from.to_string()))
            .set((
                orders::payment_status.eq(to.to_string()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)
            .optional()?
            .ok_or_else(|| OrderStatusConflict {
                order_id,
                expected: from.to_string(),
            })?;

        load_aggregate(&mut conn, order)
    }
}

/// Runs inside the caller's transaction. Each line is reserved with a single
/// conditional `UPDATE ... WHERE stock >= quantity`; a line that matches no row
/// aborts the whole transaction, so stock is never decremented partially.
pub(crate) fn insert_order(tx: &mut PgConnection, new_order: NewOrder) -> Result<OrderAggregate> {
    let NewOrder { order, lines } = new_order;
    let now = Utc::now();

    if order.stock_reserved {
        for line in &lines {
            let reserved = update(medicines::table)
                .filter(medicines::id.eq(line.medicine_id))
                .filter(medicines::stock.ge(line.quantity))
                .set((
                    medicines::stock.eq(medicines::stock - line.quantity),
                    medicines::updated_at.eq(now),
                ))
                .execute(tx)?;

            if reserved == 0 {
                return Err(StockError::Insufficient {
                    medicine_id: line.medicine_id,
                }
                .into());
            }
        }
    }

    let order = insert_into(orders::table)
        .values(&order)
        .returning(OrderEntity::as_returning())
        .get_result::<OrderEntity>(tx)?;

    let insert_items = lines
        .iter()
        .zip(1..)
        .map(|(line, line_no)| InsertOrderItemEntity {
            order_id: order.id,
            line_no,
            medicine_id: line.medicine_id,
            quantity: line.quantity,
            price_minor: line.price_minor,
        })
        .collect::<Vec<_>>();

    let items = insert_into(order_items::table)
        .values(&insert_items)
        .returning(OrderItemEntity::as_returning())
        .get_results::<OrderItemEntity>(tx)?;

    Ok(OrderAggregate { order, items })
}

fn restore_stock(tx: &mut PgConnection, items: &[OrderItemEntity]) -> Result<()> {
    let now = Utc::now();

    for item in items {
        let restored = update(medicines::table)
            .filter(medicines::id.eq(item.medicine_id))
            .set((
                medicines::stock.eq(medicines::stock + item.quantity),
                medicines::updated_at.eq(now),
            ))
            .execute(tx)?;

        if restored == 0 {
            warn!(
                order_id = %item.order_id,
                medicine_id = %item.medicine_id,
                quantity = item.quantity,
                "orders: medicine no longer exists, stock not restored"
            );
        }
    }

    Ok(())
}

pub(crate) fn load_aggregate(conn: &mut PgConnection, order: OrderEntity) -> Result<OrderAggregate> {
    let items = OrderItemEntity::belonging_to(&order)
        .select(OrderItemEntity::as_select())
        .order(order_items::line_no.asc())
        .load::<OrderItemEntity>(conn)?;

    Ok(OrderAggregate { order, items })
}

fn load_aggregates(conn: &mut PgConnection, orders: Vec<OrderEntity>) -> Result<Vec<OrderAggregate>> {
    let items = OrderItemEntity::belonging_to(&orders)
        .select(OrderItemEntity::as_select())
        .order(order_items::line_no.asc())
        .load::<OrderItemEntity>(conn)?;

    let grouped = items.grouped_by(&orders);

    Ok(orders
        .into_iter()
        .zip(grouped)
        .map(|(order, items)| OrderAggregate { order, items })
        .collect())
}
