pub mod carts;
pub mod medicines;
pub mod orders;
pub mod user_subscriptions;
pub mod users;
