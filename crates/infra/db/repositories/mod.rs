pub mod carts;
pub mod medicines;
pub mod orders;
pub mod subscriptions;
pub mod users;
