pub mod carts;
pub mod errors;
pub mod medicines;
pub mod orders;
pub mod subscriptions;
pub mod users;
