pub mod addresses;
pub mod carts;
pub mod enums;
pub mod iam;
pub mod medicines;
pub mod orders;
pub mod subscriptions;
pub mod validation;
