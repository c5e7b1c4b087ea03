use serde::Serialize;

pub mod accounts;
pub mod carts;
pub mod medicines;
pub mod orders;
pub mod subscriptions;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
