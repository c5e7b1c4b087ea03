pub mod accounts;
pub mod carts;
pub mod errors;
pub mod medicines;
pub mod orders;
pub mod stock;
pub mod subscriptions;

#[cfg(test)]
pub mod test_support;
