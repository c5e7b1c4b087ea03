pub mod order_statuses;
pub mod order_types;
pub mod payment_methods;
pub mod payment_statuses;
pub mod roles;
pub mod subscription_statuses;
