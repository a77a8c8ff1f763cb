pub mod checkout_service;
pub mod fulfillment_service;
pub mod order_service;
pub mod transitions;
pub mod webhook_service;
