pub mod checkout;
pub mod fulfillment;
pub mod orders;
pub mod webhook;
