pub mod audit_logs;
pub mod order_items;
pub mod orders;
pub mod sea_orm_active_enums;

pub use audit_logs::Entity as AuditLogs;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
