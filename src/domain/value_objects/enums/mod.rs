pub mod audit_actions;
pub mod card_types;
pub mod payment_statuses;
