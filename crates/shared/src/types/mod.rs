//! Common types used across the application.

pub mod amount;
pub mod id;
pub mod pagination;

pub use amount::{MONEY_SCALE, round_money, within_tolerance};
pub use id::*;
pub use pagination::{PageMeta, PageRequest};
