//! Slot-indexed item storage with stacking and batched change notification.

pub mod common;
pub mod config;
pub mod inventory;
