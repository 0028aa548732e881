//! Data models for Solana transaction analysis

pub mod entity;
pub mod report;
pub mod transaction;

#[cfg(test)]
mod tests;

pub use self::entity::{EntityCategory, EntityLookup, EntityMetadata};
pub use self::report::{DataReport, SuspiciousAddressRecord, SuspiciousProfile};
pub use self::transaction::{NativeTransfer, TokenTransfer, Transaction};
