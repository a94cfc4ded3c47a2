//! Database module: row types, schema and the inventory storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring `Model` / `DigitalDisplay` rows
//! - `schema.rs`: DDL for bootstrapping an empty database
//! - `connect.rs`: session credentials and pool construction
//! - `storage.rs`: every SQL statement the handlers issue

pub mod connect;
pub mod models;
pub mod schema;
pub mod storage;

pub use connect::{DbCredentials, PoolSettings};
pub use models::{DigitalDisplay, Model};
pub use schema::INVENTORY_INIT;
pub use storage::InventoryStorage;
