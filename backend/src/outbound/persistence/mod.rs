//! PostgreSQL persistence adapters using Diesel.
//!
//! Repository implementations only translate between row structs and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module.
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselZoneRepository, PoolConfig};
//!
//! let pool = DbPool::connect("postgres://localhost/audioguide", PoolConfig::default()).await?;
//! let zones = DieselZoneRepository::new(pool);
//! ```

mod diesel_helpers;
mod diesel_poi_repository;
mod diesel_zone_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_poi_repository::DieselPoiRepository;
pub use diesel_zone_repository::DieselZoneRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
