//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories implement the domain persistence ports on top of
//! `diesel-async` with `bb8` pooling. Row structs (`models.rs`) and the table
//! definitions (`schema.rs`) stay private to this module; adapters only
//! translate rows to domain types and map database failures onto the port
//! error enums. Unique-constraint violations become the ports' duplicate
//! variants.
//!
//! # Example
//!
//! ```no_run
//! use employee_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/ems")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_address_repository;
pub(crate) mod diesel_helpers;
mod diesel_membership_repository;
mod diesel_organization_repository;
mod diesel_team_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_address_repository::DieselAddressRepository;
pub use diesel_membership_repository::DieselMembershipRepository;
pub use diesel_organization_repository::DieselOrganizationRepository;
pub use diesel_team_repository::DieselTeamRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

use std::sync::Arc;

use crate::domain::Repositories;

/// Wire every Diesel repository over one shared pool.
pub fn diesel_repositories(pool: &DbPool) -> Repositories {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        addresses: Arc::new(DieselAddressRepository::new(pool.clone())),
        organizations: Arc::new(DieselOrganizationRepository::new(pool.clone())),
        memberships: Arc::new(DieselMembershipRepository::new(pool.clone())),
        teams: Arc::new(DieselTeamRepository::new(pool.clone())),
    }
}
