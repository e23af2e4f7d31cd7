//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: process-local store used without a database and in tests.
//! - **notifications**: delivery of invitation and membership notices.
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod memory;
pub mod notifications;
pub mod persistence;
