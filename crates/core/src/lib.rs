//! `wyrmhold-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives: identifiers, the entity and
//! aggregate traits, and the error taxonomy shared by every other crate.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{CastleId, DragonId, RealmId};
