//! Castle/dragon lifecycle model.
//!
//! This crate contains the residence, breeding, death, and attack rules,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod attack;
pub mod castle;
pub mod config;
pub mod dragon;
pub mod realm;

pub use attack::{Attack, AttackAction, AttackOutcome, AttackType};
pub use castle::{Castle, NewCastle};
pub use config::{BreedingCheck, RealmConfig};
pub use dragon::{Dragon, LifeState, NewDragon};
pub use realm::{Realm, RealmCommand, RealmEvent};
