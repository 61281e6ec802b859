//! Attacks: the capability other components use to act on a dragon.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use wyrmhold_core::{CastleId, DomainError, DomainResult, DragonId};

use crate::realm::{Realm, RealmCommand, WoundDragon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    Fire,
    Physical,
    Arcane,
}

/// What an attack did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub target: DragonId,
    pub health_before: u32,
    pub health_after: u32,
    pub killed: bool,
    pub moved_to: Option<CastleId>,
}

/// An action that can be applied to a dragon.
///
/// The contract fixes only the signature; each variant defines its own effect.
pub trait AttackAction {
    fn name(&self) -> &str;

    fn power(&self) -> u32;

    fn attack_type(&self) -> AttackType;

    /// Apply the attack to `target`.
    ///
    /// Failures are reported as `AttackFailed` with the underlying error as cause.
    fn apply_attack(&self, realm: &mut Realm, target: DragonId) -> DomainResult<AttackOutcome>;
}

/// The closed set of attacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attack {
    /// Burns away `power` health; lethal at zero.
    FireBreath { power: u32 },
    /// Knocks off `power` health but always leaves the target standing.
    TailSwipe { power: u32 },
    /// Forces the target to move to `destination`.
    Banishment { destination: CastleId },
}

impl Attack {
    fn strike(&self, realm: &mut Realm, target: DragonId) -> DomainResult<Option<CastleId>> {
        match self {
            Attack::FireBreath { power } => {
                realm.execute(RealmCommand::WoundDragon(WoundDragon {
                    dragon_id: target,
                    damage: *power,
                    min_health: 0,
                    occurred_at: Utc::now(),
                }))?;
                Ok(None)
            }
            Attack::TailSwipe { power } => {
                realm.execute(RealmCommand::WoundDragon(WoundDragon {
                    dragon_id: target,
                    damage: *power,
                    min_health: 1,
                    occurred_at: Utc::now(),
                }))?;
                Ok(None)
            }
            Attack::Banishment { destination } => {
                realm.change_residence(target, *destination)?;
                Ok(Some(*destination))
            }
        }
    }
}

impl AttackAction for Attack {
    fn name(&self) -> &str {
        match self {
            Attack::FireBreath { .. } => "Fire Breath",
            Attack::TailSwipe { .. } => "Tail Swipe",
            Attack::Banishment { .. } => "Banishment",
        }
    }

    fn power(&self) -> u32 {
        match self {
            Attack::FireBreath { power } | Attack::TailSwipe { power } => *power,
            Attack::Banishment { .. } => 0,
        }
    }

    fn attack_type(&self) -> AttackType {
        match self {
            Attack::FireBreath { .. } => AttackType::Fire,
            Attack::TailSwipe { .. } => AttackType::Physical,
            Attack::Banishment { .. } => AttackType::Arcane,
        }
    }

    fn apply_attack(&self, realm: &mut Realm, target: DragonId) -> DomainResult<AttackOutcome> {
        let wrap = |cause: DomainError| DomainError::attack_failed(self.name()).with_cause(cause);

        let health_before = realm
            .dragon(target)
            .map(|d| d.health())
            .ok_or_else(|| wrap(DomainError::unknown_dragon(target)))?;

        let moved_to = self.strike(realm, target).map_err(wrap)?;

        let dragon = realm
            .dragon(target)
            .ok_or_else(|| wrap(DomainError::unknown_dragon(target)))?;

        tracing::info!(
            attack = self.name(),
            dragon = %target,
            health_before,
            health_after = dragon.health(),
            "attack applied"
        );

        Ok(AttackOutcome {
            target,
            health_before,
            health_after: dragon.health(),
            killed: dragon.is_dead(),
            moved_to,
        })
    }
}
