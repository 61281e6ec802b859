use serde::{Deserialize, Serialize};

use wyrmhold_core::{CastleId, DomainError, DomainResult, DragonId, Entity};

use crate::config::{BreedingCheck, RealmConfig};

/// Construction input for a dragon.
///
/// Missing fields take their defaults: no residence, alive, age 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDragon {
    pub name: String,
    pub residence: Option<CastleId>,
    pub is_dead: bool,
    pub age: u32,
}

impl NewDragon {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn residing_in(mut self, castle: CastleId) -> Self {
        self.residence = Some(castle);
        self
    }

    pub fn aged(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub fn dead(mut self) -> Self {
        self.is_dead = true;
        self
    }
}

/// Lifecycle state of a dragon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeState {
    Alive,
    Dead,
}

/// The stateful actor of the model.
///
/// `residence` is a non-owning back reference resolved through the realm.
/// A dead dragon keeps its residence so it can return home when revived,
/// but it is not on that castle's resident list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dragon {
    id: DragonId,
    name: String,
    residence: Option<CastleId>,
    is_dead: bool,
    age: u32,
    health: u32,
}

impl Dragon {
    pub(crate) fn new(
        id: DragonId,
        name: String,
        residence: Option<CastleId>,
        is_dead: bool,
        age: u32,
        health: u32,
    ) -> Self {
        Self {
            id,
            name,
            residence,
            is_dead,
            age,
            health,
        }
    }

    pub fn residence(&self) -> Option<CastleId> {
        self.residence
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn state(&self) -> LifeState {
        if self.is_dead {
            LifeState::Dead
        } else {
            LifeState::Alive
        }
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    /// Castle whose resident list must contain this dragon, if any.
    pub fn listed_in(&self) -> Option<CastleId> {
        if self.is_dead { None } else { self.residence }
    }

    pub fn ensure_alive(&self) -> DomainResult<()> {
        if self.is_dead {
            Err(DomainError::already_dead(self.id))
        } else {
            Ok(())
        }
    }

    pub fn ensure_dead(&self) -> DomainResult<()> {
        if self.is_dead {
            Ok(())
        } else {
            Err(DomainError::not_dead(self.id))
        }
    }

    /// Run the breeding preconditions in the configured order.
    ///
    /// Returns the castle the baby will be born into.
    pub fn ensure_can_breed(&self, config: &RealmConfig) -> DomainResult<CastleId> {
        for check in &config.breeding_checks {
            match check {
                BreedingCheck::Alive => self.ensure_alive()?,
                BreedingCheck::Age => {
                    if self.age < config.min_breeding_age {
                        return Err(DomainError::too_young(
                            self.id,
                            self.age,
                            config.min_breeding_age,
                        ));
                    }
                }
                BreedingCheck::Residence => {
                    if self.residence.is_none() {
                        return Err(DomainError::not_in_residence(self.id));
                    }
                }
            }
        }
        self.residence
            .ok_or_else(|| DomainError::not_in_residence(self.id))
    }

    pub(crate) fn set_residence(&mut self, residence: Option<CastleId>) {
        self.residence = residence;
    }

    pub(crate) fn set_dead(&mut self, is_dead: bool) {
        self.is_dead = is_dead;
    }

    pub(crate) fn set_age(&mut self, age: u32) {
        self.age = age;
    }

    pub(crate) fn set_health(&mut self, health: u32) {
        self.health = health;
    }
}

impl Entity for Dragon {
    type Id = DragonId;

    fn id(&self) -> DragonId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use wyrmhold_core::ErrorKind;

    use super::*;

    fn dragon(residence: Option<CastleId>, is_dead: bool, age: u32) -> Dragon {
        Dragon::new(DragonId::new(), "Smaug".to_string(), residence, is_dead, age, 100)
    }

    #[test]
    fn new_dragon_defaults() {
        let input = NewDragon::named("Dragon");
        assert_eq!(input.residence, None);
        assert!(!input.is_dead);
        assert_eq!(input.age, 0);
    }

    #[test]
    fn new_dragon_deserializes_with_defaults() {
        let input: NewDragon = serde_json::from_str(r#"{"name":"Dragon","age":100}"#).unwrap();
        assert_eq!(input, NewDragon::named("Dragon").aged(100));
    }

    #[test]
    fn dead_dragon_is_listed_nowhere() {
        let castle = CastleId::new();
        let d = dragon(Some(castle), true, 0);
        assert_eq!(d.residence(), Some(castle));
        assert_eq!(d.listed_in(), None);
        assert_eq!(d.state(), LifeState::Dead);
    }

    #[test]
    fn breeding_succeeds_at_minimum_age() {
        let castle = CastleId::new();
        let d = dragon(Some(castle), false, 100);
        assert_eq!(d.ensure_can_breed(&RealmConfig::default()).unwrap(), castle);
    }

    #[test]
    fn breeding_fails_one_year_short() {
        let d = dragon(Some(CastleId::new()), false, 99);
        let err = d.ensure_can_breed(&RealmConfig::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TooYoung { age: 99, .. }));
    }

    #[test]
    fn default_order_reports_death_before_missing_residence() {
        let d = dragon(None, true, 0);
        let err = d.ensure_can_breed(&RealmConfig::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::AlreadyDead { .. }));
    }

    #[test]
    fn configured_order_changes_reported_error() {
        let d = dragon(None, true, 0);
        let config = RealmConfig {
            breeding_checks: vec![
                BreedingCheck::Residence,
                BreedingCheck::Age,
                BreedingCheck::Alive,
            ],
            ..RealmConfig::default()
        };
        let err = d.ensure_can_breed(&config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NotInResidence { .. }));
    }

    #[test]
    fn ensure_dead_rejects_living_dragon() {
        let d = dragon(None, false, 0);
        assert!(matches!(
            d.ensure_dead().unwrap_err().kind(),
            ErrorKind::NotDead { .. }
        ));
    }
}
