//! The realm: owner of every castle and dragon.
//!
//! All lifecycle operations run as commands against the realm. `handle`
//! validates a command against dragon and castle state and returns events
//! without touching anything; `apply` then performs the mutations. Because
//! every check runs before the first mutation, a rejected command is never
//! partially observed (no dragon listed in two castles, or in none).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wyrmhold_core::{
    Aggregate, AggregateRoot, CastleId, DomainError, DomainResult, DragonId, Entity, ErrorKind,
    RealmId,
};
use wyrmhold_events::{Event, EventJournal};

use crate::castle::{Castle, NewCastle};
use crate::config::RealmConfig;
use crate::dragon::{Dragon, NewDragon};

/// Command: FoundCastle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundCastle {
    pub castle_id: CastleId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SpawnDragon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnDragon {
    pub dragon_id: DragonId,
    pub dragon: NewDragon,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeResidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeResidence {
    pub dragon_id: DragonId,
    pub castle_id: CastleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: HaveBaby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaveBaby {
    pub parent_id: DragonId,
    pub baby_id: DragonId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: KillDragon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillDragon {
    pub dragon_id: DragonId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReviveDragon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviveDragon {
    pub dragon_id: DragonId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AgeDragon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeDragon {
    pub dragon_id: DragonId,
    pub years: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: WoundDragon.
///
/// Health never drops below `min_health`; reaching zero kills the dragon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoundDragon {
    pub dragon_id: DragonId,
    pub damage: u32,
    pub min_health: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveCastle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveCastle {
    pub castle_id: CastleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveDragon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDragon {
    pub dragon_id: DragonId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealmCommand {
    FoundCastle(FoundCastle),
    SpawnDragon(SpawnDragon),
    ChangeResidence(ChangeResidence),
    HaveBaby(HaveBaby),
    KillDragon(KillDragon),
    ReviveDragon(ReviveDragon),
    AgeDragon(AgeDragon),
    WoundDragon(WoundDragon),
    RemoveCastle(RemoveCastle),
    RemoveDragon(RemoveDragon),
}

impl RealmCommand {
    pub fn name(&self) -> &'static str {
        match self {
            RealmCommand::FoundCastle(_) => "found_castle",
            RealmCommand::SpawnDragon(_) => "spawn_dragon",
            RealmCommand::ChangeResidence(_) => "change_residence",
            RealmCommand::HaveBaby(_) => "have_baby",
            RealmCommand::KillDragon(_) => "kill_dragon",
            RealmCommand::ReviveDragon(_) => "revive_dragon",
            RealmCommand::AgeDragon(_) => "age_dragon",
            RealmCommand::WoundDragon(_) => "wound_dragon",
            RealmCommand::RemoveCastle(_) => "remove_castle",
            RealmCommand::RemoveDragon(_) => "remove_dragon",
        }
    }
}

/// Event: CastleFounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastleFounded {
    pub castle_id: CastleId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CastleRemoved.
///
/// `evicted` lists every dragon (alive or dead) whose residence was the castle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastleRemoved {
    pub castle_id: CastleId,
    pub evicted: Vec<DragonId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DragonSpawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonSpawned {
    pub dragon_id: DragonId,
    pub name: String,
    pub residence: Option<CastleId>,
    pub is_dead: bool,
    pub age: u32,
    pub health: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DragonBorn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonBorn {
    pub parent_id: DragonId,
    pub dragon_id: DragonId,
    pub name: String,
    pub castle_id: CastleId,
    pub health: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ResidenceChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidenceChanged {
    pub dragon_id: DragonId,
    pub from: Option<CastleId>,
    pub to: CastleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DragonKilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonKilled {
    pub dragon_id: DragonId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DragonRevived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonRevived {
    pub dragon_id: DragonId,
    pub health: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DragonAged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonAged {
    pub dragon_id: DragonId,
    pub age: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DragonWounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonWounded {
    pub dragon_id: DragonId,
    pub health_before: u32,
    pub health_after: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DragonRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonRemoved {
    pub dragon_id: DragonId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealmEvent {
    CastleFounded(CastleFounded),
    CastleRemoved(CastleRemoved),
    DragonSpawned(DragonSpawned),
    DragonBorn(DragonBorn),
    ResidenceChanged(ResidenceChanged),
    DragonKilled(DragonKilled),
    DragonRevived(DragonRevived),
    DragonAged(DragonAged),
    DragonWounded(DragonWounded),
    DragonRemoved(DragonRemoved),
}

impl Event for RealmEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RealmEvent::CastleFounded(_) => "lair.castle.founded",
            RealmEvent::CastleRemoved(_) => "lair.castle.removed",
            RealmEvent::DragonSpawned(_) => "lair.dragon.spawned",
            RealmEvent::DragonBorn(_) => "lair.dragon.born",
            RealmEvent::ResidenceChanged(_) => "lair.dragon.residence_changed",
            RealmEvent::DragonKilled(_) => "lair.dragon.killed",
            RealmEvent::DragonRevived(_) => "lair.dragon.revived",
            RealmEvent::DragonAged(_) => "lair.dragon.aged",
            RealmEvent::DragonWounded(_) => "lair.dragon.wounded",
            RealmEvent::DragonRemoved(_) => "lair.dragon.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RealmEvent::CastleFounded(e) => e.occurred_at,
            RealmEvent::CastleRemoved(e) => e.occurred_at,
            RealmEvent::DragonSpawned(e) => e.occurred_at,
            RealmEvent::DragonBorn(e) => e.occurred_at,
            RealmEvent::ResidenceChanged(e) => e.occurred_at,
            RealmEvent::DragonKilled(e) => e.occurred_at,
            RealmEvent::DragonRevived(e) => e.occurred_at,
            RealmEvent::DragonAged(e) => e.occurred_at,
            RealmEvent::DragonWounded(e) => e.occurred_at,
            RealmEvent::DragonRemoved(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: Realm.
///
/// Castles own membership; dragons hold their residence as a plain id.
/// Castles are only handed out as `&Castle`, so membership changes solely
/// through dragon operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realm {
    id: RealmId,
    config: RealmConfig,
    castles: BTreeMap<CastleId, Castle>,
    dragons: BTreeMap<DragonId, Dragon>,
    journal: EventJournal<RealmEvent>,
    version: u64,
}

impl Default for Realm {
    fn default() -> Self {
        Self::build(RealmId::new(), RealmConfig::default())
    }
}

impl Realm {
    pub fn new(config: RealmConfig) -> DomainResult<Self> {
        Self::with_id(RealmId::new(), config)
    }

    pub fn with_id(id: RealmId, config: RealmConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self::build(id, config))
    }

    fn build(id: RealmId, config: RealmConfig) -> Self {
        Self {
            id,
            config,
            castles: BTreeMap::new(),
            dragons: BTreeMap::new(),
            journal: EventJournal::new(id),
            version: 0,
        }
    }

    pub fn config(&self) -> &RealmConfig {
        &self.config
    }

    pub fn journal(&self) -> &EventJournal<RealmEvent> {
        &self.journal
    }

    pub fn castle(&self, id: CastleId) -> Option<&Castle> {
        self.castles.get(&id)
    }

    pub fn dragon(&self, id: DragonId) -> Option<&Dragon> {
        self.dragons.get(&id)
    }

    pub fn castles(&self) -> impl Iterator<Item = &Castle> {
        self.castles.values()
    }

    pub fn dragons(&self) -> impl Iterator<Item = &Dragon> {
        self.dragons.values()
    }

    /// Residents of a castle, in arrival order.
    pub fn residents_of(&self, castle_id: CastleId) -> DomainResult<&[DragonId]> {
        Ok(self.castle_ref(castle_id)?.residents())
    }

    /// Validate, apply, and journal a command.
    pub fn execute(&mut self, command: RealmCommand) -> DomainResult<Vec<RealmEvent>> {
        let events = match self.handle(&command) {
            Ok(events) => events,
            Err(err) => {
                if matches!(err.kind(), ErrorKind::Inconsistent(_)) {
                    tracing::warn!(command = command.name(), error = %err, "command rejected");
                } else {
                    tracing::debug!(command = command.name(), error = %err, "command rejected");
                }
                return Err(err);
            }
        };

        for event in &events {
            self.apply(event);
        }
        self.journal.append(events.clone());
        Ok(events)
    }

    pub fn add_castle(&mut self, input: NewCastle) -> DomainResult<CastleId> {
        let castle_id = CastleId::new();
        self.execute(RealmCommand::FoundCastle(FoundCastle {
            castle_id,
            name: input.name,
            occurred_at: Utc::now(),
        }))?;
        Ok(castle_id)
    }

    pub fn spawn_dragon(&mut self, input: NewDragon) -> DomainResult<DragonId> {
        let dragon_id = DragonId::new();
        self.execute(RealmCommand::SpawnDragon(SpawnDragon {
            dragon_id,
            dragon: input,
            occurred_at: Utc::now(),
        }))?;
        Ok(dragon_id)
    }

    pub fn change_residence(&mut self, dragon_id: DragonId, castle_id: CastleId) -> DomainResult<()> {
        self.execute(RealmCommand::ChangeResidence(ChangeResidence {
            dragon_id,
            castle_id,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Returns the id of the newborn.
    pub fn have_baby(&mut self, parent_id: DragonId, name: impl Into<String>) -> DomainResult<DragonId> {
        let baby_id = DragonId::new();
        self.execute(RealmCommand::HaveBaby(HaveBaby {
            parent_id,
            baby_id,
            name: name.into(),
            occurred_at: Utc::now(),
        }))?;
        Ok(baby_id)
    }

    pub fn kill(&mut self, dragon_id: DragonId) -> DomainResult<()> {
        self.execute(RealmCommand::KillDragon(KillDragon {
            dragon_id,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    pub fn revive(&mut self, dragon_id: DragonId) -> DomainResult<()> {
        self.execute(RealmCommand::ReviveDragon(ReviveDragon {
            dragon_id,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Returns the new age.
    pub fn age_dragon(&mut self, dragon_id: DragonId, years: u32) -> DomainResult<u32> {
        self.execute(RealmCommand::AgeDragon(AgeDragon {
            dragon_id,
            years,
            occurred_at: Utc::now(),
        }))?;
        Ok(self.dragon_ref(dragon_id)?.age())
    }

    /// Dispose of a castle; every dragon that lived there loses its residence.
    pub fn remove_castle(&mut self, castle_id: CastleId) -> DomainResult<Vec<DragonId>> {
        let events = self.execute(RealmCommand::RemoveCastle(RemoveCastle {
            castle_id,
            occurred_at: Utc::now(),
        }))?;
        Ok(events
            .into_iter()
            .find_map(|event| match event {
                RealmEvent::CastleRemoved(e) => Some(e.evicted),
                _ => None,
            })
            .unwrap_or_default())
    }

    pub fn remove_dragon(&mut self, dragon_id: DragonId) -> DomainResult<()> {
        self.execute(RealmCommand::RemoveDragon(RemoveDragon {
            dragon_id,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Verify that castle membership and dragon residences agree everywhere.
    ///
    /// A living dragon with a residence appears exactly once in that castle;
    /// dead or homeless dragons appear in no castle.
    pub fn check_invariants(&self) -> DomainResult<()> {
        for dragon in self.dragons.values() {
            if let Some(castle_id) = dragon.residence() {
                if !self.castles.contains_key(&castle_id) {
                    return Err(DomainError::inconsistent(format!(
                        "dragon {} references removed castle {castle_id}",
                        dragon.id()
                    )));
                }
            }
            for castle in self.castles.values() {
                let count = castle
                    .residents()
                    .iter()
                    .filter(|d| **d == dragon.id())
                    .count();
                let expected = usize::from(dragon.listed_in() == Some(castle.id()));
                if count != expected {
                    return Err(DomainError::inconsistent(format!(
                        "dragon {} listed {count} time(s) in castle {}, expected {expected}",
                        dragon.id(),
                        castle.id()
                    )));
                }
            }
        }

        for castle in self.castles.values() {
            if let Some(stranger) = castle
                .residents()
                .iter()
                .find(|d| !self.dragons.contains_key(*d))
            {
                return Err(DomainError::inconsistent(format!(
                    "castle {} lists unknown dragon {stranger}",
                    castle.id()
                )));
            }
        }
        Ok(())
    }
}

impl AggregateRoot for Realm {
    type Id = RealmId;

    fn id(&self) -> RealmId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Realm {
    type Command = RealmCommand;
    type Event = RealmEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        tracing::debug!(event_type = event.event_type(), "applying event");

        match event {
            RealmEvent::CastleFounded(e) => {
                self.castles
                    .insert(e.castle_id, Castle::founded(e.castle_id, e.name.clone()));
            }
            RealmEvent::CastleRemoved(e) => {
                for dragon_id in &e.evicted {
                    if let Some(dragon) = self.dragons.get_mut(dragon_id) {
                        dragon.set_residence(None);
                    }
                }
                self.castles.remove(&e.castle_id);
                tracing::info!(castle = %e.castle_id, evicted = e.evicted.len(), "castle removed");
            }
            RealmEvent::DragonSpawned(e) => {
                let dragon = Dragon::new(
                    e.dragon_id,
                    e.name.clone(),
                    e.residence,
                    e.is_dead,
                    e.age,
                    e.health,
                );
                let listed_in = dragon.listed_in();
                self.dragons.insert(e.dragon_id, dragon);
                if let Some(castle_id) = listed_in {
                    self.admit(castle_id, e.dragon_id);
                }
            }
            RealmEvent::DragonBorn(e) => {
                let baby = Dragon::new(
                    e.dragon_id,
                    e.name.clone(),
                    Some(e.castle_id),
                    false,
                    0,
                    e.health,
                );
                self.dragons.insert(e.dragon_id, baby);
                self.admit(e.castle_id, e.dragon_id);
                tracing::info!(parent = %e.parent_id, dragon = %e.dragon_id, castle = %e.castle_id, "dragon born");
            }
            RealmEvent::ResidenceChanged(e) => {
                if let Some(from) = e.from {
                    self.evict(from, e.dragon_id);
                }
                self.admit(e.to, e.dragon_id);
                if let Some(dragon) = self.dragons.get_mut(&e.dragon_id) {
                    dragon.set_residence(Some(e.to));
                }
                tracing::info!(dragon = %e.dragon_id, castle = %e.to, "dragon moved");
            }
            RealmEvent::DragonKilled(e) => {
                let listed_in = self.dragons.get(&e.dragon_id).and_then(Dragon::listed_in);
                if let Some(castle_id) = listed_in {
                    self.evict(castle_id, e.dragon_id);
                }
                if let Some(dragon) = self.dragons.get_mut(&e.dragon_id) {
                    dragon.set_dead(true);
                    dragon.set_health(0);
                }
                tracing::info!(dragon = %e.dragon_id, "dragon killed");
            }
            RealmEvent::DragonRevived(e) => {
                let residence = self.dragons.get(&e.dragon_id).and_then(Dragon::residence);
                if let Some(dragon) = self.dragons.get_mut(&e.dragon_id) {
                    dragon.set_dead(false);
                    dragon.set_health(e.health);
                }
                if let Some(castle_id) = residence {
                    self.admit(castle_id, e.dragon_id);
                }
                tracing::info!(dragon = %e.dragon_id, "dragon revived");
            }
            RealmEvent::DragonAged(e) => {
                if let Some(dragon) = self.dragons.get_mut(&e.dragon_id) {
                    dragon.set_age(e.age);
                }
            }
            RealmEvent::DragonWounded(e) => {
                if let Some(dragon) = self.dragons.get_mut(&e.dragon_id) {
                    dragon.set_health(e.health_after);
                }
            }
            RealmEvent::DragonRemoved(e) => {
                let listed_in = self.dragons.get(&e.dragon_id).and_then(Dragon::listed_in);
                if let Some(castle_id) = listed_in {
                    self.evict(castle_id, e.dragon_id);
                }
                self.dragons.remove(&e.dragon_id);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RealmCommand::FoundCastle(cmd) => self.handle_found_castle(cmd),
            RealmCommand::SpawnDragon(cmd) => self.handle_spawn(cmd),
            RealmCommand::ChangeResidence(cmd) => self.handle_change_residence(cmd),
            RealmCommand::HaveBaby(cmd) => self.handle_have_baby(cmd),
            RealmCommand::KillDragon(cmd) => self.handle_kill(cmd),
            RealmCommand::ReviveDragon(cmd) => self.handle_revive(cmd),
            RealmCommand::AgeDragon(cmd) => self.handle_age(cmd),
            RealmCommand::WoundDragon(cmd) => self.handle_wound(cmd),
            RealmCommand::RemoveCastle(cmd) => self.handle_remove_castle(cmd),
            RealmCommand::RemoveDragon(cmd) => self.handle_remove_dragon(cmd),
        }
    }
}

// Apply-side helpers. Commands were validated by `handle`, so a failure here
// means the realm was rehydrated from events that do not fit its state.
impl Realm {
    fn admit(&mut self, castle_id: CastleId, dragon_id: DragonId) {
        match self.castles.get_mut(&castle_id) {
            Some(castle) => {
                if let Err(err) = castle.add_resident(dragon_id) {
                    tracing::error!(error = %err, "resident list out of sync while applying event");
                }
            }
            None => {
                tracing::error!(castle = %castle_id, dragon = %dragon_id, "cannot admit dragon into unknown castle");
            }
        }
    }

    fn evict(&mut self, castle_id: CastleId, dragon_id: DragonId) {
        match self.castles.get_mut(&castle_id) {
            Some(castle) => {
                if let Err(err) = castle.remove_resident(dragon_id) {
                    tracing::error!(error = %err, "resident list out of sync while applying event");
                }
            }
            None => {
                tracing::error!(castle = %castle_id, dragon = %dragon_id, "cannot evict dragon from unknown castle");
            }
        }
    }
}

// Handle-side validation.
impl Realm {
    fn dragon_ref(&self, id: DragonId) -> DomainResult<&Dragon> {
        self.dragons
            .get(&id)
            .ok_or_else(|| DomainError::unknown_dragon(id))
    }

    fn castle_ref(&self, id: CastleId) -> DomainResult<&Castle> {
        self.castles
            .get(&id)
            .ok_or_else(|| DomainError::unknown_castle(id))
    }

    fn ensure_name(name: &str, what: &str) -> DomainResult<()> {
        if name.trim().is_empty() {
            return Err(DomainError::validation(format!("{what} name cannot be empty")));
        }
        Ok(())
    }

    fn ensure_unused_dragon_id(&self, id: DragonId) -> DomainResult<()> {
        if self.dragons.contains_key(&id) {
            return Err(DomainError::validation(format!("dragon {id} already exists")));
        }
        Ok(())
    }

    /// The castle a dragon lives in must still exist.
    fn home_of(&self, dragon_id: DragonId, castle_id: CastleId) -> DomainResult<&Castle> {
        self.castle_ref(castle_id).map_err(|cause| {
            DomainError::inconsistent(format!("dragon {dragon_id} lives in a missing castle"))
                .with_cause(cause)
        })
    }

    /// A living dragon with a residence must be on that castle's list.
    fn ensure_listed(&self, dragon: &Dragon) -> DomainResult<()> {
        if let Some(castle_id) = dragon.listed_in() {
            self.home_of(dragon.id(), castle_id)?
                .ensure_present(dragon.id())
                .map_err(|cause| {
                    DomainError::inconsistent(format!(
                        "dragon {} is missing from its castle's resident list",
                        dragon.id()
                    ))
                    .with_cause(cause)
                })?;
        }
        Ok(())
    }

    /// The dragon must not already be on the castle's list.
    fn ensure_unlisted(castle: &Castle, dragon_id: DragonId) -> DomainResult<()> {
        castle.ensure_absent(dragon_id).map_err(|cause| {
            DomainError::inconsistent(format!(
                "dragon {dragon_id} is listed in a castle it does not live in"
            ))
            .with_cause(cause)
        })
    }

    fn handle_found_castle(&self, cmd: &FoundCastle) -> DomainResult<Vec<RealmEvent>> {
        Self::ensure_name(&cmd.name, "castle")?;
        if self.castles.contains_key(&cmd.castle_id) {
            return Err(DomainError::validation(format!(
                "castle {} already exists",
                cmd.castle_id
            )));
        }

        Ok(vec![RealmEvent::CastleFounded(CastleFounded {
            castle_id: cmd.castle_id,
            name: cmd.name.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_spawn(&self, cmd: &SpawnDragon) -> DomainResult<Vec<RealmEvent>> {
        let input = &cmd.dragon;
        Self::ensure_name(&input.name, "dragon")?;
        self.ensure_unused_dragon_id(cmd.dragon_id)?;

        if let Some(castle_id) = input.residence {
            let castle = self.castle_ref(castle_id)?;
            if !input.is_dead {
                Self::ensure_unlisted(castle, cmd.dragon_id)?;
            }
        }

        let health = if input.is_dead {
            0
        } else {
            self.config.default_health
        };

        Ok(vec![RealmEvent::DragonSpawned(DragonSpawned {
            dragon_id: cmd.dragon_id,
            name: input.name.clone(),
            residence: input.residence,
            is_dead: input.is_dead,
            age: input.age,
            health,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_residence(&self, cmd: &ChangeResidence) -> DomainResult<Vec<RealmEvent>> {
        let dragon = self.dragon_ref(cmd.dragon_id)?;
        let destination = self.castle_ref(cmd.castle_id)?;

        if dragon.residence() == Some(cmd.castle_id) {
            return Err(DomainError::same_residence(dragon.id(), cmd.castle_id));
        }
        dragon.ensure_alive()?;
        self.ensure_listed(dragon)?;
        Self::ensure_unlisted(destination, dragon.id())?;

        Ok(vec![RealmEvent::ResidenceChanged(ResidenceChanged {
            dragon_id: cmd.dragon_id,
            from: dragon.residence(),
            to: cmd.castle_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_have_baby(&self, cmd: &HaveBaby) -> DomainResult<Vec<RealmEvent>> {
        let parent = self.dragon_ref(cmd.parent_id)?;
        let castle_id = parent.ensure_can_breed(&self.config)?;
        Self::ensure_name(&cmd.name, "dragon")?;
        self.ensure_unused_dragon_id(cmd.baby_id)?;

        let castle = self.home_of(parent.id(), castle_id)?;
        Self::ensure_unlisted(castle, cmd.baby_id)?;

        Ok(vec![RealmEvent::DragonBorn(DragonBorn {
            parent_id: cmd.parent_id,
            dragon_id: cmd.baby_id,
            name: cmd.name.clone(),
            castle_id,
            health: self.config.default_health,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_kill(&self, cmd: &KillDragon) -> DomainResult<Vec<RealmEvent>> {
        let dragon = self.dragon_ref(cmd.dragon_id)?;
        dragon.ensure_alive()?;
        self.ensure_listed(dragon)?;

        Ok(vec![RealmEvent::DragonKilled(DragonKilled {
            dragon_id: cmd.dragon_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revive(&self, cmd: &ReviveDragon) -> DomainResult<Vec<RealmEvent>> {
        let dragon = self.dragon_ref(cmd.dragon_id)?;
        dragon.ensure_dead()?;

        if let Some(castle_id) = dragon.residence() {
            let castle = self.home_of(dragon.id(), castle_id)?;
            Self::ensure_unlisted(castle, dragon.id())?;
        }

        Ok(vec![RealmEvent::DragonRevived(DragonRevived {
            dragon_id: cmd.dragon_id,
            health: self.config.default_health,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_age(&self, cmd: &AgeDragon) -> DomainResult<Vec<RealmEvent>> {
        let dragon = self.dragon_ref(cmd.dragon_id)?;
        dragon.ensure_alive()?;
        if cmd.years == 0 {
            return Err(DomainError::validation("years cannot be zero"));
        }

        Ok(vec![RealmEvent::DragonAged(DragonAged {
            dragon_id: cmd.dragon_id,
            age: dragon.age().saturating_add(cmd.years),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_wound(&self, cmd: &WoundDragon) -> DomainResult<Vec<RealmEvent>> {
        let dragon = self.dragon_ref(cmd.dragon_id)?;
        dragon.ensure_alive()?;

        let health_before = dragon.health();
        let floor = cmd.min_health.min(health_before);
        let health_after = health_before.saturating_sub(cmd.damage).max(floor);

        let mut events = vec![RealmEvent::DragonWounded(DragonWounded {
            dragon_id: cmd.dragon_id,
            health_before,
            health_after,
            occurred_at: cmd.occurred_at,
        })];

        if health_after == 0 {
            self.ensure_listed(dragon)?;
            events.push(RealmEvent::DragonKilled(DragonKilled {
                dragon_id: cmd.dragon_id,
                occurred_at: cmd.occurred_at,
            }));
        }
        Ok(events)
    }

    fn handle_remove_castle(&self, cmd: &RemoveCastle) -> DomainResult<Vec<RealmEvent>> {
        self.castle_ref(cmd.castle_id)?;

        let evicted = self
            .dragons
            .values()
            .filter(|d| d.residence() == Some(cmd.castle_id))
            .map(Dragon::id)
            .collect();

        Ok(vec![RealmEvent::CastleRemoved(CastleRemoved {
            castle_id: cmd.castle_id,
            evicted,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_dragon(&self, cmd: &RemoveDragon) -> DomainResult<Vec<RealmEvent>> {
        let dragon = self.dragon_ref(cmd.dragon_id)?;
        self.ensure_listed(dragon)?;

        Ok(vec![RealmEvent::DragonRemoved(DragonRemoved {
            dragon_id: cmd.dragon_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
