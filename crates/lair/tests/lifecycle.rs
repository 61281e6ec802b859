//! End-to-end lifecycle scenarios through the public API.

use anyhow::Result;

use wyrmhold_core::{Entity, ErrorKind};
use wyrmhold_lair::{
    Attack, AttackAction, BreedingCheck, NewCastle, NewDragon, Realm, RealmConfig,
};

fn realm() -> Realm {
    wyrmhold_observability::init();
    Realm::default()
}

#[test]
fn breeding_adult_registers_baby_in_same_castle() -> Result<()> {
    let mut realm = realm();
    let castle_a = realm.add_castle(NewCastle::named("Castle A"))?;
    let dragon = realm.spawn_dragon(NewDragon::named("Dragon").residing_in(castle_a).aged(100))?;

    let baby = realm.have_baby(dragon, "Baby")?;

    let newborn = realm.dragon(baby).expect("baby should exist");
    assert_eq!(newborn.name(), "Baby");
    assert_eq!(newborn.age(), 0);
    assert!(!newborn.is_dead());
    assert_eq!(newborn.residence(), Some(castle_a));

    let residents = realm.residents_of(castle_a)?;
    assert!(residents.contains(&dragon));
    assert!(residents.contains(&baby));
    realm.check_invariants()?;
    Ok(())
}

#[test]
fn dead_dragon_cannot_breed() -> Result<()> {
    let mut realm = realm();
    let castle_a = realm.add_castle(NewCastle::named("Castle A"))?;
    let dragon = realm.spawn_dragon(NewDragon::named("Dragon").residing_in(castle_a).dead())?;

    let err = realm.have_baby(dragon, "Baby").unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::AlreadyDead { dragon });
    Ok(())
}

#[test]
fn homeless_youngster_moves_in() -> Result<()> {
    let mut realm = realm();
    let castle_b = realm.add_castle(NewCastle::named("Castle B"))?;
    let dragon = realm.spawn_dragon(NewDragon::named("Dragon").aged(0))?;

    realm.change_residence(dragon, castle_b)?;

    assert_eq!(realm.residents_of(castle_b)?, &[dragon]);
    realm.check_invariants()?;
    Ok(())
}

#[test]
fn dead_and_homeless_breeder_error_follows_configured_order() -> Result<()> {
    let mut default_realm = realm();
    let dragon = default_realm.spawn_dragon(NewDragon::named("Dragon").dead())?;
    let err = default_realm.have_baby(dragon, "Baby").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::AlreadyDead { .. }));

    let mut residence_first = Realm::new(RealmConfig {
        breeding_checks: vec![
            BreedingCheck::Residence,
            BreedingCheck::Alive,
            BreedingCheck::Age,
        ],
        ..RealmConfig::default()
    })?;
    let dragon = residence_first.spawn_dragon(NewDragon::named("Dragon").dead())?;
    let err = residence_first.have_baby(dragon, "Baby").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NotInResidence { .. }));
    Ok(())
}

#[test]
fn a_dragon_life_story() -> Result<()> {
    let mut realm = realm();
    let home = realm.add_castle(NewCastle::named("Blackspire"))?;
    let exile = realm.add_castle(NewCastle::named("Frostholm"))?;
    let smaug = realm.spawn_dragon(NewDragon::named("Smaug").residing_in(home).aged(97))?;

    let err = realm.have_baby(smaug, "Early").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TooYoung { age: 97, .. }));

    realm.age_dragon(smaug, 3)?;
    let hatchling = realm.have_baby(smaug, "Hatchling")?;

    Attack::Banishment { destination: exile }.apply_attack(&mut realm, smaug)?;
    assert_eq!(realm.residents_of(home)?, &[hatchling]);
    assert_eq!(realm.residents_of(exile)?, &[smaug]);

    let outcome = Attack::FireBreath { power: 250 }.apply_attack(&mut realm, smaug)?;
    assert!(outcome.killed);
    assert!(realm.residents_of(exile)?.is_empty());
    realm.check_invariants()?;

    let err = realm.kill(smaug).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::AlreadyDead { .. }));

    realm.revive(smaug)?;
    assert_eq!(realm.residents_of(exile)?, &[smaug]);
    let err = realm.revive(smaug).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NotDead { .. }));

    let castle_names: Vec<&str> = realm.castles().map(|c| c.name()).collect();
    assert_eq!(castle_names.len(), 2);
    assert!(castle_names.contains(&"Frostholm"));
    realm.check_invariants()?;
    Ok(())
}

#[test]
fn errors_are_usable_through_anyhow() {
    let mut realm = realm();
    let castle = realm
        .add_castle(NewCastle::named("Castle A"))
        .expect("castle should be founded");
    let dragon = realm
        .spawn_dragon(NewDragon::named("Dragon").residing_in(castle))
        .expect("dragon should spawn");

    let result: Result<()> = realm
        .change_residence(dragon, castle)
        .map_err(anyhow::Error::from);
    let err = result.unwrap_err();

    let domain = err
        .downcast_ref::<wyrmhold_core::DomainError>()
        .expect("domain error should survive conversion");
    assert!(matches!(domain.kind(), ErrorKind::SameResidence { .. }));
}
