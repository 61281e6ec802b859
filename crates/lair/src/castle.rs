use serde::{Deserialize, Serialize};

use wyrmhold_core::{CastleId, DomainError, DomainResult, DragonId, Entity};

/// Construction input for a castle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCastle {
    pub name: String,
}

impl NewCastle {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A residence: owns the ordered membership list of the dragons living in it.
///
/// Residents are kept in arrival order and never repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Castle {
    id: CastleId,
    name: String,
    residents: Vec<DragonId>,
}

impl Castle {
    pub fn new(id: CastleId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("castle name cannot be empty"));
        }
        Ok(Self::founded(id, name))
    }

    pub(crate) fn founded(id: CastleId, name: String) -> Self {
        Self {
            id,
            name,
            residents: Vec::new(),
        }
    }

    /// Residents in arrival order.
    pub fn residents(&self) -> &[DragonId] {
        &self.residents
    }

    pub fn contains(&self, dragon: DragonId) -> bool {
        self.residents.contains(&dragon)
    }

    pub fn add_resident(&mut self, dragon: DragonId) -> DomainResult<()> {
        self.ensure_absent(dragon)?;
        self.residents.push(dragon);
        Ok(())
    }

    pub fn remove_resident(&mut self, dragon: DragonId) -> DomainResult<()> {
        self.ensure_present(dragon)?;
        self.residents.retain(|d| *d != dragon);
        Ok(())
    }

    pub(crate) fn ensure_present(&self, dragon: DragonId) -> DomainResult<()> {
        if self.contains(dragon) {
            Ok(())
        } else {
            Err(DomainError::resident_not_found(self.id, dragon))
        }
    }

    pub(crate) fn ensure_absent(&self, dragon: DragonId) -> DomainResult<()> {
        if self.contains(dragon) {
            Err(DomainError::duplicate_resident(self.id, dragon))
        } else {
            Ok(())
        }
    }
}

impl Entity for Castle {
    type Id = CastleId;

    fn id(&self) -> CastleId {
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

    fn castle() -> Castle {
        Castle::new(CastleId::new(), "Blackspire").unwrap()
    }

    #[test]
    fn rejects_blank_name() {
        let err = Castle::new(CastleId::new(), "  ").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Validation(_)));
    }

    #[test]
    fn residents_keep_arrival_order() {
        let mut castle = castle();
        let (a, b, c) = (DragonId::new(), DragonId::new(), DragonId::new());
        castle.add_resident(b).unwrap();
        castle.add_resident(a).unwrap();
        castle.add_resident(c).unwrap();
        assert_eq!(castle.residents(), &[b, a, c]);
    }

    #[test]
    fn add_resident_rejects_duplicate() {
        let mut castle = castle();
        let dragon = DragonId::new();
        castle.add_resident(dragon).unwrap();

        let err = castle.add_resident(dragon).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::DuplicateResident {
                castle: castle.id(),
                dragon
            }
        );
        assert_eq!(castle.residents().len(), 1);
    }

    #[test]
    fn remove_resident_rejects_stranger() {
        let mut castle = castle();
        let err = castle.remove_resident(DragonId::new()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ResidentNotFound { .. }));
    }

    #[test]
    fn remove_resident_preserves_order_of_others() {
        let mut castle = castle();
        let (a, b, c) = (DragonId::new(), DragonId::new(), DragonId::new());
        for d in [a, b, c] {
            castle.add_resident(d).unwrap();
        }
        castle.remove_resident(b).unwrap();
        assert_eq!(castle.residents(), &[a, c]);
        assert!(!castle.contains(b));
    }
}
