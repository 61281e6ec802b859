//! Domain error model.
//!
//! Every failure is a [`DomainError`] carrying one [`ErrorKind`] and, optionally,
//! the error that caused it. Callers match on [`DomainError::kind`]; the message
//! text is for humans only.

use thiserror::Error;

use crate::id::{CastleId, DragonId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Closed set of failure kinds raised by castle and dragon operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A dragon was asked to move into the castle it already lives in.
    #[error("dragon {dragon} already resides in castle {castle}")]
    SameResidence { dragon: DragonId, castle: CastleId },

    /// Reproduction attempted below the minimum breeding age.
    #[error("dragon {dragon} is too young to have a baby (age {age}, minimum {minimum})")]
    TooYoung {
        dragon: DragonId,
        age: u32,
        minimum: u32,
    },

    /// Mutation attempted on a dragon that is already dead.
    #[error("dragon {dragon} is already dead")]
    AlreadyDead { dragon: DragonId },

    /// Revival attempted on a living dragon.
    #[error("dragon {dragon} is not dead")]
    NotDead { dragon: DragonId },

    /// Reproduction attempted by a dragon with no residence.
    #[error("dragon {dragon} has no residence")]
    NotInResidence { dragon: DragonId },

    /// The dragon is already on the castle's resident list.
    #[error("castle {castle} already lists dragon {dragon} as a resident")]
    DuplicateResident { castle: CastleId, dragon: DragonId },

    /// The dragon is not on the castle's resident list.
    #[error("castle {castle} has no resident {dragon}")]
    ResidentNotFound { castle: CastleId, dragon: DragonId },

    #[error("unknown dragon {dragon}")]
    UnknownDragon { dragon: DragonId },

    #[error("unknown castle {castle}")]
    UnknownCastle { castle: CastleId },

    /// A value failed validation (e.g. blank name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Castle membership and dragon residence disagree.
    #[error("inconsistent residence state: {0}")]
    Inconsistent(String),

    /// An attack could not be applied to its target.
    #[error("attack '{attack}' failed")]
    AttackFailed { attack: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Configuration could not be loaded or is not usable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Domain-level error: a kind plus an optional chained cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct DomainError {
    kind: ErrorKind,
    #[source]
    cause: Option<Box<DomainError>>,
}

impl DomainError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, cause: None }
    }

    /// Attach the error that led to this one.
    pub fn with_cause(mut self, cause: DomainError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn cause(&self) -> Option<&DomainError> {
        self.cause.as_deref()
    }

    /// Innermost error of the cause chain (`self` when there is no cause).
    pub fn root_cause(&self) -> &DomainError {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }

    pub fn same_residence(dragon: DragonId, castle: CastleId) -> Self {
        Self::new(ErrorKind::SameResidence { dragon, castle })
    }

    pub fn too_young(dragon: DragonId, age: u32, minimum: u32) -> Self {
        Self::new(ErrorKind::TooYoung {
            dragon,
            age,
            minimum,
        })
    }

    pub fn already_dead(dragon: DragonId) -> Self {
        Self::new(ErrorKind::AlreadyDead { dragon })
    }

    pub fn not_dead(dragon: DragonId) -> Self {
        Self::new(ErrorKind::NotDead { dragon })
    }

    pub fn not_in_residence(dragon: DragonId) -> Self {
        Self::new(ErrorKind::NotInResidence { dragon })
    }

    pub fn duplicate_resident(castle: CastleId, dragon: DragonId) -> Self {
        Self::new(ErrorKind::DuplicateResident { castle, dragon })
    }

    pub fn resident_not_found(castle: CastleId, dragon: DragonId) -> Self {
        Self::new(ErrorKind::ResidentNotFound { castle, dragon })
    }

    pub fn unknown_dragon(dragon: DragonId) -> Self {
        Self::new(ErrorKind::UnknownDragon { dragon })
    }

    pub fn unknown_castle(castle: CastleId) -> Self {
        Self::new(ErrorKind::UnknownCastle { castle })
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation(msg.into()))
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Inconsistent(msg.into()))
    }

    pub fn attack_failed(attack: impl Into<String>) -> Self {
        Self::new(ErrorKind::AttackFailed {
            attack: attack.into(),
        })
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidId(msg.into()))
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(msg.into()))
    }
}

impl From<ErrorKind> for DomainError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
