//! Declaration modifier flags
//!
//! Flags carry both the modifiers written in source and the ones the
//! language implies (interface members are public, enum constants are
//! public enum members).

use bitflags::bitflags;
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::syntax::{Modifier, Modifiers};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const SYNCHRONIZED = 1 << 5;
        const VOLATILE = 1 << 6;
        const TRANSIENT = 1 << 7;
        const NATIVE = 1 << 8;
        const INTERFACE = 1 << 9;
        const ABSTRACT = 1 << 10;
        const STRICTFP = 1 << 11;
        const ANNOTATION = 1 << 13;
        const ENUM = 1 << 14;
        const DEFAULT = 1 << 16;
    }
}

impl Flags {
    pub const ACCESS_FLAGS: Flags = Flags::PUBLIC
        .union(Flags::PRIVATE)
        .union(Flags::PROTECTED);

    /// Flags written in source. `sealed` and `non-sealed` have no flag.
    pub fn from_modifiers(modifiers: &Modifiers) -> Self {
        modifiers
            .keywords
            .iter()
            .fold(Flags::empty(), |flags, modifier| {
                flags | Flags::from_modifier(*modifier)
            })
    }

    fn from_modifier(modifier: Modifier) -> Self {
        match modifier {
            Modifier::Public => Flags::PUBLIC,
            Modifier::Protected => Flags::PROTECTED,
            Modifier::Private => Flags::PRIVATE,
            Modifier::Abstract => Flags::ABSTRACT,
            Modifier::Static => Flags::STATIC,
            Modifier::Final => Flags::FINAL,
            Modifier::Strictfp => Flags::STRICTFP,
            Modifier::Default => Flags::DEFAULT,
            Modifier::Synchronized => Flags::SYNCHRONIZED,
            Modifier::Native => Flags::NATIVE,
            Modifier::Transient => Flags::TRANSIENT,
            Modifier::Volatile => Flags::VOLATILE,
            Modifier::Sealed | Modifier::NonSealed => Flags::empty(),
        }
    }

    pub fn access(self) -> Flags {
        self & Flags::ACCESS_FLAGS
    }

    /// Adds `PUBLIC` unless a visibility modifier is already present.
    pub fn with_implicit_public(self) -> Flags {
        if self.intersects(Flags::ACCESS_FLAGS) {
            self
        } else {
            self | Flags::PUBLIC
        }
    }
}

impl Serialize for Flags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names: Vec<String> = self
            .iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in &names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}
