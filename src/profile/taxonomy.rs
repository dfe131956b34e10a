//! Canonical entity kinds and per-language kind groupings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical kind of a structural entity.
///
/// Every supported language maps its own syntax onto this shared set.
/// Kinds without a cross-language counterpart (`label`, `lifetime`) stay in
/// the set but are only declared by the profiles that have them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Module,
    Import,
    Const,
    Function,
    Method,
    Variable,
    Struct,
    Class,
    Enum,
    Union,
    Typedef,
    Interface,
    Impl,
    Field,
    Enumerator,
    Parameter,
    Label,
    Lifetime,
}

impl EntityKind {
    pub const ALL: [EntityKind; 18] = [
        EntityKind::Module,
        EntityKind::Import,
        EntityKind::Const,
        EntityKind::Function,
        EntityKind::Method,
        EntityKind::Variable,
        EntityKind::Struct,
        EntityKind::Class,
        EntityKind::Enum,
        EntityKind::Union,
        EntityKind::Typedef,
        EntityKind::Interface,
        EntityKind::Impl,
        EntityKind::Field,
        EntityKind::Enumerator,
        EntityKind::Parameter,
        EntityKind::Label,
        EntityKind::Lifetime,
    ];

    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Module => "module",
            EntityKind::Import => "import",
            EntityKind::Const => "const",
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Variable => "variable",
            EntityKind::Struct => "struct",
            EntityKind::Class => "class",
            EntityKind::Enum => "enum",
            EntityKind::Union => "union",
            EntityKind::Typedef => "typedef",
            EntityKind::Interface => "interface",
            EntityKind::Impl => "impl",
            EntityKind::Field => "field",
            EntityKind::Enumerator => "enumerator",
            EntityKind::Parameter => "parameter",
            EntityKind::Label => "label",
            EntityKind::Lifetime => "lifetime",
        }
    }

    /// Check if this is a callable (function or method).
    pub fn is_callable(&self) -> bool {
        matches!(self, EntityKind::Function | EntityKind::Method)
    }

    /// Check if this kind declares a type.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            EntityKind::Struct
                | EntityKind::Class
                | EntityKind::Enum
                | EntityKind::Union
                | EntityKind::Typedef
                | EntityKind::Interface
                | EntityKind::Impl
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// A named, ordered group of kinds in a taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindGroup {
    pub name: &'static str,
    pub kinds: &'static [EntityKind],
}

pub const MODULES: KindGroup = KindGroup {
    name: "modules",
    kinds: &[EntityKind::Module, EntityKind::Import],
};

pub const FUNCTIONS: KindGroup = KindGroup {
    name: "functions",
    kinds: &[EntityKind::Function, EntityKind::Method],
};

/// The symbol-kind taxonomy of one language profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    groups: &'static [KindGroup],
}

impl Taxonomy {
    pub const fn new(groups: &'static [KindGroup]) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &'static [KindGroup] {
        self.groups
    }

    /// Every kind declared by this taxonomy, in group order.
    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.groups.iter().flat_map(|g| g.kinds.iter().copied())
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.kinds().any(|k| k == kind)
    }

    /// The group a kind belongs to, if declared.
    pub fn group_of(&self, kind: EntityKind) -> Option<&'static str> {
        self.groups
            .iter()
            .find(|g| g.kinds.contains(&kind))
            .map(|g| g.name)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GROUPS: &[KindGroup] = &[
        MODULES,
        KindGroup {
            name: "types",
            kinds: &[EntityKind::Struct],
        },
        KindGroup {
            name: "rust",
            kinds: &[EntityKind::Label, EntityKind::Lifetime],
        },
    ];

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>(), Ok(kind));
        }
        assert!("trait".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_taxonomy_lookup() {
        let taxonomy = Taxonomy::new(GROUPS);
        assert!(taxonomy.contains(EntityKind::Lifetime));
        assert!(!taxonomy.contains(EntityKind::Class));
        assert_eq!(taxonomy.group_of(EntityKind::Import), Some("modules"));
        assert_eq!(taxonomy.group_of(EntityKind::Label), Some("rust"));
        assert_eq!(taxonomy.kinds().count(), 5);
    }
}
