//! Profile registry: binds language ids and file extensions to profiles.
//!
//! Registration is additive. Registering a profile whose id is already
//! present replaces the earlier profile, including its extension bindings.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::debug;

use super::languages::BUILTIN;
use super::{EntityKind, LanguageProfile};
use crate::error::ProfileError;

/// Looks up the profile responsible for a file extension or language id.
pub trait ProfileResolver: Send + Sync {
    /// Resolve an extension (with or without leading dot) or a language id.
    fn resolve(&self, key: &str) -> Option<Arc<LanguageProfile>>;

    /// All registered profiles, ordered by id.
    fn profiles(&self) -> Vec<Arc<LanguageProfile>>;
}

#[derive(Default)]
struct Bindings {
    /// Primary id -> profile.
    profiles: BTreeMap<String, Arc<LanguageProfile>>,
    /// Primary id or alias -> primary id.
    ids: HashMap<String, String>,
    /// Extension -> primary id.
    extensions: HashMap<String, String>,
}

/// Thread-safe registry of language profiles.
#[derive(Default)]
pub struct ProfileRegistry {
    bindings: RwLock<Bindings>,
}

fn normalize(key: &str) -> String {
    key.trim().trim_start_matches('.').to_ascii_lowercase()
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every built-in profile.
    pub fn with_builtin_profiles() -> Result<Self, ProfileError> {
        let registry = Self::new();
        for def in BUILTIN {
            registry.register(LanguageProfile::from_def(def)?);
        }
        Ok(registry)
    }

    /// Register a profile. Last write wins for a repeated id.
    pub fn register(&self, profile: LanguageProfile) {
        let mut bindings = self
            .bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = profile.id().to_string();

        if bindings.profiles.remove(&id).is_some() {
            debug!(language = %id, "replacing registered profile");
            bindings.ids.retain(|_, owner| *owner != id);
            bindings.extensions.retain(|_, owner| *owner != id);
        }

        bindings.ids.insert(normalize(&id), id.clone());
        for alias in profile.aliases() {
            bindings.ids.insert(normalize(alias), id.clone());
        }
        for ext in profile.extensions() {
            if let Some(previous) = bindings.extensions.insert(normalize(ext), id.clone()) {
                if previous != id {
                    debug!(extension = %ext, from = %previous, to = %id, "extension rebound");
                }
            }
        }
        bindings.profiles.insert(id, Arc::new(profile));
    }

    /// Resolve by extension first, then by language id or alias.
    pub fn resolve(&self, key: &str) -> Option<Arc<LanguageProfile>> {
        let key = normalize(key);
        let bindings = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let id = bindings
            .extensions
            .get(&key)
            .or_else(|| bindings.ids.get(&key))?;
        bindings.profiles.get(id).cloned()
    }

    pub fn profiles(&self) -> Vec<Arc<LanguageProfile>> {
        let bindings = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        bindings.profiles.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profiles
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kinds declared by exactly one registered profile, with that profile's id.
    ///
    /// These are profile-local extensions of the canonical taxonomy.
    pub fn language_specific_kinds(&self) -> BTreeMap<EntityKind, String> {
        let mut owners: BTreeMap<EntityKind, BTreeSet<&'static str>> = BTreeMap::new();
        let profiles = self.profiles();
        for profile in &profiles {
            for kind in profile.taxonomy().kinds() {
                owners.entry(kind).or_default().insert(profile.id());
            }
        }
        owners
            .into_iter()
            .filter(|(_, ids)| ids.len() == 1)
            .filter_map(|(kind, ids)| ids.into_iter().next().map(|id| (kind, id.to_string())))
            .collect()
    }
}

impl ProfileResolver for ProfileRegistry {
    fn resolve(&self, key: &str) -> Option<Arc<LanguageProfile>> {
        ProfileRegistry::resolve(self, key)
    }

    fn profiles(&self) -> Vec<Arc<LanguageProfile>> {
        ProfileRegistry::profiles(self)
    }
}

static GLOBAL: Lazy<Result<Arc<ProfileRegistry>, ProfileError>> =
    Lazy::new(|| ProfileRegistry::with_builtin_profiles().map(Arc::new));

/// The process-wide registry of built-in profiles, built on first use.
pub fn global() -> Result<Arc<ProfileRegistry>, ProfileError> {
    (*GLOBAL).clone()
}
