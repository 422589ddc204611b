//! Persona lookup collaborator.
//!
//! `PersonaStore` is the seam to whatever persistence owns personas. The service ships
//! with `InMemoryPersonaStore`, optionally seeded from a JSON file at startup.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::persona::models::PersonaProfile;

/// Looks up a persona by id, optionally scoped to an owner.
///
/// `Ok(None)` means "not found"; callers fall back to the neutral default profile.
#[async_trait]
pub trait PersonaStore: Send + Sync {
    async fn find(
        &self,
        persona_id: &str,
        owner_id: Option<&str>,
    ) -> Result<Option<PersonaProfile>, AppError>;
}

/// One record in a personas JSON file: the profile plus an optional owner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPersona {
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(flatten)]
    profile: PersonaProfile,
}

#[derive(Debug, Default)]
pub struct InMemoryPersonaStore {
    personas: HashMap<String, StoredPersona>,
}

impl InMemoryPersonaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: PersonaProfile, owner_id: Option<String>) {
        self.personas
            .insert(profile.id.clone(), StoredPersona { owner_id, profile });
    }

    /// Loads a JSON array of persona records (`{"ownerId"?, ...profile}`).
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read personas file {}", path.display()))?;
        let records: Vec<StoredPersona> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid personas JSON in {}", path.display()))?;

        let mut store = Self::new();
        for record in records {
            store.personas.insert(record.profile.id.clone(), record);
        }
        info!("Loaded {} personas from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }
}

#[async_trait]
impl PersonaStore for InMemoryPersonaStore {
    async fn find(
        &self,
        persona_id: &str,
        owner_id: Option<&str>,
    ) -> Result<Option<PersonaProfile>, AppError> {
        let Some(stored) = self.personas.get(persona_id) else {
            return Ok(None);
        };

        // An owner-scoped lookup must not see another owner's persona.
        if let (Some(wanted), Some(actual)) = (owner_id, stored.owner_id.as_deref()) {
            if wanted != actual {
                return Ok(None);
            }
        }

        Ok(Some(stored.profile.clone()))
    }
}

/// Resolves the persona for a request. Never fails: a missing id, a miss, or a lookup
/// error all yield `PersonaProfile::neutral_default()`.
pub async fn resolve_persona(
    store: &dyn PersonaStore,
    persona_id: Option<&str>,
    owner_id: Option<&str>,
) -> PersonaProfile {
    let Some(persona_id) = persona_id else {
        return PersonaProfile::neutral_default();
    };

    match store.find(persona_id, owner_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            info!(persona_id, "Persona not found, using neutral default");
            PersonaProfile::neutral_default()
        }
        Err(e) => {
            warn!(persona_id, "Persona lookup failed, using neutral default: {e}");
            PersonaProfile::neutral_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::persona::models::DEFAULT_PERSONA_ID;

    fn profile(id: &str) -> PersonaProfile {
        PersonaProfile {
            id: id.to_string(),
            name: format!("Persona {id}"),
            ..PersonaProfile::neutral_default()
        }
    }

    struct FailingStore;

    #[async_trait]
    impl PersonaStore for FailingStore {
        async fn find(
            &self,
            _persona_id: &str,
            _owner_id: Option<&str>,
        ) -> Result<Option<PersonaProfile>, AppError> {
            Err(AppError::Internal(anyhow::anyhow!("connection refused")))
        }
    }

    #[tokio::test]
    async fn test_find_returns_stored_profile() {
        let mut store = InMemoryPersonaStore::new();
        store.insert(profile("p-1"), None);
        let found = store.find("p-1", None).await.unwrap();
        assert_eq!(found.unwrap().id, "p-1");
    }

    #[tokio::test]
    async fn test_owner_mismatch_is_not_found() {
        let mut store = InMemoryPersonaStore::new();
        store.insert(profile("p-1"), Some("alice".to_string()));
        assert!(store.find("p-1", Some("bob")).await.unwrap().is_none());
        assert!(store.find("p-1", Some("alice")).await.unwrap().is_some());
        assert!(store.find("p-1", None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_resolve_missing_persona_synthesizes_default() {
        let store = InMemoryPersonaStore::new();
        let resolved = resolve_persona(&store, Some("nope"), None).await;
        assert_eq!(resolved.id, DEFAULT_PERSONA_ID);
    }

    #[tokio::test]
    async fn test_resolve_without_id_uses_default() {
        let mut store = InMemoryPersonaStore::new();
        store.insert(profile("p-1"), None);
        let resolved = resolve_persona(&store, None, None).await;
        assert_eq!(resolved.id, DEFAULT_PERSONA_ID);
    }

    #[tokio::test]
    async fn test_resolve_recovers_from_lookup_error() {
        let resolved = resolve_persona(&FailingStore, Some("p-1"), None).await;
        assert_eq!(resolved.id, DEFAULT_PERSONA_ID);
    }

    #[tokio::test]
    async fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "founder", "name": "Founder", "donts": ["synergy"], "ownerId": "u-1"}},
                {{"id": "coach", "name": "Coach", "cadence": "detailed"}}
            ]"#
        )
        .unwrap();

        let store = InMemoryPersonaStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        let founder = store.find("founder", Some("u-1")).await.unwrap().unwrap();
        assert_eq!(founder.donts, vec!["synergy".to_string()]);
        assert!(store.find("founder", Some("u-2")).await.unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(InMemoryPersonaStore::from_json_file(file.path()).is_err());
    }
}
