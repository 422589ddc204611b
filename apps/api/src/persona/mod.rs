// Persona profiles and the lookup collaborator that resolves them.
// Profiles are read-only for the lifetime of a request.

pub mod models;
pub mod store;

pub use models::PersonaProfile;
pub use store::{resolve_persona, InMemoryPersonaStore, PersonaStore};
