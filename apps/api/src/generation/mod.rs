// Constrained generation pipeline: prompt construction, the bounded retry loop,
// output sanitization, structure parsing and content-policy filtering.
// All LLM calls go through llm_client — nothing here talks to the model server directly.

pub mod attempt;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod platform;
pub mod policy;
pub mod prompt_builder;
pub mod prompts;
pub mod sanitizer;
pub mod structure;
