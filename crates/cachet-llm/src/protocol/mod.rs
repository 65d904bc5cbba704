//! Wire format types for the chat completion API
//!
//! Pure serde structs matching the provider's JSON format. They cross the
//! transport boundary, form the cache key, and are what the cache stores.

pub mod openai;
