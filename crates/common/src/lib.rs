//! Common utilities and shared types for inkwell.
//!
//! This crate provides foundational components used across all inkwell crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Slugs**: URL-safe slug derivation via [`slugify`]
//! - **Ephemeral store**: TTL key/value storage backed by Redis or memory
//!
//! # Example
//!
//! ```no_run
//! use inkwell_common::{Config, IdGenerator, AppResult, slugify};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {} for {}", id, slugify("Hello World"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod slug;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use slug::{slugify, slug_with_suffix};
pub use store::{EphemeralStore, MemoryStore, RedisStore, SharedStore};
