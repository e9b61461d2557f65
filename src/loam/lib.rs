//! # Loam Architecture
//!
//! Loam is a **flat-file content repository library**: collections of
//! entries, global variable sets, and taxonomies, persisted as one YAML
//! record per entity and queried in memory. There is no server, template
//! engine, or admin surface here—just the content core something like a CMS
//! would be built on.
//!
//! ## The Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Listing / Search (listing.rs, search/)                     │
//! │  - Parameterized listings for pickers and index screens     │
//! │  - Named search indexes resolved per driver                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository Layer (repo.rs, query.rs)                       │
//! │  - All mutations: lifecycle events, cascading deletes,      │
//! │    re-derived entry URIs and ordering                       │
//! │  - Owns the app context: Sites, Blink, EventBus             │
//! │  - Query builder over in-memory entry snapshots             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model Layer (model/)                                       │
//! │  - Plain values: Collection, Entry, GlobalSet, Taxonomy     │
//! │  - Computed defaults (sort cascades, titles, routes)        │
//! │  - Persistable projections with default omission            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract ContentStore trait                              │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Entities Are Values
//!
//! Model types never touch storage. Building a [`model::Collection`] does
//! nothing until [`repo::ContentRepository::save_collection`] persists it,
//! fires the lifecycle events, and invalidates memoized state. This keeps
//! every model type trivially testable and makes the repository the single
//! place where consistency rules live.
//!
//! ## Memoization Is Never Truth
//!
//! The [`blink`] cache de-duplicates derived work (structure resolution,
//! index lookups) within one unit of work. It is flushed on every relevant
//! save and must be flushed wholesale between requests—nothing reads it as
//! a source of truth.
//!
//! ## Module Overview
//!
//! - [`repo`]: The content repository—entry point for all mutations
//! - [`model`]: Core data types (`Collection`, `Entry`, `GlobalSet`, ...)
//! - [`store`]: Storage abstraction and implementations
//! - [`query`]: Predicate/sort/paginate builder over entries
//! - [`search`]: Index manager and the local/remote drivers
//! - [`listing`]: Cross-collection listings with search fallback
//! - [`blink`]: Request-scoped memoization
//! - [`sites`]: The site registry for localized content
//! - [`events`]: Lifecycle event bus
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod blink;
pub mod config;
pub mod error;
pub mod events;
pub mod listing;
pub mod model;
pub mod query;
pub mod repo;
pub mod search;
pub mod sites;
pub mod store;
