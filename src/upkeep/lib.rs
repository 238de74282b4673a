//! # Upkeep Architecture
//!
//! Upkeep is a **file-backed data-access layer** for maintenance records:
//! tracked objects (vehicles, facilities, equipment), the recurring services
//! planned against them, reminders, completed-work reports and fault reports.
//! It is a library that happens to ship a CLI client, not the other way round.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (binary: cli/, wired by main.rs)                 │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, carries configuration         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One repository per table: list / create / update / delete│
//! │  - Validation, id generation, timestamps                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait, CSV codec                          │
//! │  - FsBackend: per-table locks + atomic snapshot writes      │
//! │  - MemBackend: in-memory, for tests                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - A reader never sees a half-written table: snapshots are written to a
//!   temporary file, synced and renamed over the target.
//! - Each table has its own advisory lock held for the whole
//!   read-modify-write cycle, so operations on one table are serializable
//!   across threads and processes. Tables do not block each other and there
//!   are no cross-table transactions.
//! - `object_type` is normalized to a canonical category on every read and
//!   write, so legacy spellings (`Vehicles`, `equipment`) never leak out.
//! - Not-found is a `false` result, never an error. Validation errors are
//!   raised before any file is touched.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Repository logic for each table plus maintenance commands
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Record types, inputs, patches and filters
//! - [`category`]: Category normalization
//! - [`ids`]: Identifier generation
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod category;
pub mod commands;
pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod store;
