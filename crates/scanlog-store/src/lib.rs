//! # scanlog-store: Persistence for scanlog
//!
//! A string key → string value store that survives restarts, backed by
//! SQLite, plus the typed session persistence built on it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        scanlog Data Flow                                │
//! │                                                                         │
//! │  Session Controller (after every mutation)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   scanlog-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  KvRepository  │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │  SessionStore  │    │ 001_kv.sql   │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL) ── kv_store(key, value, updated_at)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanlog_store::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("scanlog.db")).await?;
//! let session = db.session().load_session(Default::default()).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::kv::KvRepository;
pub use repository::session::{keys, SessionStore};
