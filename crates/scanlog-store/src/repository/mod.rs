//! # Repository Module
//!
//! ```text
//! SessionController
//!       │  store.save_ledger(&ledger)
//!       ▼
//! SessionStore        ← typed: Ledger, BatchArchive, HeaderDraft, ScanMode
//!       │  kv.set("entries", "[...]")
//!       ▼
//! KvRepository        ← untyped: string key → string value
//!       │
//!       ▼
//! kv_store table
//! ```
//!
//! - [`kv::KvRepository`] - Raw key/value reads and writes
//! - [`session::SessionStore`] - Session state encoded on top of it

pub mod kv;
pub mod session;
