//! # Goosebridge - Multiworld Progression Bridge
//!
//! Goosebridge keeps a running goose simulation in step with a remote
//! multiworld session: items received from the server unlock regions and
//! reveal characters and props, and goals completed in the game are reported
//! back as location checks.
//!
//! ## Features
//!
//! - **Remote Link**: line-framed TCP connection with a background reader and a lock-guarded inbox.
//! - **Progression State**: idempotent capability flags, capped counters and an at-most-once location record, persisted per slot.
//! - **Entity Resolution**: tiered fuzzy matching of scene objects onto soul buckets, fail-open for anything unrecognized.
//! - **World Binding**: declarative region gates, visibility toggles, full resync and a one-way finale lockdown.
//! - **Access Guard**: blocks entry to locked regions and returns the goose to the well.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use goosebridge::config::Config;
//! use goosebridge::link::{Credentials, RemoteLink};
//! use goosebridge::progression::SessionIdentity;
//! use goosebridge::session::SessionCoordinator;
//! use goosebridge::storage::SledKvStore;
//! use goosebridge::world::SceneWorld;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = SledKvStore::open(&config.storage.data_dir)?;
//!     let mut session = SessionCoordinator::new(store, config.session_settings());
//!
//!     let identity = SessionIdentity::new(&config.server.address, config.server.port, &config.server.slot)?;
//!     let creds = Credentials { slot: identity.slot.clone(), password: config.server.password.clone() };
//!     let link = RemoteLink::connect(&config.server.address, config.server.port, creds, &config.link.tuning())?;
//!     session.connect(identity, link)?;
//!
//!     let mut world = SceneWorld::new();
//!     loop {
//!         session.tick(&mut world);
//!         tokio::time::sleep(std::time::Duration::from_millis(16)).await;
//!     }
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`link`] - TCP connection, reader thread and line framing
//! - [`protocol`] - the server commands this bridge understands
//! - [`progression`] - capability flags, locations, persistence layout
//! - [`catalog`] - static item, goal and pickup tables
//! - [`resolver`] - scene object to soul bucket matching
//! - [`world`] - simulation interface and the in-memory [`world::SceneWorld`]
//! - [`binder`] - region gates, visibility, resync, finale
//! - [`guard`] - region transition checks
//! - [`effects`] - trap and buff timers
//! - [`session`] - the coordinator tying it all to the update tick
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   RemoteLink    │ ← reader thread, inbox
//! └─────────────────┘
//!          │  poll_inbound (update tick)
//! ┌─────────────────┐      ┌──────────────┐
//! │   Session       │ ───▶ │ AccessGuard  │
//! │   Coordinator   │      └──────────────┘
//! └─────────────────┘
//!          │
//! ┌─────────────────┐      ┌──────────────┐
//! │   WorldBinder   │ ◀─── │ EntityResolver│
//! └─────────────────┘      └──────────────┘
//!          │
//! ┌─────────────────┐
//! │   SimWorld      │ ← host simulation
//! └─────────────────┘
//! ```

pub mod binder;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod errors;
pub mod guard;
pub mod link;
pub mod logutil;
pub mod metrics;
pub mod progression;
pub mod protocol;
pub mod resolver;
pub mod session;
pub mod storage;
pub mod validation;
pub mod world;
