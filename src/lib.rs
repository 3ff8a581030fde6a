//! # Lifelog Harness
//!
//! A read-only browser for a personal lifelog kept as daily JSONL files
//! on a static file host.
//!
//! Lifelog Harness discovers which day files exist (directory-listing
//! scraping, with an `index.json` manifest fast path), fetches them in
//! bounded concurrent batches, and renders the result as an incrementally
//! paginated timeline grouped by calendar day.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//! │  Resolver    │──▶│   Loader    │──▶│  Filter +    │
//! │ index.json / │   │ 20-per-batch│   │  Timeline    │
//! │ HTML listing │   │  fetch+parse│   │  render      │
//! └──────────────┘   └─────────────┘   └──────┬───────┘
//!         ▲                 ▲                 │
//!         └─────── Session (caches, generation counter)
//!                                             ▼
//!                                       ┌──────────┐
//!                                       │   CLI    │
//!                                       │  (llg)   │
//!                                       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! llg index                         # discover the reachable file index
//! llg timeline --days 7             # render the last week
//! llg timeline --filter "deploy"    # case-insensitive text filter
//! llg timeline --jump 2024-03-01    # render chunks up to a date
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`date`] | Date-range ↔ file-key codec |
//! | [`listing`] | Directory-listing scraping |
//! | [`fetch`] | HTTP seam |
//! | [`resolver`] | File-index discovery with fallback chain |
//! | [`loader`] | Batched day-file loading |
//! | [`jsonl`] | Line-delimited JSON parsing |
//! | [`filter`] | Entry filtering and ordering |
//! | [`render`] | Incremental timeline render state |
//! | [`session`] | Session-scoped caches and load orchestration |
//! | [`status`] | Load status reporting |

pub mod config;
pub mod date;
pub mod fetch;
pub mod filter;
pub mod jsonl;
pub mod listing;
pub mod loader;
pub mod models;
pub mod render;
pub mod resolver;
pub mod session;
pub mod status;
