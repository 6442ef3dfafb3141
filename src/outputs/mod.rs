//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`Snapshot`](crate::models::Snapshot) read by the static site
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── feed_sources.json   # articles config
//! ├── ia_sources.json     # models config
//! ├── articoli.json       # articles snapshot
//! └── ia.json             # models snapshot
//! ```

pub mod json;
