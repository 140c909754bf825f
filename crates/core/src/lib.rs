//! Core library for multiverse
//!
//! This crate implements the **Functional Core** of the multiverse application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`multiverse_core`** (this crate): Pure transformation functions with zero I/O
//! - **`multiverse`**: HTTP transport, page walking, batch fan-out and the CLI (the Imperative Shell)
//!
//! Everything here can be tested with fixture JSON. No mocking required.
//!
//! # Module Organization
//!
//! - [`kind`]: Entity kinds, their reference fields and summary projections
//! - [`reference`]: Reference URL parsing and entity identifiers
//! - [`listing`]: Paginated listing pages and next-link normalization
//! - [`batch`]: Id partitioning and batch response normalization
//! - [`hydrate`]: Reference collection, the resolution map and record hydration
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use multiverse_core::hydrate::{collect_references, hydrate, ResolutionMap};
//! use multiverse_core::kind::EntityKind;
//!
//! let references = collect_references(EntityKind::Episode, &episodes);
//! // ... resolve `references.wanted` through the shell ...
//! let map = ResolutionMap::from_parts(resolved);
//! let hydrated: Vec<_> = episodes
//!     .iter()
//!     .map(|episode| hydrate(EntityKind::Episode, episode, &map))
//!     .collect();
//! ```

pub mod batch;
pub mod hydrate;
pub mod kind;
pub mod listing;
pub mod reference;
