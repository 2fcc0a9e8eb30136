//! # HackMD CLI
//!
//! A terminal client for the HackMD REST API: authentication with named
//! credential profiles, note creation/listing/retrieval, team listing,
//! and templated note content.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (args.rs + main.rs, binary only)                 │
//! │  - Parses arguments, formats output, prompts for secrets    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Library (this crate)                                       │
//! │  - config: credential profiles in one JSON file             │
//! │  - templates: directory of {{token}} templates              │
//! │  - api + model: blocking HackMD API client                  │
//! │  - Returns structured Result types, never prints or exits   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two stores ([`config::ConfigStore`], [`templates::TemplateStore`])
//! are plain structs holding their directory; nothing in the library
//! reads ambient global state, so tests point them at temp dirs.
//!
//! ## Module Overview
//!
//! - [`api`]: HTTP client for the HackMD API
//! - [`config`]: credential profile store (`config.json`)
//! - [`templates`]: note template store and renderer
//! - [`model`]: wire data types (`User`, `Team`, `Note`)
//! - [`error`]: error types

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod templates;
