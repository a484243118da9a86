//! Cloud side of the certificate studio.
//!
//! The [`designer`] crate owns the interactive editor; this crate persists
//! what it produces and provisions generated backgrounds. Templates live in
//! a remote document store and their uploaded images in a blob store, both
//! behind async traits so the repository runs unchanged against Firebase or
//! the in-memory adapters used in tests.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`state`] | [`state::AppState`] composition root and request gating |
//! | [`services`] | Template repository and background provisioning |
//! | [`model`] | Template, visibility and requester types; persisted record shape |
//! | [`store`] | Document and blob store ports plus in-memory adapters |
//! | [`firebase`] | Firestore and Firebase Storage REST adapters |
//! | [`imagegen`] | Text-to-image client |
//! | [`data_url`] | Inline `data:` image codec |
//! | [`error`] | Error classes shared by every service error |
//! | [`config`] | Environment variable helpers |

pub mod config;
pub mod data_url;
pub mod error;
pub mod firebase;
pub mod imagegen;
pub mod model;
pub mod services;
pub mod state;
pub mod store;
