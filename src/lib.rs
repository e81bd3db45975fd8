//! # libcat
//!
//! Client for a library catalog backed by an RDF ontology.
//!
//! The backend exposes a small JSON API: the book catalog, an ontology graph, borrow and return
//! operations, per-entity details, generated descriptions, a chat assistant and a SPARQL
//! passthrough. This crate holds the typed client for that API together with the presentation
//! logic of the pages built on it.
//!
//! ## Architecture
//!
//! - **[`api`]**: request/response types and the [`api::ApiTransport`] seam.
//! - **[`model`]**: wire types (`Book`, `Entity`, `OntologyGraph`, ...).
//! - **[`catalog`]**, **[`graph`]**, **[`forms`]**, **[`page`]**: the catalog page.
//! - **[`resolver`]**, **[`description`]**, **[`viewer`]**: the entity detail page.
//! - **[`chat`]**: the chat widget.
//! - **[`sparql`]**: the SPARQL console.
//! - **`wasm`** (feature `wasm`): DOM surfaces and `fetch` transport for the browser.
//!
//! Page controllers never touch the DOM directly. Each draws through a surface trait
//! ([`page::CatalogSurface`], [`viewer::ViewerSurface`], [`chat::ChatSurface`],
//! [`sparql::SparqlSurface`]) so the same logic drives the browser, the `libcat` CLI and tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "bin", not(target_arch = "wasm32")))]
//! # async fn run() -> Result<(), libcat::CatalogError> {
//! use libcat::{api::{native::HttpTransport, ApiClient}, config::ClientConfig};
//!
//! let config = ClientConfig::default();
//! let client = ApiClient::new(HttpTransport::new(&config)?);
//! for book in client.books().await?.books {
//!     println!("{} {}", book.id, book.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod description;
pub mod error;
pub mod forms;
pub mod graph;
pub mod html;
pub mod model;
pub mod page;
pub mod resolver;
pub mod sparql;
#[cfg(test)]
mod tests;
pub mod ui;
pub mod viewer;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::*;
