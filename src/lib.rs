//! # msgroute-rs: Connection Resolution & Routing-Table Compiler
//!
//! Compiles a hierarchical dataflow graph into per-pin dispatch tables and
//! textual routing directives. Nodes carry named pins; groups expose proxy
//! pins that are transparent to routing; buses fan messages out by name, or
//! act as an opaque hop when a filter is attached.
//!
//! ## Architecture
//!
//! - **Graph**: flat arenas of nodes, pins, pads, buses, tacks and routes
//! - **Resolver**: depth-first walk from every emitting pin to its receivers
//! - **Maintainer**: patches the tables on connect/disconnect and pin edits
//! - **Serializer**: renders the tables as one directive block per node and
//!   filtered bus
//!
//! ## Configuration
//!
//! Compiler settings (directive symbols, resolver limits) are read from
//! `config.toml` in the platform config directory under `msgroute`:
//!
//! - **Linux**: `~/.config/msgroute/`
//! - **macOS**: `~/Library/Application Support/msgroute/`
//! - **Windows**: `%APPDATA%\msgroute\`
//!
//! ## Example
//!
//! ```
//! use msgroute_rs::{CompilerConfig, GraphDocument};
//!
//! let doc = GraphDocument::from_toml_str(r#"
//!     [[nodes]]
//!     name = "Sensor"
//!     uid = "N1"
//!     pins = [{ name = "temp", direction = "output" }]
//!
//!     [[nodes]]
//!     name = "Logger"
//!     uid = "N2"
//!     pins = [{ name = "temp", direction = "input" }]
//!
//!     [[routes]]
//!     from = "N1:temp"
//!     to = "N2:temp"
//! "#)?;
//!
//! let mut engine = doc.build_engine(CompilerConfig::default())?;
//! assert_eq!(engine.directives().lines_of("N1"), vec!["temp -> temp @ N2"]);
//! # Ok::<(), msgroute_rs::MsgRouteError>(())
//! ```

pub mod config;
pub mod error;
pub mod routing;

pub use config::{CompilerConfig, DirectiveStyle, GraphDocument, ResolverSettings};
pub use error::{MsgRouteError, Result};
pub use routing::{Diagnostic, Directives, EditCommand, EditOutcome, RoutingEngine};
