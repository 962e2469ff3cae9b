//!
//! quarry-std-core - Core Host Types
//!
//! This crate provides the fundamental types shared across all quarry module crates:
//!
//! - `Item` for host values (null, boolean, integer, double, string, binary, object, array)
//! - `Record` for structured key/value records with stable field order
//! - `CallResult` and `RecordStream` for the result of a module call
//! - `ModuleError` for errors raised towards the host, qualified by a namespace
//! - `ExternalModule` and `ModuleContext` for dispatching calls by function name
//!
//! Modules never hand native resources to the host. Anything long-lived is
//! referred to by an opaque string token carried in an `Item::String`.
//!

pub mod args;
pub mod error;
pub mod module;
pub mod value;

pub use args::*;
pub use error::*;
pub use module::*;
pub use value::*;
