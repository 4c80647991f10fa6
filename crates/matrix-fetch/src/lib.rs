//! Fetch engine backed by the external `nvchecker` program
//!
//! The merged configuration is written out as an nvchecker TOML file in a
//! scratch directory, together with an "old versions" file seeded from the
//! baseline. nvchecker is run once and its "new versions" file is read back.

pub mod error;
pub mod nvchecker;
pub mod verfile;

pub use error::{FetchError, Result};
pub use nvchecker::NvcheckerEngine;
