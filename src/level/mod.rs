//! Level loading
//!
//! A level file is a JSON [`LevelDeclaration`]. Loading validates it (warnings
//! only), sanitizes it, and parses it into a [`Level`] of runtime objects.
//! Object y-values stay relative to the ground line until the session
//! anchors them against its arena.

mod decl;
mod parse;
mod validate;

pub use decl::{LevelDeclaration, ObjectDeclaration};
pub use parse::{Bucket, Buckets, Level, LevelMetadata, load_level};
pub use validate::{LevelLoadError, ValidationWarning, WarningKind, sanitize, validate};
