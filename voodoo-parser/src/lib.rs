//! Variable resolution for Voodoo.
//!
//! Paths and names throughout the core are written as templates that reference
//! variables, such as `$(localroot)\shaders\$(effect).fx`. This crate resolves those
//! templates against a layered set of variables: system variables seeded once at
//! startup, transient state variables assigned within a single parse, user variables,
//! and the process environment.
//!
//! Resolution never fails. Unknown variables resolve to a `badvar:` sentinel (or to
//! nothing when suppressed), and runaway recursive definitions are cut off at
//! [`MAX_DEPTH`].
//!
//! Variables can also be loaded from definition files of `name = value` lines.

mod error;
mod flags;
mod parser;
mod token;

pub use error::*;
pub use flags::ParseFlags;
pub use parser::{ParseOutput, VariableParser, VariableScope, VariableType, MAX_DEPTH};
