//! Pipeline stages for GPX waypoint extraction.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ bounds ──▶ build ──▶ write
//! (read)    (1st wpt)   (optional) (tree)   (atomic file)
//! ```
//!
//! 1. [`input`]   — read one GPX file fully into memory
//! 2. [`extract`] — resolve the GPX version and pull the first top-level
//!    `<wpt>` into a [`crate::waypoint::Waypoint`]
//! 3. [`bounds`]  — enclosing rectangle of all waypoints
//! 4. [`build`]   — assemble the GPX 1.1 element tree
//! 5. [`write`]   — render with indentation and replace the output file

pub mod bounds;
pub mod build;
pub mod extract;
pub mod input;
pub mod write;
