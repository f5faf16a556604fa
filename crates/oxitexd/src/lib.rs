//! LaTeX tool server over stdio.
//!
//! Library half of the `oxitexd` binary: wire types in [`protocol`], the
//! message loop in [`session`], and the tool registry in [`tools`]. Kept
//! apart from the binary so integration tests can drive whole sessions
//! through in-memory streams.

pub mod protocol;
pub mod session;
pub mod tools;
