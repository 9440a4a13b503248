//! Incremental build orchestration for `effectc`.
//!
//! Ties the compile cache and the code generator together into build passes
//! over a project directory: [`config`] resolves where everything lives,
//! [`collab`] defines the external import and thumbnail steps, and
//! [`orchestrator`] runs the pass itself.

pub mod collab;
pub mod config;
pub mod orchestrator;
