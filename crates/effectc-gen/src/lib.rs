//! Template-based shader expansion for `effectc`.
//!
//! An author writes a small `.effect` snippet: a handful of property
//! declarations plus one mandatory entry function (and optionally helpers).
//! This library parses that snippet, synthesizes the declaration blocks a
//! full shader program needs, substitutes everything into a template, and
//! records a line map so compiler diagnostics against the generated output
//! can be pointed back at the author's own lines.
//!
//! The pieces:
//!
//! * [`property`] — the line classifier: property declaration, body code,
//!   or skippable.
//! * [`validate`] — structural checks run before any generation.
//! * [`template`] — the placeholder-substitution template.
//! * [`generate`] — one generation pass producing a [`GeneratedUnit`](generate::GeneratedUnit).
//! * [`line_map`] — translating generated-output line numbers to source ones.

pub mod generate;
pub mod line_map;
pub mod property;
pub mod template;
pub mod validate;

/// Tag identifying the current generation semantics.
///
/// Bump this whenever the shape of generated output changes; every cache
/// entry records the tag it was built with and a mismatch forces a rebuild.
pub const GENERATOR_VERSION: &str = "2";
