//! Translation of generated-output line numbers back to source lines.
//!
//! A [`LineMap`] is produced by every generation pass and threaded
//! explicitly to whoever reports diagnostics — there is no shared
//! "last mapping" state.

/// Line-number mapping from one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMap {
    /// 1-based output line at which the body substitution begins. Fixed by
    /// the template structure.
    pub body_start_line_in_output: usize,
    /// Number of synthesized primitive-variable lines injected immediately
    /// before the body text. Texture properties contribute two lines each.
    pub declaration_line_count: usize,
    /// 1-based line of the entry-function signature in the original source.
    pub entry_fn_start_line_in_source: usize,
}

/// Result of translating one output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapped {
    /// The line lies in template boilerplate above the body; there is no
    /// author-written counterpart.
    Boilerplate,
    /// The line lies in the synthesized primitive-variable block; line 1 of
    /// the source is the best available anchor.
    Declarations,
    /// The line maps to this 1-based source line.
    Source(usize),
}

impl Mapped {
    /// Collapses the translation to a plain line number: `0` for
    /// unmappable boilerplate, `1` for the synthesized declaration block,
    /// the mapped line otherwise.
    #[must_use]
    pub const fn source_line(self) -> usize {
        match self {
            Self::Boilerplate => 0,
            Self::Declarations => 1,
            Self::Source(line) => line,
        }
    }
}

impl LineMap {
    /// Translates a 1-based line number in the generated output to a
    /// position in the original simplified source.
    #[must_use]
    pub fn translate(&self, output_line: usize) -> Mapped {
        if output_line < self.body_start_line_in_output {
            return Mapped::Boilerplate;
        }
        let from_body_start = output_line - self.body_start_line_in_output;
        if from_body_start < self.declaration_line_count {
            return Mapped::Declarations;
        }
        let offset = from_body_start - self.declaration_line_count;
        Mapped::Source(self.entry_fn_start_line_in_source + offset)
    }
}

/// Translates through `map` when one is available.
///
/// When no generation has happened yet there is nothing to translate with;
/// the line is passed through unchanged with a warning, as a degraded but
/// non-crashing fallback.
#[must_use]
pub fn translate_or_passthrough(map: Option<&LineMap>, output_line: usize) -> usize {
    match map {
        Some(map) => map.translate(output_line).source_line(),
        None => {
            log::warn!("no line map available, passing line {output_line} through untranslated");
            output_line
        }
    }
}
