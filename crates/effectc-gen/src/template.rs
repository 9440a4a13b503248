//! The placeholder-substitution template.
//!
//! Templating here is deliberate plain text replacement of three fixed
//! tokens. That keeps the generated bytes exactly predictable, which the
//! line-mapping logic and the byte-level cache both depend on. The
//! substitution lives behind this narrow type so it could be swapped for a
//! structured engine without touching the rest of the pipeline.

/// Placeholder replaced with the artifact name. May occur more than once.
pub const EFFECT_NAME_PLACEHOLDER: &str = "__EFFECT_NAME__";

/// Placeholder replaced with the verbatim property declaration lines.
pub const PROPERTIES_PLACEHOLDER: &str = "__PROPERTIES__";

/// Placeholder replaced with the primitive-variable block followed by the
/// body text.
pub const BODY_PLACEHOLDER: &str = "__BODY__";

/// 1-based output line at which the body substitution begins.
///
/// This is a fixed property of the shipped template's structure, not a
/// computed value: the lines above [`BODY_PLACEHOLDER`] in
/// `assets/effect.template` never move, because the properties section sits
/// *below* the program block — so the number of properties can never shift
/// the body start.
pub const BODY_START_LINE_IN_OUTPUT: usize = 6;

/// The template shipped with the tool.
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/effect.template");

/// A shader program template with the three substitution placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    /// The raw template text.
    text: String,
}

impl Template {
    /// Returns the embedded default template.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_owned(),
        }
    }

    /// Wraps externally supplied template text.
    ///
    /// A custom template must keep its [`BODY_PLACEHOLDER`] on output line
    /// [`BODY_START_LINE_IN_OUTPUT`], since diagnostic translation treats
    /// that line number as a constant of the template structure.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` if all three placeholders are present.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        self.text.contains(EFFECT_NAME_PLACEHOLDER)
            && self.text.contains(PROPERTIES_PLACEHOLDER)
            && self.text.contains(BODY_PLACEHOLDER)
    }

    /// Substitutes the three placeholders.
    ///
    /// The name placeholder is replaced everywhere it occurs; the
    /// declarations and body placeholders are each replaced exactly once, in
    /// that order, so author-written body text is never rescanned for
    /// placeholder tokens.
    #[must_use]
    pub fn substitute(&self, effect_name: &str, declarations: &str, body: &str) -> String {
        self.text
            .replace(EFFECT_NAME_PLACEHOLDER, effect_name)
            .replacen(PROPERTIES_PLACEHOLDER, declarations, 1)
            .replacen(BODY_PLACEHOLDER, body, 1)
    }
}

impl Default for Template {
    #[inline]
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn embedded_template_has_all_placeholders() {
        assert!(Template::embedded().has_placeholders());
    }

    #[test_log::test]
    fn body_start_constant_matches_embedded_template() {
        // the constant is documented, not computed; this pins it to reality
        let placeholder_line = DEFAULT_TEMPLATE
            .lines()
            .position(|line| line.contains(BODY_PLACEHOLDER))
            .unwrap();
        assert_eq!(placeholder_line + 1, BODY_START_LINE_IN_OUTPUT);
    }

    #[test_log::test]
    fn substitution_is_literal() {
        let template = Template::from_text("head __EFFECT_NAME__\n__BODY__\n__PROPERTIES__\n");
        let output = template.substitute("Wave", "_Speed (\"Speed\", Float) = 2.5", "code");
        assert_eq!(output, "head Wave\ncode\n_Speed (\"Speed\", Float) = 2.5\n");
    }

    #[test_log::test]
    fn effect_name_replaced_everywhere() {
        let output = Template::embedded().substitute("Wave", "", "body");
        assert!(!output.contains(EFFECT_NAME_PLACEHOLDER));
        assert!(output.contains("// Effect: Wave"));
        assert!(output.contains("Program \"Wave\""));
    }

    #[test_log::test]
    fn body_text_is_not_rescanned() {
        let template = Template::from_text("__BODY__ then __PROPERTIES__");
        let output = template.substitute("x", "decls", "code __PROPERTIES__ code");
        // the token inside the body survives as literal author text
        assert_eq!(output, "code __PROPERTIES__ code then decls");
    }
}
