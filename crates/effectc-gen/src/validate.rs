//! Structural validation of simplified source, run before any generation.

/// Exact token sequence the mandatory entry point must be declared with.
pub const ENTRY_POINT_SIGNATURE: &str = "float4 EffectMain";

/// Checks a simplified source for structural soundness.
///
/// Validation is strict about structure (a missing entry point or unbalanced
/// braces cannot produce a compilable program) while `generate` stays lenient
/// about content-level oddities like unknown property kinds.
///
/// # Errors
///
/// * [`ValidateError::EmptySource`] if the source is empty or whitespace.
/// * [`ValidateError::MissingEntryFunction`] if the entry-point signature
///   token is absent, regardless of brace balance.
/// * [`ValidateError::UnbalancedBraces`] if the running brace counter goes
///   negative at any prefix or ends non-zero.
pub fn validate(source: &str) -> Result<(), ValidateError> {
    if source.trim().is_empty() {
        return Err(ValidateError::EmptySource);
    }
    if !source.contains(ENTRY_POINT_SIGNATURE) {
        return Err(ValidateError::MissingEntryFunction);
    }

    let mut depth: i64 = 0;
    for ch in source.chars() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ValidateError::UnbalancedBraces { depth });
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ValidateError::UnbalancedBraces { depth });
    }
    Ok(())
}

/// An error indicating that a simplified source is structurally malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidateError {
    /// The source is empty or contains only whitespace.
    #[error("empty source")]
    EmptySource,
    /// The mandatory entry-function signature is absent.
    #[error("missing entry function `{ENTRY_POINT_SIGNATURE}`")]
    MissingEntryFunction,
    /// Braces do not balance across the source.
    #[error("unbalanced braces (final depth {depth})")]
    UnbalancedBraces {
        /// The running counter value at the point of failure.
        depth: i64,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn accepts_minimal_source() {
        let source = "_Speed (\"Speed\", Float) = 2.5\nfloat4 EffectMain() { return 0; }\n";
        assert_eq!(validate(source), Ok(()));
    }

    #[test_log::test]
    fn rejects_empty_source() {
        assert_eq!(validate(""), Err(ValidateError::EmptySource));
        assert_eq!(validate("  \n\t \n"), Err(ValidateError::EmptySource));
    }

    #[test_log::test]
    fn rejects_missing_entry_function() {
        let source = "float4 Helper() { return 1; }\n";
        assert_eq!(validate(source), Err(ValidateError::MissingEntryFunction));
    }

    #[test_log::test]
    fn missing_entry_reported_even_with_bad_braces() {
        let source = "float4 Helper() {{ return 1; }\n";
        assert_eq!(validate(source), Err(ValidateError::MissingEntryFunction));
    }

    #[test_log::test]
    fn rejects_unclosed_brace() {
        let source = "float4 EffectMain() { return 0;\n";
        assert_eq!(
            validate(source),
            Err(ValidateError::UnbalancedBraces { depth: 1 })
        );
    }

    #[test_log::test]
    fn rejects_negative_prefix_even_if_total_balances() {
        // one closing brace too early, later "balanced" again
        let source = "float4 EffectMain() } return 0; {\n";
        assert_eq!(
            validate(source),
            Err(ValidateError::UnbalancedBraces { depth: -1 })
        );
    }

    #[test_log::test]
    fn nested_braces_balance() {
        let source = "float4 EffectMain() { if (x) { return 1; } return 0; }\n";
        assert_eq!(validate(source), Ok(()));
    }
}
