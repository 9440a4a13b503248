//! The line classifier: property declaration, body code, or skippable.
//!
//! A property declaration looks like:
//!
//! ```text
//! _Speed ("Scroll Speed", Float) = 2.5
//! _MainTex ("Albedo", 2D) = "white"
//! _Fade ("Fade", Range(0, 1)) = 0.5
//! ```
//!
//! The pattern is anchored at the start of the line (ignoring leading
//! whitespace). The anchoring matters: body code samples textures through
//! the same sigil-prefixed identifiers (`tex.Sample(sampler_MainTex, uv)`),
//! and only anchored matching keeps those lines classified as body code.

use core::fmt;

/// Leading sigil every property name must start with.
pub const PROPERTY_SIGIL: char = '_';

/// The declared kind of a property, as written by the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// A scalar, e.g. `Float`.
    Float,
    /// A scalar constrained to a range in the editor, e.g. `Range(0, 1)`.
    Range,
    /// An RGBA color.
    Color,
    /// A 4-component vector.
    Vector,
    /// An integer.
    Int,
    /// A 2D texture, declared as `2D`.
    Texture2D,
    /// Anything else. Mapped to a scalar so one odd property does not sink
    /// the whole artifact.
    Unknown(String),
}

impl PropertyKind {
    /// Parses a kind keyword (without its optional argument list).
    #[must_use]
    pub fn parse(keyword: &str) -> Self {
        match keyword {
            "Float" => Self::Float,
            "Range" => Self::Range,
            "Color" => Self::Color,
            "Vector" => Self::Vector,
            "Int" => Self::Int,
            "2D" => Self::Texture2D,
            other => {
                log::warn!("unknown property kind `{other}`, mapping to float");
                Self::Unknown(other.to_owned())
            }
        }
    }

    /// Emits the primitive declaration line(s) binding this property in the
    /// generated program. Texture kinds bind both the opaque texture and its
    /// paired sampler, so they emit two lines.
    #[must_use]
    pub fn primitive_lines(&self, name: &str) -> Vec<String> {
        match self {
            Self::Float | Self::Range | Self::Unknown(_) => vec![format!("float {name};")],
            Self::Color | Self::Vector => vec![format!("float4 {name};")],
            Self::Int => vec![format!("int {name};")],
            Self::Texture2D => vec![
                format!("Texture2D {name};"),
                format!("SamplerState sampler{name};"),
            ],
        }
    }
}

impl fmt::Display for PropertyKind {
    #[inline]
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => formatter.write_str("Float"),
            Self::Range => formatter.write_str("Range"),
            Self::Color => formatter.write_str("Color"),
            Self::Vector => formatter.write_str("Vector"),
            Self::Int => formatter.write_str("Int"),
            Self::Texture2D => formatter.write_str("2D"),
            Self::Unknown(other) => formatter.write_str(other),
        }
    }
}

/// One parsed property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    /// Property name including the sigil, e.g. `_Speed`.
    pub name: String,
    /// The declared kind.
    pub kind: PropertyKind,
    /// The verbatim source line, reused unmodified in the output's
    /// declarations section.
    pub raw: String,
}

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// A property declaration.
    Property(PropertyDecl),
    /// Anything else that carries code: helper functions, the entry
    /// function, stray statements.
    Body,
    /// Blank lines and `//` comment lines, emitted into neither block.
    Skip,
}

/// Classifies one source line.
#[must_use]
pub fn classify_line(line: &str) -> LineClass {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return LineClass::Skip;
    }
    match parse_property(trimmed) {
        Some((name, kind)) => LineClass::Property(PropertyDecl {
            name,
            kind,
            raw: line.to_owned(),
        }),
        None => LineClass::Body,
    }
}

/// Attempts to parse `<sigil><identifier> ( <label>, <Kind>[(<args>)] ) =`
/// anchored at the start of the (already whitespace-trimmed) line.
fn parse_property(trimmed: &str) -> Option<(String, PropertyKind)> {
    let rest = trimmed.strip_prefix(PROPERTY_SIGIL)?;
    let ident_len = rest
        .find(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .unwrap_or(rest.len());
    if ident_len == 0 {
        return None;
    }
    let name = format!("{PROPERTY_SIGIL}{}", &rest[..ident_len]);

    let rest = rest[ident_len..].trim_start();
    let rest = rest.strip_prefix('(')?;

    // display label: quote-delimited, or everything up to the separating comma
    let rest = rest.trim_start();
    let rest = if let Some(quoted) = rest.strip_prefix('"') {
        let close = quoted.find('"')?;
        &quoted[close + 1..]
    } else {
        let comma = rest.find(',')?;
        &rest[..comma]
    };

    let rest = rest.trim_start();
    let rest = rest.strip_prefix(',')?;
    let rest = rest.trim_start();

    let keyword_len = rest
        .find(|ch: char| !ch.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    if keyword_len == 0 {
        return None;
    }
    let keyword = &rest[..keyword_len];

    // optional argument list, e.g. Range(0, 1)
    let mut rest = rest[keyword_len..].trim_start();
    if let Some(args) = rest.strip_prefix('(') {
        let close = args.find(')')?;
        rest = args[close + 1..].trim_start();
    }

    let rest = rest.strip_prefix(')')?;
    let rest = rest.trim_start();
    rest.strip_prefix('=')?;

    Some((name, PropertyKind::parse(keyword)))
}

#[cfg(test)]
mod test {
    use super::*;

    fn classify_expecting_property(line: &str) -> PropertyDecl {
        match classify_line(line) {
            LineClass::Property(decl) => decl,
            other => panic!("expected property for {line:?}, got {other:?}"),
        }
    }

    #[test_log::test]
    fn parses_float_property() {
        let decl = classify_expecting_property("_Speed (\"Speed\", Float) = 2.5");
        assert_eq!(decl.name, "_Speed");
        assert_eq!(decl.kind, PropertyKind::Float);
        assert_eq!(decl.raw, "_Speed (\"Speed\", Float) = 2.5");
    }

    #[test_log::test]
    fn parses_property_with_leading_whitespace() {
        let decl = classify_expecting_property("    _Tint (\"Tint\", Color) = (1,1,1,1)");
        assert_eq!(decl.name, "_Tint");
        assert_eq!(decl.kind, PropertyKind::Color);
        // raw keeps the author's indentation
        assert!(decl.raw.starts_with("    _Tint"));
    }

    #[test_log::test]
    fn parses_range_with_arguments() {
        let decl = classify_expecting_property("_Fade (\"Fade\", Range(0, 1)) = 0.5");
        assert_eq!(decl.kind, PropertyKind::Range);
    }

    #[test_log::test]
    fn parses_texture_kind() {
        let decl = classify_expecting_property("_MainTex (\"Albedo\", 2D) = \"white\"");
        assert_eq!(decl.kind, PropertyKind::Texture2D);
        assert_eq!(
            decl.kind.primitive_lines("_MainTex"),
            vec![
                "Texture2D _MainTex;".to_owned(),
                "SamplerState sampler_MainTex;".to_owned()
            ]
        );
    }

    #[test_log::test]
    fn unknown_kind_maps_to_float() {
        let decl = classify_expecting_property("_Odd (\"Odd\", Matrix) = 0");
        assert_eq!(decl.kind, PropertyKind::Unknown("Matrix".to_owned()));
        assert_eq!(decl.kind.primitive_lines("_Odd"), vec!["float _Odd;".to_owned()]);
    }

    #[test_log::test]
    fn sampling_call_in_body_is_not_a_property() {
        // shares the sigil-prefixed identifier syntax, but is not anchored
        // as a declaration
        let line = "    float4 c = _MainTex.Sample(sampler_MainTex, uv);";
        assert_eq!(classify_line(line), LineClass::Body);
    }

    #[test_log::test]
    fn entry_function_is_body() {
        assert_eq!(
            classify_line("float4 EffectMain() { return 0; }"),
            LineClass::Body
        );
    }

    #[test_log::test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(classify_line(""), LineClass::Skip);
        assert_eq!(classify_line("   \t  "), LineClass::Skip);
        assert_eq!(classify_line("// properties follow"), LineClass::Skip);
        assert_eq!(classify_line("   // indented comment"), LineClass::Skip);
    }

    #[test_log::test]
    fn malformed_declarations_fall_through_to_body() {
        assert_eq!(classify_line("_Speed = 2.5"), LineClass::Body);
        assert_eq!(classify_line("_ (\"x\", Float) = 1"), LineClass::Body);
        assert_eq!(classify_line("_Speed (\"Speed\" Float) = 1"), LineClass::Body);
        assert_eq!(classify_line("_Speed (\"Speed\", Float)"), LineClass::Body);
    }

    #[test_log::test]
    fn unquoted_label_is_accepted() {
        let decl = classify_expecting_property("_Gain (gain, Float) = 1");
        assert_eq!(decl.name, "_Gain");
        assert_eq!(decl.kind, PropertyKind::Float);
    }

    #[test_log::test]
    fn label_may_contain_commas_when_quoted() {
        let decl = classify_expecting_property("_Mix (\"Mix, wet/dry\", Float) = 0");
        assert_eq!(decl.name, "_Mix");
    }
}
