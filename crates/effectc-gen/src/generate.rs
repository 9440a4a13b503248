//! One generation pass: simplified source in, complete program text out.

use crate::{
    line_map::LineMap,
    property::{classify_line, LineClass, PropertyDecl},
    template::{Template, BODY_START_LINE_IN_OUTPUT},
};

/// Token whose first occurrence marks the entry function in the source.
pub const ENTRY_POINT_TOKEN: &str = "EffectMain(";

/// The transient result of one generation pass.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Parsed property declarations, in encounter order.
    pub properties: Vec<PropertyDecl>,
    /// The body text: every non-blank, non-comment, non-property line,
    /// concatenated in order.
    pub body: String,
    /// The complete generated program text.
    pub output: String,
    /// Line mapping for diagnostics against `output`.
    pub line_map: LineMap,
}

/// Expands a simplified source into a complete program.
///
/// Property lines become [`PropertyDecl`]s in encounter order; everything
/// else that is not blank or a comment becomes body text. The output is the
/// template with the effect name, the verbatim declarations block, and the
/// primitive-variable block plus body substituted in.
///
/// Callers are expected to run [`validate`](crate::validate::validate)
/// first; generation is lenient about unknown property kinds but cannot
/// produce a line map without an entry function.
///
/// # Errors
///
/// Returns [`GenerateError::MissingEntryPoint`] if no source line contains
/// the entry-point call-site token.
pub fn generate(
    source: &str,
    artifact_name: &str,
    template: &Template,
) -> Result<GeneratedUnit, GenerateError> {
    let mut properties = Vec::new();
    let mut body_lines = Vec::new();
    let mut entry_line = None;

    for (index, line) in source.lines().enumerate() {
        if entry_line.is_none() && line.contains(ENTRY_POINT_TOKEN) {
            entry_line = Some(index + 1);
        }
        match classify_line(line) {
            LineClass::Property(decl) => properties.push(decl),
            LineClass::Body => body_lines.push(line),
            LineClass::Skip => {}
        }
    }

    let entry_fn_start_line_in_source =
        entry_line.ok_or(GenerateError::MissingEntryPoint)?;

    let declarations = properties
        .iter()
        .map(|decl| decl.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let primitives: Vec<String> = properties
        .iter()
        .flat_map(|decl| decl.kind.primitive_lines(&decl.name))
        .collect();

    let body = body_lines.join("\n");
    let body_block = if primitives.is_empty() {
        body.clone()
    } else {
        format!("{}\n{body}", primitives.join("\n"))
    };

    let output = template.substitute(artifact_name, &declarations, &body_block);
    let line_map = LineMap {
        body_start_line_in_output: BODY_START_LINE_IN_OUTPUT,
        declaration_line_count: primitives.len(),
        entry_fn_start_line_in_source,
    };

    log::debug!(
        "generated `{artifact_name}`: {} properties, {} primitive lines, entry at source line {}",
        properties.len(),
        primitives.len(),
        entry_fn_start_line_in_source
    );

    Ok(GeneratedUnit {
        properties,
        body,
        output,
        line_map,
    })
}

/// An error indicating that a generation pass failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// No source line contains the entry-point token, so no line map can be
    /// produced.
    #[error("no line contains the entry point `{ENTRY_POINT_TOKEN}`")]
    MissingEntryPoint,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{line_map::Mapped, property::PropertyKind};

    #[test_log::test]
    fn expands_the_minimal_example() {
        let source = "_Speed (\"Speed\", Float) = 2.5\nfloat4 EffectMain(){ return 0; }";
        let unit = generate(source, "Wave", &Template::embedded()).unwrap();

        assert_eq!(unit.properties.len(), 1);
        assert_eq!(unit.properties[0].name, "_Speed");
        assert_eq!(unit.properties[0].kind, PropertyKind::Float);
        assert_eq!(unit.body, "float4 EffectMain(){ return 0; }");

        // the scalar declaration sits immediately before the body
        let lines: Vec<&str> = unit.output.lines().collect();
        let body_start = unit.line_map.body_start_line_in_output;
        assert_eq!(lines[body_start - 1], "float _Speed;");
        assert_eq!(lines[body_start], "float4 EffectMain(){ return 0; }");

        // and the verbatim declaration appears in the properties section
        assert!(unit.output.contains("_Speed (\"Speed\", Float) = 2.5"));
        assert!(unit.output.contains("Program \"Wave\""));
    }

    #[test_log::test]
    fn boundary_line_translates_to_entry_function() {
        let source = "_Speed (\"Speed\", Float) = 2.5\nfloat4 EffectMain(){ return 0; }";
        let unit = generate(source, "Wave", &Template::embedded()).unwrap();
        let map = unit.line_map;
        assert_eq!(
            map.translate(map.body_start_line_in_output + map.declaration_line_count),
            Mapped::Source(2)
        );
    }

    #[test_log::test]
    fn texture_property_counts_two_declaration_lines() {
        let source = "_MainTex (\"Albedo\", 2D) = \"white\"\nfloat4 EffectMain(){ return 0; }";
        let unit = generate(source, "Tex", &Template::embedded()).unwrap();
        assert_eq!(unit.line_map.declaration_line_count, 2);
        assert!(unit.output.contains("Texture2D _MainTex;"));
        assert!(unit.output.contains("SamplerState sampler_MainTex;"));
    }

    #[test_log::test]
    fn properties_keep_encounter_order() {
        let source = concat!(
            "_B (\"B\", Float) = 1\n",
            "_A (\"A\", Int) = 2\n",
            "float4 EffectMain(){ return 0; }\n",
        );
        let unit = generate(source, "Order", &Template::embedded()).unwrap();
        let names: Vec<&str> = unit
            .properties
            .iter()
            .map(|decl| decl.name.as_str())
            .collect();
        assert_eq!(names, ["_B", "_A"]);

        let b_pos = unit.output.find("float _B;").unwrap();
        let a_pos = unit.output.find("int _A;").unwrap();
        assert!(b_pos < a_pos);
    }

    #[test_log::test]
    fn comments_and_blanks_reach_neither_block() {
        let source = concat!(
            "// scroll speed\n",
            "_Speed (\"Speed\", Float) = 2.5\n",
            "\n",
            "float4 EffectMain(){ return _Speed; }\n",
        );
        let unit = generate(source, "Wave", &Template::embedded()).unwrap();
        assert_eq!(unit.body, "float4 EffectMain(){ return _Speed; }");
        assert!(!unit.output.contains("// scroll speed"));
    }

    #[test_log::test]
    fn helper_functions_stay_in_body_order() {
        let source = concat!(
            "float4 Helper(){ return 1; }\n",
            "float4 EffectMain(){ return Helper(); }\n",
        );
        let unit = generate(source, "Helpers", &Template::embedded()).unwrap();
        assert_eq!(
            unit.body,
            "float4 Helper(){ return 1; }\nfloat4 EffectMain(){ return Helper(); }"
        );
        // entry line is the second source line
        assert_eq!(unit.line_map.entry_fn_start_line_in_source, 2);
    }

    #[test_log::test]
    fn missing_entry_point_is_an_error() {
        let source = "_Speed (\"Speed\", Float) = 2.5\n";
        let err = generate(source, "NoEntry", &Template::embedded()).unwrap_err();
        assert_eq!(err, GenerateError::MissingEntryPoint);
    }

    #[test_log::test]
    fn output_is_byte_reproducible() {
        let source = "_Speed (\"Speed\", Float) = 2.5\nfloat4 EffectMain(){ return 0; }";
        let first = generate(source, "Wave", &Template::embedded()).unwrap();
        let second = generate(source, "Wave", &Template::embedded()).unwrap();
        assert_eq!(first.output, second.output);
    }
}
