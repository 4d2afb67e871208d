//! Output formatting for the cmp-synth CLI
//!
//! Human-readable and JSON renderings for both commands.

use serde::Serialize;
use std::path::Path;

use cmp_synth::cmp_classfile::names::to_qualified_name;
use cmp_synth::cmp_classfile::{FieldType, MethodDescriptor};
use cmp_synth::{ClassArtifact, ParsedClass};

/// Summary line(s) for a written class
pub fn format_generated(artifact: &ClassArtifact, path: &Path, json_output: bool) -> String {
    #[derive(Serialize)]
    struct GeneratedJson<'a> {
        success: bool,
        class: &'a str,
        path: String,
        bytes: usize,
        sha256: String,
    }

    if json_output {
        let json = GeneratedJson {
            success: true,
            class: artifact.class_name(),
            path: path.display().to_string(),
            bytes: artifact.len(),
            sha256: artifact.sha256_hex(),
        };
        return serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string());
    }

    format!(
        "\x1b[32m✓ Generated {}\x1b[0m\n  Path:   {}\n  Size:   {} bytes\n  SHA256: {}",
        artifact.class_name(),
        path.display(),
        artifact.len(),
        artifact.sha256_hex()
    )
}

/// Java-like outline of a parsed class
pub fn format_class(class: &ParsedClass, show_code: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\x1b[1m{} class {}\x1b[0m",
        class.access,
        to_qualified_name(&class.this_class)
    ));
    if let Some(parent) = &class.super_class {
        out.push_str(&format!(" extends {}", to_qualified_name(parent)));
    }
    if !class.interfaces.is_empty() {
        let names: Vec<String> = class.interfaces.iter().map(|i| to_qualified_name(i)).collect();
        out.push_str(&format!(" implements {}", names.join(", ")));
    }
    out.push('\n');
    out.push_str(&format!(
        "  version {}.{}\n",
        class.version.major, class.version.minor
    ));

    // Fields
    if !class.fields.is_empty() {
        out.push_str("\n\x1b[1mFields:\x1b[0m\n");
        for field in &class.fields {
            let ty = FieldType::parse(&field.descriptor)
                .map(|t| t.java_name())
                .unwrap_or_else(|_| field.descriptor.clone());
            out.push_str(&format!("  {} {} {};\n", field.access, ty, field.name));
        }
    }

    // Methods
    if !class.methods.is_empty() {
        out.push_str("\n\x1b[1mMethods:\x1b[0m\n");
        for method in &class.methods {
            out.push_str(&format!(
                "  {} {}\n",
                method.access,
                method_signature(&method.name, &method.descriptor)
            ));
            let Some(code) = method.code.as_ref().filter(|_| show_code) else {
                continue;
            };
            out.push_str(&format!(
                "    \x1b[2mmax_stack={} max_locals={}\x1b[0m\n",
                code.max_stack, code.max_locals
            ));
            match &code.instructions {
                Some(instructions) => {
                    for insn in instructions {
                        out.push_str(&format!("      {}\n", insn));
                    }
                }
                None => out.push_str(&format!("      <{} bytes>\n", code.bytecode.len())),
            }
        }
    }

    out
}

fn method_signature(name: &str, descriptor: &str) -> String {
    let Ok(parsed) = MethodDescriptor::parse(descriptor) else {
        return format!("{}{}", name, descriptor);
    };
    let params: Vec<String> = parsed.parameters.iter().map(FieldType::java_name).collect();
    let ret = parsed
        .return_type
        .as_ref()
        .map(FieldType::java_name)
        .unwrap_or_else(|| "void".to_string());
    if name == "<init>" {
        format!("<init>({})", params.join(", "))
    } else {
        format!("{} {}({})", ret, name, params.join(", "))
    }
}
