//! Build script for sagekit-resources.
//!
//! Compiles every `schema/*.toml` resource description into a Rust source
//! file in `OUT_DIR` holding the static field table, the resource schema, and
//! the snapshot struct with one tri-state field per attribute.
//!
//! Note: Build scripts require `std::env::var` and `println!` for cargo integration,
//! so we allow these disallowed items here.
#![allow(clippy::disallowed_methods)]
#![allow(clippy::disallowed_macros)]

use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SchemaFile {
    resource: ResourceSection,
    #[serde(rename = "field", default)]
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
struct ResourceSection {
    name: String,
    identifier: String,
    arn: String,
    status: String,
    failure_reason: String,
    list_key: String,
    operations: Operations,
}

#[derive(Debug, Deserialize)]
struct Operations {
    create: String,
    describe: String,
    list: String,
    update: String,
    stop: String,
    delete: String,
}

#[derive(Debug, Deserialize)]
struct FieldSpec {
    name: String,
    wire: String,
    #[serde(rename = "type")]
    rust_type: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    updatable: bool,
}

/// `TrainingJob` -> `TRAINING_JOB`
fn upper_snake(name: &str) -> String {
    let mut out = String::new();
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(ch.to_ascii_uppercase());
    }
    out
}

fn check(schema: &SchemaFile, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let wires: Vec<&str> = schema.fields.iter().map(|f| f.wire.as_str()).collect();
    let resource = &schema.resource;
    for key in [&resource.identifier, &resource.arn, &resource.status, &resource.failure_reason] {
        if !wires.contains(&key.as_str()) {
            return Err(format!("{}: resource key {key} has no matching [[field]]", path.display()).into());
        }
    }
    let mut seen = std::collections::BTreeSet::new();
    for f in &schema.fields {
        if !seen.insert(f.name.as_str()) {
            return Err(format!("{}: duplicate field {}", path.display(), f.name).into());
        }
    }
    Ok(())
}

fn generate(schema: &SchemaFile, source: &str) -> Result<String, std::fmt::Error> {
    let r = &schema.resource;
    let prefix = upper_snake(&r.name);
    let mut out = String::new();

    writeln!(out, "// @generated by sagekit-resources/build.rs from {source}. Do not edit.")?;
    writeln!(out)?;

    writeln!(out, "/// Attribute table for `{}`.", r.name)?;
    writeln!(out, "pub const {prefix}_FIELDS: &[FieldDescriptor] = &[")?;
    for f in &schema.fields {
        writeln!(
            out,
            "    FieldDescriptor {{ name: {:?}, wire_name: {:?}, rust_type: {:?}, required: {}, updatable: {} }},",
            f.name, f.wire, f.rust_type, f.required, f.updatable
        )?;
    }
    writeln!(out, "];")?;
    writeln!(out)?;

    let o = &r.operations;
    writeln!(out, "/// Operation names and key attributes for `{}`.", r.name)?;
    writeln!(out, "pub static {prefix}_SCHEMA: ResourceSchema = ResourceSchema {{")?;
    writeln!(out, "    type_name: {:?},", r.name)?;
    writeln!(out, "    identifier: {:?},", r.identifier)?;
    writeln!(out, "    arn: {:?},", r.arn)?;
    writeln!(out, "    status: {:?},", r.status)?;
    writeln!(out, "    failure_reason: {:?},", r.failure_reason)?;
    writeln!(out, "    list_key: {:?},", r.list_key)?;
    writeln!(out, "    operations: OperationNames {{")?;
    writeln!(out, "        create: {:?},", o.create)?;
    writeln!(out, "        describe: {:?},", o.describe)?;
    writeln!(out, "        list: {:?},", o.list)?;
    writeln!(out, "        update: {:?},", o.update)?;
    writeln!(out, "        stop: {:?},", o.stop)?;
    writeln!(out, "        delete: {:?},", o.delete)?;
    writeln!(out, "    }},")?;
    writeln!(out, "    fields: {prefix}_FIELDS,")?;
    writeln!(out, "}};")?;
    writeln!(out)?;

    writeln!(out, "/// Last retrieved state of a `{}`.", r.name)?;
    writeln!(out, "#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]")?;
    writeln!(out, "pub struct {}Snapshot {{", r.name)?;
    for f in &schema.fields {
        writeln!(out, "    #[serde(rename = {:?}, default, skip_serializing_if = \"Field::is_unset\")]", f.wire)?;
        writeln!(out, "    pub {}: Field<{}>,", f.name, f.rust_type)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "impl ResourceSnapshot for {}Snapshot {{", r.name)?;
    writeln!(out, "    fn attribute(&self, key: &str) -> crate::ResourceResult<Option<Field<serde_json::Value>>> {{")?;
    writeln!(out, "        match key {{")?;
    for f in &schema.fields {
        writeln!(out, "            {:?} | {:?} => to_attribute(&self.{}).map(Some),", f.name, f.wire, f.name)?;
    }
    writeln!(out, "            _ => Ok(None),")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    fn merge(&mut self, newer: Self) {{")?;
    for f in &schema.fields {
        writeln!(out, "        self.{0}.merge(newer.{0});", f.name)?;
    }
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let schema_dir = manifest_dir.join("schema");

    let mut entries: Vec<PathBuf> = std::fs::read_dir(&schema_dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    entries.sort();

    for path in entries {
        let content = std::fs::read_to_string(&path)?;
        let schema: SchemaFile = toml::from_str(&content)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        check(&schema, &path)?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("non-utf8 schema file name: {}", path.display()))?;
        let source = format!("schema/{stem}.toml");
        let code = generate(&schema, &source)?;
        std::fs::write(out_dir.join(format!("{stem}.rs")), code)?;

        println!("cargo:rerun-if-changed={}", path.display());
    }

    // Tell cargo to rerun this script if schema files are added or removed
    println!("cargo:rerun-if-changed=schema/");

    Ok(())
}
