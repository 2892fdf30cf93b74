//! Field table command.

use colored::Colorize;
use sagekit_resources::TRAINING_JOB_SCHEMA;
use serde::Serialize;

#[derive(Serialize)]
struct JsonField {
    name: &'static str,
    wire_name: &'static str,
    #[serde(rename = "type")]
    rust_type: &'static str,
    required: bool,
    updatable: bool,
}

/// Execute the fields command.
pub fn execute(json: bool) -> anyhow::Result<()> {
    let schema = &TRAINING_JOB_SCHEMA;

    if json {
        let fields: Vec<JsonField> = schema
            .fields
            .iter()
            .map(|f| JsonField {
                name: f.name,
                wire_name: f.wire_name,
                rust_type: f.rust_type,
                required: f.required,
                updatable: f.updatable,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    println!("{}", format!("{} attributes", schema.type_name).bold().cyan());
    println!();
    println!(
        "  {:<26} {:<26} {:<28} {:<9} {}",
        "NAME".bold(),
        "WIRE NAME".bold(),
        "TYPE".bold(),
        "REQUIRED".bold(),
        "UPDATABLE".bold()
    );
    for f in schema.fields {
        let flag = |set: bool| if set { "yes".green() } else { "-".dimmed() };
        println!(
            "  {:<26} {:<26} {:<28} {:<9} {}",
            f.name,
            f.wire_name,
            f.rust_type,
            flag(f.required),
            flag(f.updatable)
        );
    }
    println!();
    println!(
        "  {} fields, {} required, {} updatable",
        schema.fields.len(),
        schema.required_fields().count(),
        schema.updatable_fields().count()
    );
    Ok(())
}
