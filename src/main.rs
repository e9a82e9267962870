//! Command-line interface for jsonschema3

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use jsonschema3::validators::ValidationMode;
#[cfg(feature = "cli")]
use jsonschema3::{JsonSchema, Loader, SchemaModelBuilder, SchemaResolver, SchemaWriter};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "jsonschema3")]
#[command(author, version, about = "JSON Schema draft 3 validation tool", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect a schema and display its structure
    Inspect {
        /// Path to the schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Schemas to load first, so SCHEMA can reference them by id
        #[arg(short, long = "with", value_name = "SCHEMA")]
        with: Vec<PathBuf>,

        /// Output the re-serialized schema as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate a JSON document against a schema
    Validate {
        /// Path to the schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Schemas to load first, so SCHEMA can reference them by id
        #[arg(short, long = "with", value_name = "SCHEMA")]
        with: Vec<PathBuf>,

        /// Path to the JSON file to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Validation mode: strict (first error) or lax (every error)
        #[arg(short, long, default_value = "lax")]
        mode: String,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Inspect { schema, with, json } => cmd_inspect(schema, with, json),
        Commands::Validate {
            schema,
            with,
            file,
            mode,
        } => cmd_validate(schema, with, file, mode),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "warn",
        1 => "jsonschema3=debug",
        _ => "jsonschema3=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn load_schema(schema: &Path, with: &[PathBuf]) -> jsonschema3::Result<JsonSchema> {
    let loader = Loader::new();
    let mut resolver = SchemaResolver::new();
    for path in with {
        loader.load_schema_into(path, &mut resolver)?;
    }
    let root = loader.load_schema_into(schema, &mut resolver)?;
    Ok(JsonSchema::from_parts(resolver, root))
}

#[cfg(feature = "cli")]
fn cmd_inspect(
    schema_path: PathBuf,
    with: Vec<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = load_schema(&schema_path, &with)?;

    if json_output {
        let text = SchemaWriter::new(schema.resolver()).write_string(schema.root());
        println!("{}", text);
        return Ok(());
    }

    let resolver = schema.resolver();
    let root = schema.schema();
    println!("Schema: {}", schema_path.display());
    println!("  Id: {}", root.id.as_deref().unwrap_or("(none)"));
    if let Some(title) = &root.title {
        println!("  Title: {}", title);
    }
    println!("  Type: {}", root.schema_type.map_or("Any".to_string(), |t| t.to_string()));
    println!("  Schema nodes: {}", resolver.len());

    let mut ids: Vec<&str> = resolver.ids().collect();
    ids.sort_unstable();
    if !ids.is_empty() {
        println!("  Registered ids: {}", ids.join(", "));
    }

    let mut models = SchemaModelBuilder::new(resolver);
    let model = models.build(schema.root());
    println!("  Models: {}", models.model_count());

    let model = &models[model];
    if !model.properties.is_empty() {
        println!("\n=== Properties ===");
        for (name, &property) in &model.properties {
            let property = &models[property];
            let required = if property.required { " (required)" } else { "" };
            println!("  {} : {}{}", name, property.schema_type, required);
        }
    }
    if !model.pattern_properties.is_empty() {
        println!("\n=== Pattern Properties ===");
        for (pattern, property) in &model.pattern_properties {
            println!("  /{}/ : {}", pattern, models[*property].schema_type);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_validate(
    schema_path: PathBuf,
    with: Vec<PathBuf>,
    file: PathBuf,
    mode: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let validation_mode = match mode.to_lowercase().as_str() {
        "strict" => ValidationMode::Strict,
        "lax" => ValidationMode::Lax,
        _ => return Err(format!("Unknown validation mode: {}. Use: strict, lax", mode).into()),
    };

    let schema = load_schema(&schema_path, &with)?;
    let value = Loader::new().load_document(&file)?;

    let mut errors = schema.iter_errors(&value);
    if validation_mode == ValidationMode::Strict {
        errors.truncate(1);
    }

    if errors.is_empty() {
        println!("✓ Document is valid");
        Ok(())
    } else {
        println!("✗ Document is invalid");
        println!();
        println!("Errors:");
        for error in &errors {
            let path = if error.path().is_empty() { "(root)" } else { error.path() };
            println!("  - {}: {}", path, error);
        }
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
