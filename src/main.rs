//! # tb365 CLI
//!
//! Command-line interface for compiling canvas templates.
//!
//! ## Usage
//!
//! ```bash
//! # Convert a request body ({tb365Data, data, options}) to HTML on stdout
//! tb365 convert flyer.json
//!
//! # Convert a bare canvas document with separate data, writing a file
//! tb365 convert design.json --data listing.json --out flyer.html
//!
//! # Convert several files in parallel and print a JSON report per file
//! tb365 convert a.json b.json c.json --report
//!
//! # Print the data schema (or sample data) a design expects
//! tb365 schema design.json --sample
//!
//! # Validate only
//! tb365 validate design.json
//!
//! # Run the HTTP API
//! tb365 serve --listen 0.0.0.0:8080
//! ```

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use tb365::{
    MissingPolicy, ReplaceOptions, Tb365Error,
    pipeline::{self, into_request},
    server::{self, ServerConfig, DEFAULT_BODY_LIMIT},
};

/// tb365 - Canvas template to HTML compiler
#[derive(Parser, Debug)]
#[command(name = "tb365")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate HTML and substitute data
    Convert {
        /// Request body or bare canvas document (one or more)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Data object to substitute (overrides the body's `data`)
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Write HTML here instead of stdout (single input only)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        #[command(flatten)]
        flags: ReplaceFlags,

        /// Print a JSON report (metadata, missing, warnings) instead of HTML
        #[arg(long)]
        report: bool,
    },

    /// Print the variables and data schema of a document
    Schema {
        /// Request body or bare canvas document
        file: PathBuf,

        /// Print sample data instead of the schema
        #[arg(long)]
        sample: bool,
    },

    /// Validate a document and print a summary
    Validate {
        /// Request body or bare canvas document
        file: PathBuf,
    },

    /// Run the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = DEFAULT_BODY_LIMIT)]
        body_limit: usize,
    },
}

/// Replacement flags layered over a body's own `options`.
#[derive(Args, Debug, Default)]
struct ReplaceFlags {
    /// Remove unresolved placeholders instead of leaving them
    #[arg(long)]
    strip_missing: bool,

    /// Substitute values without HTML escaping
    #[arg(long)]
    no_escape: bool,

    /// Disable currency auto-formatting
    #[arg(long)]
    no_format: bool,

    /// Currency symbol for auto-formatting (default "$" unless the body sets one)
    #[arg(long, value_name = "SYMBOL")]
    currency: Option<String>,

    /// Fill {{date}}, {{time}}, {{year}}, ... when the data lacks them
    #[arg(long)]
    builtins: bool,
}

impl ReplaceFlags {
    fn apply(self, options: &mut ReplaceOptions) {
        if self.strip_missing {
            options.missing = MissingPolicy::Strip;
        }
        if self.no_escape {
            options.escape_html = false;
        }
        if self.no_format {
            options.auto_format = false;
        }
        if self.builtins {
            options.builtins = true;
        }
        if let Some(symbol) = self.currency {
            options.currency_symbol = symbol;
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        for violation in e.violations() {
            eprintln!("  - {}", violation);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), Tb365Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            files,
            data,
            out,
            flags,
            report,
        } => {
            if out.is_some() && files.len() > 1 {
                return Err(Tb365Error::Request(vec![
                    "--out can only be used with a single input file".to_string(),
                ]));
            }

            let data = data.as_deref().map(read_json).transpose()?;
            let mut bodies = Vec::with_capacity(files.len());
            for file in &files {
                let mut body = into_request(read_json(file)?);
                if let Some(data) = &data {
                    body["data"] = data.clone();
                }
                bodies.push(body);
            }

            // Flags layer over the first body's own options
            let mut options = match bodies.first() {
                Some(body) => pipeline::request_options(body)?,
                None => Default::default(),
            };
            flags.apply(&mut options.replace);

            let results = pipeline::convert_batch(&bodies, Some(&options));

            if report {
                let reports: Vec<Value> = files
                    .iter()
                    .zip(&results)
                    .map(|(file, result)| report_entry(file, result))
                    .collect();
                let text = if reports.len() == 1 {
                    serde_json::to_string_pretty(&reports[0])?
                } else {
                    serde_json::to_string_pretty(&reports)?
                };
                println!("{}", text);
                return match results.into_iter().find_map(Result::err) {
                    Some(e) => Err(e),
                    None => Ok(()),
                };
            }

            for (file, result) in files.iter().zip(results) {
                let output = result?;
                for warning in &output.result.warnings {
                    eprintln!("warning [{}]: {}", warning.key, warning.message);
                }
                if !output.result.missing.is_empty() {
                    eprintln!(
                        "{}: unresolved variables: {}",
                        file.display(),
                        output.result.missing.join(", ")
                    );
                }
                match &out {
                    Some(path) => {
                        fs::write(path, &output.result.html)?;
                        eprintln!(
                            "Wrote {} ({} bytes)",
                            path.display(),
                            output.result.html.len()
                        );
                    }
                    None => print!("{}", output.result.html),
                }
            }
            Ok(())
        }

        Commands::Schema { file, sample } => {
            let body = into_request(read_json(&file)?);
            let output = pipeline::extract_schema(&body)?;
            let text = if sample {
                serde_json::to_string_pretty(&output.sample_data)?
            } else {
                serde_json::to_string_pretty(&output)?
            };
            println!("{}", text);
            Ok(())
        }

        Commands::Validate { file } => {
            let body = into_request(read_json(&file)?);
            let project = pipeline::validate_document(&body)?;
            println!(
                "{} v{}: valid ({} elements, {} variables)",
                project.project_name,
                project.version,
                project.statistics.total_elements,
                project.text_content.variables.len()
            );
            for warning in &project.validation.warnings {
                println!("  warning: {}", warning);
            }
            Ok(())
        }

        Commands::Serve { listen, body_limit } => {
            let config = ServerConfig {
                listen_addr: listen,
                body_limit_bytes: body_limit,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }
    }
}

fn read_json(path: &Path) -> Result<Value, Tb365Error> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn report_entry(file: &Path, result: &Result<pipeline::ConvertOutput, Tb365Error>) -> Value {
    match result {
        Ok(output) => json!({
            "file": file.display().to_string(),
            "success": true,
            "conversionId": output.conversion_id,
            "project": output.project,
            "generation": output.generation.metadata,
            "missing": output.result.missing,
            "warnings": output.result.warnings,
            "statistics": output.result.statistics,
            "processingTime": output.result.processing_time,
        }),
        Err(e) => {
            let errors = match e.violations() {
                [] => vec![e.to_string()],
                items => items.to_vec(),
            };
            json!({
                "file": file.display().to_string(),
                "success": false,
                "stage": e.stage(),
                "errors": errors,
            })
        }
    }
}
