//! Kalkulator CLI - pricing formula evaluator

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use kalkulator_formula::{
    normalize, unescape_delimiter, Calculator, Messages, RawFormula,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kalk")]
#[command(author, version, about = "Pricing formula evaluator")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula and print the outcome as JSON
    Eval {
        #[command(flatten)]
        input: FormulaInput,

        /// JSON message table overriding the built-in messages
        #[arg(short, long, env = "KALK_MESSAGES")]
        messages: Option<PathBuf>,
    },

    /// Report whether a formula is ready to be evaluated
    Check {
        #[command(flatten)]
        input: FormulaInput,
    },

    /// Print the normalized form of an expression
    Normalize {
        /// Raw expression text
        text: String,
    },
}

#[derive(Args)]
struct FormulaInput {
    /// Formula JSON file ({"mode": ..., "expr": ...})
    #[arg(short, long, conflicts_with = "expr", required_unless_present = "expr")]
    formula: Option<PathBuf>,

    /// Single-expression formula text
    #[arg(short, long)]
    expr: Option<String>,

    /// Variables JSON file (an object of name to value)
    #[arg(long)]
    vars: Option<PathBuf>,

    /// Variable binding; overrides entries from --vars
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    var: Vec<(String, Value)>,
}

impl FormulaInput {
    fn formula(&self) -> Result<RawFormula> {
        match (&self.formula, &self.expr) {
            (Some(path), _) => load_formula(path),
            (None, Some(expr)) => Ok(RawFormula::oneline(expr.as_str())),
            (None, None) => bail!("Either --formula or --expr is required"),
        }
    }

    fn variables(&self) -> Result<Map<String, Value>> {
        let mut vars = match &self.vars {
            Some(path) => load_vars(path)?,
            None => Map::new(),
        };
        for (name, value) in &self.var {
            vars.insert(name.clone(), value.clone());
        }
        Ok(vars)
    }

    fn calculator(&self) -> Result<Calculator> {
        Ok(Calculator::new(&self.formula()?, &self.variables()?))
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("kalkulator_formula=debug,kalk=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Eval { input, messages } => eval(&input, messages.as_deref()),
        Commands::Check { input } => check(&input),
        Commands::Normalize { text } => {
            println!("{}", normalize(&text));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn eval(input: &FormulaInput, messages: Option<&Path>) -> Result<ExitCode> {
    let mut calculator = input.calculator()?;
    if let Some(path) = messages {
        calculator = calculator.with_messages(Arc::new(load_messages(path)?));
    }

    let outcome = calculator.execute();
    tracing::debug!(status = outcome.status(), "formula evaluated");
    println!("{}", outcome.to_json().context("Failed to serialize outcome")?);

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check(input: &FormulaInput) -> Result<ExitCode> {
    let calculator = input.calculator()?;

    println!("Mode: {:?}", calculator.mode());

    let references: Vec<String> = calculator
        .references()
        .iter()
        .map(|name| unescape_delimiter(name))
        .collect();
    if !references.is_empty() {
        println!("References: {}", references.join(", "));
    }

    match calculator.prepare_error() {
        None => {
            println!("Ready: yes");
            Ok(ExitCode::SUCCESS)
        }
        Some(e) => {
            println!("Ready: no ({})", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_formula(path: &Path) -> Result<RawFormula> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    RawFormula::from_json(&text)
        .with_context(|| format!("Failed to parse formula '{}'", path.display()))
}

fn load_vars(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    match serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse variables '{}'", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("Variables file '{}' must hold a JSON object", path.display()),
    }
}

fn load_messages(path: &Path) -> Result<Messages> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    Messages::from_json(&text)
        .with_context(|| format!("Failed to parse message table '{}'", path.display()))
}

/// Parse `NAME=VALUE`; the value is JSON when it parses as JSON, text otherwise
fn parse_var(arg: &str) -> Result<(String, Value), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))?;
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", arg));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
