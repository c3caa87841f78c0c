//! Rewrite an XML document using rules from a JSON configuration file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use xml_rewrite::{RewriteConfig, XmlRewrite};
use xot_adapter::XotTree;

mod logging;

#[derive(Parser)]
#[command(
    name = "xml-rewrite",
    version,
    about = "Rewrite an XML document into a new shape using declarative rules"
)]
struct Cli {
    /// JSON file with the destination root, namespaces, vocabulary and rules
    #[arg(short, long, value_name = "CONFIG")]
    rules: PathBuf,

    /// Source XML document
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Serialize without indentation
    #[arg(long)]
    compact: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(logging::level_from_verbosity(cli.verbose));
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config_text = fs::read_to_string(&cli.rules)
        .with_context(|| format!("reading rules from {}", cli.rules.display()))?;
    let config = RewriteConfig::from_json_str(&config_text)
        .with_context(|| format!("loading rules from {}", cli.rules.display()))?;
    let rules = config
        .rule_set()
        .with_context(|| format!("compiling rules from {}", cli.rules.display()))?;

    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let mut source = XotTree::new();
    let source_root = source
        .parse_root(&input)
        .with_context(|| format!("parsing {}", cli.input.display()))?;

    let mut rewrite = XmlRewrite::new(&source, source_root, XotTree::new(), config.root)?
        .with_source_namespaces(config.source_namespaces)
        .with_vocabulary(config.vocabulary)
        .with_rules(rules);
    rewrite.apply_rules()?;

    let output = if cli.compact {
        rewrite.to_compact_string()?
    } else {
        rewrite.to_pretty_string()?
    };
    match &cli.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("writing {}", path.display()))?;
            info!(output = %path.display(), "rewrite written");
        }
        None => println!("{output}"),
    }
    Ok(())
}
