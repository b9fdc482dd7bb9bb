//! Scopeck - semantic checker for parsed syntax trees
//!
//! Usage: scopeck [OPTIONS] <tree>

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser as ClapParser;
use log::{debug, LevelFilter};
use scopeck::{AnalysisConfig, DiagnosticReporter, Pipeline, TreeReader};

#[derive(ClapParser, Debug)]
#[command(name = "scopeck")]
#[command(author = "Scopeck Team")]
#[command(version)]
#[command(about = "Semantic checks over a parsed syntax tree", long_about = None)]
struct Args {
    /// Tree dump produced by the parser
    #[arg(required = true)]
    tree: PathBuf,

    /// Program source the tree was parsed from, for labelled diagnostics
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Skip declaration and scope checks
    #[arg(long)]
    skip_declarations: bool,

    /// Skip return-type checks
    #[arg(long)]
    skip_returns: bool,

    /// Skip return/break/skip placement checks
    #[arg(long)]
    skip_keywords: bool,

    /// Report diagnostics ordered by line instead of by pass
    #[arg(long)]
    sort: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            declarations: !self.skip_declarations,
            returns: !self.skip_returns,
            keywords: !self.skip_keywords,
            verbose: self.verbose,
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}

/// Returns `Ok(true)` when no pass reported anything
fn run(args: &Args) -> anyhow::Result<bool> {
    let dump = fs::read_to_string(&args.tree)
        .with_context(|| format!("reading {}", args.tree.display()))?;

    let mut reporter = DiagnosticReporter::new();
    let dump_id = reporter.add_file(args.tree.display().to_string(), dump.clone());
    let program_id = match &args.source {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Some(reporter.add_file(path.display().to_string(), text))
        }
        None => None,
    };

    let tree = match TreeReader::read(&dump) {
        Ok(tree) => tree,
        Err(e) => {
            reporter.report_error(dump_id, &e);
            anyhow::bail!("could not read tree dump");
        }
    };
    debug!("read {} nodes from {}", tree.len(), args.tree.display());

    let config = args.config();
    let report = match Pipeline::from_config(&config).run(&tree) {
        Ok(report) => report,
        Err(e) => {
            reporter.report_error(dump_id, &e);
            anyhow::bail!("analysis aborted");
        }
    };

    let diagnostics = if args.sort {
        report.sorted()
    } else {
        report.diagnostics().collect()
    };
    for diagnostic in &diagnostics {
        reporter.report_diagnostic(program_id, diagnostic);
    }

    if config.verbose {
        for pass in &report.passes {
            eprintln!("{}: {} problem(s)", pass.pass, pass.diagnostics.len());
        }
    }

    Ok(report.is_empty())
}
