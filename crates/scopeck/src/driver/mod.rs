//! Analysis driver: pass registry and result aggregation

use log::info;

use crate::common::{Diagnostic, SemaResult};
use crate::sema::{self, SymbolTable, TypeRegistry};
use crate::tree::Tree;

/// Which passes to run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub declarations: bool,
    pub returns: bool,
    pub keywords: bool,
    pub verbose: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            declarations: true,
            returns: true,
            keywords: true,
            verbose: false,
        }
    }
}

/// A self-contained semantic check over a whole tree
///
/// Every run starts from fresh state, so running a pass twice over the same
/// tree yields the same diagnostics.
pub trait SemanticPass {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    fn run(&self, tree: &Tree) -> SemaResult<Vec<Diagnostic>>;
}

/// Declarations, uses, scopes and struct chains
pub struct DeclarationPass;

impl SemanticPass for DeclarationPass {
    fn name(&self) -> &'static str {
        "declarations"
    }

    fn run(&self, tree: &Tree) -> SemaResult<Vec<Diagnostic>> {
        let mut types = TypeRegistry::with_primitives();
        let mut variables = SymbolTable::new();
        sema::check(tree, tree.root(), &mut types, &mut variables)
    }
}

/// Return statements against declared return types
pub struct ReturnPass;

impl SemanticPass for ReturnPass {
    fn name(&self) -> &'static str {
        "returns"
    }

    fn run(&self, tree: &Tree) -> SemaResult<Vec<Diagnostic>> {
        sema::check_returns(tree)
    }
}

/// Placement of return, break and skip
pub struct KeywordPass;

impl SemanticPass for KeywordPass {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn run(&self, tree: &Tree) -> SemaResult<Vec<Diagnostic>> {
        Ok(sema::check_keywords(tree))
    }
}

/// Diagnostics of one pass
#[derive(Debug, Clone)]
pub struct PassReport {
    pub pass: &'static str,
    pub diagnostics: Vec<Diagnostic>,
}

/// Diagnostics of all passes, in pass order
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub passes: Vec<PassReport>,
}

impl Report {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.passes.iter().flat_map(|p| p.diagnostics.iter())
    }

    /// All diagnostics ordered by line; ties keep pass order
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut all: Vec<_> = self.diagnostics().collect();
        all.sort_by_key(|d| d.line);
        all
    }

    pub fn len(&self) -> usize {
        self.passes.iter().map(|p| p.diagnostics.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered set of passes run over one tree
pub struct Pipeline {
    passes: Vec<Box<dyn SemanticPass>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Pipeline with the passes enabled in `config`
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut pipeline = Self::new();
        if config.declarations {
            pipeline.register(Box::new(DeclarationPass));
        }
        if config.returns {
            pipeline.register(Box::new(ReturnPass));
        }
        if config.keywords {
            pipeline.register(Box::new(KeywordPass));
        }
        pipeline
    }

    pub fn register(&mut self, pass: Box<dyn SemanticPass>) {
        self.passes.push(pass);
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|p| p.name())
    }

    /// Run every pass; a hard error in any pass aborts the run
    pub fn run(&self, tree: &Tree) -> SemaResult<Report> {
        let mut report = Report::default();
        for pass in &self.passes {
            info!("running {} pass over {} nodes", pass.name(), tree.len());
            let diagnostics = pass.run(tree)?;
            info!("{} pass reported {} problems", pass.name(), diagnostics.len());
            report.passes.push(PassReport {
                pass: pass.name(),
                diagnostics,
            });
        }
        Ok(report)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
