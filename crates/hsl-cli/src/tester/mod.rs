//! Tokenization test runner.
//!
//! Loads TOML specs (top-level `[[cases]]`, each with `name`, `input`, and
//! an `expected` token list), runs every case through the reference
//! tokenizer, and reports pass/fail per case.

mod tokenizer;


use std::fmt;
use std::path::{Path, PathBuf};

use hsl_bytecode::Module;
use serde::Deserialize;

pub use tokenizer::{Token, Tokenizer, TokenizerError};

#[derive(Debug, thiserror::Error)]
pub enum TesterError {
    #[error("failed to read spec {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid spec {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

#[derive(Debug, Default, Deserialize)]
pub struct TestSpec {
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    #[serde(default)]
    pub expected: Vec<ExpectedToken>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct ExpectedToken {
    pub scope: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct TestReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<TestFailure>,
}

#[derive(Debug)]
pub struct TestFailure {
    pub case: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FAILED {}: expected [{}], got [{}]",
            self.case, self.expected, self.actual
        )
    }
}

/// Load every `*.toml` spec under `dir`, sorted by file name.
pub fn load_specs(dir: &Path) -> Result<Vec<TestSpec>, TesterError> {
    let entries = std::fs::read_dir(dir).map_err(|source| TesterError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("toml"))
        .collect();
    paths.sort();

    let mut specs = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(&path).map_err(|source| TesterError::Io {
            path: path.clone(),
            source,
        })?;
        let spec = toml::from_str(&text).map_err(|source| TesterError::Toml {
            path: path.clone(),
            source,
        })?;
        specs.push(spec);
    }
    Ok(specs)
}

/// Run every case of every spec against the compiled module.
pub fn run_specs(module: &Module, specs: &[TestSpec]) -> Result<TestReport, TesterError> {
    let tokenizer = Tokenizer::new(&module.program)?;
    let mut report = TestReport::default();

    for spec in specs {
        for case in &spec.cases {
            report.total += 1;
            let actual = tokenizer.tokenize(&case.input);

            if tokens_match(&actual, &case.expected) {
                report.passed += 1;
            } else {
                report.failed += 1;
                report.failures.push(TestFailure {
                    case: case_label(case),
                    expected: render_expected(&case.expected),
                    actual: render_tokens(&actual),
                });
            }
        }
    }
    Ok(report)
}

fn case_label(case: &TestCase) -> String {
    match (case.line, case.column) {
        (Some(line), Some(column)) => format!("{} (line {line}, col {column})", case.name),
        (Some(line), None) => format!("{} (line {line})", case.name),
        _ => case.name.clone(),
    }
}

fn tokens_match(actual: &[Token], expected: &[ExpectedToken]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| a.scope == e.scope && a.text == e.text)
}

fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("{}:{:?}", t.scope, t.text))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_expected(tokens: &[ExpectedToken]) -> String {
    tokens
        .iter()
        .map(|t| format!("{}:{:?}", t.scope, t.text))
        .collect::<Vec<_>>()
        .join(", ")
}
