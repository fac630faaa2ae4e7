use clap::Args;
use iso_core::id::EntityId;
use iso_core::lint::{LintDiagnostic, LintSeverity, lint_model};
use iso_core::model::Model;
use iso_core::schema::ModelError;
use iso_render::order::compose_view;
use serde_json::json;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Io { path: PathBuf, source: std::io::Error },
    Model(ModelError),
    UnknownView(String),
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "cannot read {}", path.display()),
            Self::Model(err) => write!(f, "{err}"),
            Self::UnknownView(id) => write!(f, "no view with id `{id}`"),
            Self::Json(_) => f.write_str("cannot serialize report"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Model(_) | Self::UnknownView(_) => None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

fn read_document(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load(path: &Path) -> Result<Model, CliError> {
    let model = Model::from_json(&read_document(path)?).map_err(CliError::Model)?;
    log::debug!(
        "loaded {}: {} item(s), {} view(s)",
        path.display(),
        model.items.len(),
        model.views.len()
    );
    Ok(model)
}

// ─── validate ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to the document
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat lint warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

impl ValidateArgs {
    pub fn execute(&self) -> Result<ExitCode, CliError> {
        let text = read_document(&self.file)?;
        let (errors, diagnostics) = match Model::from_json(&text) {
            Ok(model) => (Vec::new(), lint_model(&model)),
            Err(ModelError::Invalid(errors)) => (errors, Vec::new()),
            Err(err @ ModelError::Parse(_)) => return Err(CliError::Model(err)),
        };
        let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();

        if self.json {
            let findings: Vec<_> = diagnostics.iter().map(diagnostic_json).collect();
            let report = json!({
                "valid": errors.is_empty(),
                "errors": errors,
                "lint": findings,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            if errors.is_empty() {
                println!("✓ {} is a valid document", self.file.display());
            } else {
                println!("✗ {} failed validation", self.file.display());
                for err in &errors {
                    println!("  ✗ {err}");
                }
            }
            for diag in &diagnostics {
                let mark = match diag.severity {
                    LintSeverity::Warning => "⚠",
                    LintSeverity::Info => "ℹ",
                };
                println!("  {mark} [{}] {}", diag.rule, diag.message);
            }
        }

        let has_warnings = diagnostics
            .iter()
            .any(|d| d.severity == LintSeverity::Warning);
        Ok(if !errors.is_empty() || (self.strict && has_warnings) {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}

fn diagnostic_json(diag: &LintDiagnostic) -> serde_json::Value {
    let severity = match diag.severity {
        LintSeverity::Warning => "warning",
        LintSeverity::Info => "info",
    };
    json!({
        "rule": diag.rule,
        "severity": severity,
        "view": diag.view_id.map(|id| id.as_str()),
        "entity": diag.entity_id.as_str(),
        "message": diag.message,
    })
}

// ─── order ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct OrderArgs {
    /// Path to the document
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    /// Only this view
    #[arg(long, value_name = "ID")]
    pub view: Option<String>,
}

impl OrderArgs {
    pub fn execute(&self) -> Result<ExitCode, CliError> {
        let model = load(&self.file)?;
        let views: Vec<_> = match &self.view {
            Some(id) => {
                let view = model
                    .view(EntityId::intern(id))
                    .ok_or_else(|| CliError::UnknownView(id.clone()))?;
                vec![view]
            }
            None => model.views.iter().collect(),
        };

        for view in views {
            println!("{} ({})", view.name, view.id);
            for (i, id) in compose_view(view, &model).paint_ids().iter().enumerate() {
                println!("  {:>3}  {id}", i + 1);
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
