pub mod color;
pub mod config;
pub mod id;
pub mod lint;
pub mod model;
pub mod schema;
pub mod state;

pub use color::{Color, Shade, derive_variant, resolve_color};
pub use config::EditorDefaults;
pub use id::{EntityId, IdGenerator, SequentialIds, UuidIds};
pub use lint::{LintDiagnostic, LintSeverity, lint_model};
pub use model::*;
pub use schema::{ModelError, Validate, ValidationError, ValidationErrorKind};
pub use state::{ConnectorPath, SceneCache, State};
