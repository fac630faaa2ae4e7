//! Referential lint for documents.
//!
//! Reducers never cascade deletes, so a document can legitimately end up
//! with connectors anchored to removed items, view items whose model item
//! is gone, and so on. These rules report such references without
//! modifying anything.

use crate::id::EntityId;
use crate::model::{AnchorRef, Model, View};
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Will render wrong or not at all.
    Warning,
    /// Harmless but probably unintended.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    /// View the finding is in, `None` for model-level findings.
    pub view_id: Option<EntityId>,
    /// The entity this diagnostic refers to.
    pub entity_id: EntityId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-item-ref").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over the model and return diagnostics.
#[must_use]
pub fn lint_model(model: &Model) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_icon_refs(model, &mut diags);
    for view in &model.views {
        lint_orphan_view_items(model, view, &mut diags);
        lint_anchor_refs(model, view, &mut diags);
        lint_color_refs(model, view, &mut diags);
        lint_conflicting_fill(view, &mut diags);
        lint_duplicate_placement(view, &mut diags);
    }
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_icon_refs(model: &Model, diags: &mut Vec<LintDiagnostic>) {
    for item in &model.items {
        if let Some(icon) = item.icon
            && model.icon(icon).is_none()
        {
            diags.push(LintDiagnostic {
                view_id: None,
                entity_id: item.id,
                message: format!("Item `{}` uses unknown icon `{icon}`.", item.id),
                severity: LintSeverity::Warning,
                rule: "dangling-icon-ref",
            });
        }
    }
}

/// A placed item with no model item behind it.
fn lint_orphan_view_items(model: &Model, view: &View, diags: &mut Vec<LintDiagnostic>) {
    for item in view.all_items() {
        if model.item(item.id).is_none() {
            diags.push(LintDiagnostic {
                view_id: Some(view.id),
                entity_id: item.id,
                message: format!(
                    "View `{}` places `{}`, which is not in the model.",
                    view.id, item.id
                ),
                severity: LintSeverity::Warning,
                rule: "orphan-view-item",
            });
        }
    }
}

fn lint_anchor_refs(model: &Model, view: &View, diags: &mut Vec<LintDiagnostic>) {
    let placed: HashSet<EntityId> = view.all_items().map(|i| i.id).collect();
    let anchors: HashSet<EntityId> = view
        .connectors
        .iter()
        .flat_map(|c| c.anchors.iter().map(|a| a.id))
        .collect();

    for connector in &view.connectors {
        for anchor in &connector.anchors {
            let missing = match anchor.target {
                AnchorRef::Item(id) => (!placed.contains(&id) || model.item(id).is_none())
                    .then(|| (format!("item `{id}`"), "dangling-item-ref")),
                AnchorRef::Anchor(id) => (!anchors.contains(&id))
                    .then(|| (format!("anchor `{id}`"), "dangling-anchor-ref")),
                AnchorRef::Tile(_) => None,
            };
            if let Some((what, rule)) = missing {
                diags.push(LintDiagnostic {
                    view_id: Some(view.id),
                    entity_id: connector.id,
                    message: format!(
                        "Connector `{}` anchor `{}` points at missing {what}.",
                        connector.id, anchor.id
                    ),
                    severity: LintSeverity::Warning,
                    rule,
                });
            }
        }
    }
}

fn lint_color_refs(model: &Model, view: &View, diags: &mut Vec<LintDiagnostic>) {
    let rect_colors = view.rectangles.iter().map(|r| (r.id, r.color));
    let connector_colors = view.connectors.iter().map(|c| (c.id, c.color));
    for (id, color) in rect_colors.chain(connector_colors) {
        if let Some(color) = color
            && model.color(color).is_none()
        {
            diags.push(LintDiagnostic {
                view_id: Some(view.id),
                entity_id: id,
                message: format!("`{id}` uses unknown palette color `{color}`."),
                severity: LintSeverity::Warning,
                rule: "dangling-color-ref",
            });
        }
    }
}

/// Rectangles carrying both a palette color and a literal color.
fn lint_conflicting_fill(view: &View, diags: &mut Vec<LintDiagnostic>) {
    for rect in &view.rectangles {
        if rect.color.is_some() && rect.color_value.is_some() {
            diags.push(LintDiagnostic {
                view_id: Some(view.id),
                entity_id: rect.id,
                message: format!(
                    "Rectangle `{}` sets both `color` and `colorValue`; `colorValue` wins.",
                    rect.id
                ),
                severity: LintSeverity::Info,
                rule: "conflicting-fill",
            });
        }
    }
}

/// The same item placed twice in one view (directly or via layers).
fn lint_duplicate_placement(view: &View, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for item in view.all_items() {
        if !seen.insert(item.id) {
            diags.push(LintDiagnostic {
                view_id: Some(view.id),
                entity_id: item.id,
                message: format!("`{}` is placed more than once in view `{}`.", item.id, view.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-placement",
            });
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(model: &Model) -> Vec<&'static str> {
        lint_model(model).iter().map(|d| d.rule).collect()
    }

    #[test]
    fn clean_document_has_no_diags() {
        let model = Model::from_json(
            r##"{
              "title": "clean",
              "colors": [{ "id": "c1", "value": "#ff0000" }],
              "icons": [{ "id": "server", "name": "Server", "url": "server.svg" }],
              "items": [
                { "id": "a", "name": "A", "icon": "server" },
                { "id": "b", "name": "B" }
              ],
              "views": [{
                "id": "v", "name": "V",
                "items": [{ "id": "a", "tile": { "x": 0, "y": 0 } }],
                "layers": [{ "id": "l", "name": "L", "items": [{ "id": "b", "tile": { "x": 1, "y": 1 } }] }],
                "connectors": [{
                  "id": "c", "color": "c1",
                  "anchors": [
                    { "id": "a1", "ref": { "item": "a" } },
                    { "id": "a2", "ref": { "item": "b" } }
                  ]
                }]
              }]
            }"##,
        )
        .unwrap();
        assert!(lint_model(&model).is_empty());
    }

    #[test]
    fn reports_dangling_references() {
        let model = Model::from_json(
            r##"{
              "title": "broken",
              "items": [{ "id": "a", "name": "A", "icon": "missing-icon" }],
              "views": [{
                "id": "v", "name": "V",
                "items": [
                  { "id": "a", "tile": { "x": 0, "y": 0 } },
                  { "id": "ghost", "tile": { "x": 1, "y": 0 } }
                ],
                "rectangles": [{
                  "id": "r", "color": "nope", "colorValue": "#00ff00",
                  "from": { "x": 0, "y": 0 }, "to": { "x": 1, "y": 1 }
                }],
                "connectors": [{
                  "id": "c",
                  "anchors": [
                    { "id": "a1", "ref": { "item": "deleted" } },
                    { "id": "a2", "ref": { "anchor": "nowhere" } }
                  ]
                }]
              }]
            }"##,
        )
        .unwrap();

        let found = rules(&model);
        for rule in [
            "dangling-icon-ref",
            "orphan-view-item",
            "dangling-item-ref",
            "dangling-anchor-ref",
            "dangling-color-ref",
            "conflicting-fill",
        ] {
            assert!(found.contains(&rule), "expected {rule} in {found:?}");
        }
    }

    #[test]
    fn reports_duplicate_placement_across_layers() {
        let model = Model::from_json(
            r#"{
              "title": "dup",
              "items": [{ "id": "a", "name": "A" }],
              "views": [{
                "id": "v", "name": "V",
                "items": [{ "id": "a", "tile": { "x": 0, "y": 0 } }],
                "layers": [{ "id": "l", "name": "L", "items": [{ "id": "a", "tile": { "x": 2, "y": 2 } }] }]
              }]
            }"#,
        )
        .unwrap();
        assert_eq!(rules(&model), vec!["duplicate-placement"]);
    }
}
