//! Report parameters from a UI component's context.
//!
//! A context menu maps report parameter names to expressions over the
//! component's context:
//!
//! - `${key}` takes `context[key]` as is;
//! - `${key.property}` takes `context[key]`, which must be an object, and
//!   renders its `property` as text.
//!
//! Anything else resolves to nothing and the parameter is left out.

use femsq_client::{ContextMenu, ReportInfo, ReportMetadata};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Component context the expressions are evaluated against
pub type Context = Map<String, Value>;

/// Report that contributes a context menu to a component
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReport {
    pub id: String,
    pub name: String,
    pub context_menu: ContextMenu,
}

/// Evaluate one expression; `None` when it does not resolve.
pub fn resolve_expression(expression: &str, context: &Context) -> Option<Value> {
    let inner = expression.strip_prefix("${")?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains('}') {
        return None;
    }

    if let Some(value) = context.get(inner).filter(|v| !v.is_null()) {
        return Some(value.clone());
    }

    let (object_key, property) = inner.split_once('.')?;
    if object_key.is_empty() || property.is_empty() {
        return None;
    }
    let value = context.get(object_key)?.as_object()?.get(property)?;
    match value {
        Value::Null => None,
        Value::String(text) => Some(Value::String(text.clone())),
        other => Some(Value::String(other.to_string())),
    }
}

/// Resolve every mapped parameter, omitting the ones that do not resolve.
pub fn resolve_parameters(
    mapping: &BTreeMap<String, String>,
    context: &Context,
) -> BTreeMap<String, Value> {
    mapping
        .iter()
        .filter_map(|(name, expression)| {
            resolve_expression(expression, context).map(|value| (name.clone(), value))
        })
        .collect()
}

pub fn resolve_context_menu(menu: &ContextMenu, context: &Context) -> BTreeMap<String, Value> {
    resolve_parameters(&menu.parameter_mapping, context)
}

/// Reports declaring a context menu for `component`, with that menu.
pub fn filter_reports_by_component(reports: &[ReportInfo], component: &str) -> Vec<ComponentReport> {
    reports
        .iter()
        .filter_map(|report| {
            let menu = report
                .ui_integration
                .as_ref()?
                .context_menus
                .iter()
                .find(|menu| menu.component == component)?;
            Some(ComponentReport {
                id: report.id.clone(),
                name: report.name.clone(),
                context_menu: menu.clone(),
            })
        })
        .collect()
}

/// Whether every required parameter has a resolved value or a default.
///
/// `null` and empty text do not count as values.
pub fn are_all_required_parameters_filled(
    metadata: &ReportMetadata,
    resolved: &BTreeMap<String, Value>,
) -> bool {
    metadata
        .parameters
        .iter()
        .filter(|param| param.required)
        .all(|param| {
            let has_value = match resolved.get(&param.name) {
                None | Some(Value::Null) => false,
                Some(Value::String(text)) => !text.is_empty(),
                Some(_) => true,
            };
            has_value || param.has_default()
        })
}
