//! Reshaping of upstream collections for the list pages

use serde_json::Value;
use std::collections::HashMap;
use usina_core::status::{StatusBucket, format_date};

/// Shown when an activity's responsible user is unknown
pub const UNASSIGNED: &str = "Não atribuído";

/// Numeric id of an upstream object or reference; ids may arrive as strings
pub fn id_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(fields) => fields.get("id").and_then(id_of),
        _ => None,
    }
}

fn text<'a>(item: &'a Value, field: &str) -> &'a str {
    item.get(field).and_then(Value::as_str).unwrap_or_default()
}

fn full_name(user: &Value) -> String {
    format!("{} {}", text(user, "first_name"), text(user, "last_name"))
        .trim()
        .to_string()
}

/// `id -> "first last"`, falling back to the email for users without a name
pub fn display_names(users: &[Value]) -> HashMap<i64, String> {
    users
        .iter()
        .filter_map(|user| {
            let id = user.get("id").and_then(id_of)?;
            let name = full_name(user);
            let name = if name.is_empty() {
                text(user, "email").to_string()
            } else {
                name
            };
            Some((id, name))
        })
        .collect()
}

/// `id -> "first last"` for users that have a first name
pub fn creator_names(users: &[Value]) -> HashMap<i64, String> {
    users
        .iter()
        .filter(|user| !text(user, "first_name").is_empty())
        .filter_map(|user| Some((user.get("id").and_then(id_of)?, full_name(user))))
        .collect()
}

fn insert(item: &mut Value, field: &str, value: String) {
    if let Value::Object(fields) = item {
        fields.insert(field.to_string(), Value::String(value));
    }
}

fn formatted(item: &Value, field: &str) -> String {
    match item.get(field).and_then(Value::as_str) {
        Some(date) => format_date(date),
        None => "N/A".to_string(),
    }
}

/// Add `responsavel_nome` and formatted start and end dates to each activity
pub fn enrich_activities(activities: Vec<Value>, names: &HashMap<i64, String>) -> Vec<Value> {
    activities
        .into_iter()
        .map(|mut activity| {
            let responsible = activity
                .get("responsavel")
                .and_then(id_of)
                .and_then(|id| names.get(&id))
                .cloned()
                .unwrap_or_else(|| UNASSIGNED.to_string());
            let start = formatted(&activity, "data_inicio");
            let end = formatted(&activity, "data_fim");

            insert(&mut activity, "responsavel_nome", responsible);
            insert(&mut activity, "data_inicio_formatada", start);
            insert(&mut activity, "data_fim_formatada", end);
            activity
        })
        .collect()
}

/// Add `criado_por_nome` to each production order
pub fn enrich_orders(orders: Vec<Value>, names: &HashMap<i64, String>) -> Vec<Value> {
    orders
        .into_iter()
        .map(|mut order| {
            let creator = order
                .get("criado_por")
                .and_then(id_of)
                .and_then(|id| names.get(&id))
                .cloned()
                .unwrap_or_else(|| "N/A".to_string());
            insert(&mut order, "criado_por_nome", creator);
            order
        })
        .collect()
}

/// Production order counts shown on the indicators page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indicators {
    pub em_fila: usize,
    pub em_andamento: usize,
    pub concluidas: usize,
}

impl Indicators {
    pub fn from_orders(orders: &[Value]) -> Self {
        orders.iter().fold(Self::default(), |mut acc, order| {
            match StatusBucket::of(text(order, "status")) {
                StatusBucket::Queued => acc.em_fila += 1,
                StatusBucket::InProgress => acc.em_andamento += 1,
                StatusBucket::Completed => acc.concluidas += 1,
                StatusBucket::Other => {}
            }
            acc
        })
    }
}
