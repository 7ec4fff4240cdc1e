//! Presentation helpers for production and activity statuses

use chrono::{DateTime, NaiveDate};

/// Bootstrap badge classes for a status
pub fn status_class(status: &str) -> &'static str {
    match status.to_lowercase().as_str() {
        "aberta" => "bg-warning text-dark",
        "em_andamento" | "andamento" => "bg-info text-white",
        "pausada" => "bg-secondary text-white",
        "concluida" | "concluido" => "bg-success text-white",
        "cancelada" => "bg-danger text-white",
        _ => "bg-secondary text-white",
    }
}

/// Font Awesome icon for a status
pub fn status_icon(status: &str) -> &'static str {
    match status.to_lowercase().as_str() {
        "aberta" => "fas fa-hourglass-start",
        "em_andamento" | "andamento" => "fas fa-cogs",
        "pausada" => "fas fa-pause-circle",
        "concluida" | "concluido" => "fas fa-check-circle",
        "cancelada" => "fas fa-times-circle",
        _ => "fas fa-question-circle",
    }
}

/// Human label for a status; unknown statuses are shown as-is
pub fn status_label(status: &str) -> String {
    let label = match status.to_lowercase().as_str() {
        "aberta" => "Na Fila",
        "em_andamento" | "andamento" => "Em Andamento",
        "pausada" => "Pausada",
        "concluida" | "concluido" => "Concluída",
        "cancelada" => "Cancelada",
        "" => "Desconhecido",
        _ => return status.to_string(),
    };
    label.to_string()
}

/// Coarse bucket used by the indicators page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Queued,
    InProgress,
    Completed,
    Other,
}

impl StatusBucket {
    pub fn of(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "aberta" => Self::Queued,
            "em_andamento" | "andamento" => Self::InProgress,
            "concluida" | "concluido" => Self::Completed,
            _ => Self::Other,
        }
    }
}

/// Format an upstream date or timestamp as `dd/mm/yyyy`
///
/// Accepts RFC 3339 timestamps and plain `yyyy-mm-dd` dates. Empty input
/// yields "N/A"; anything unparseable is returned unchanged.
pub fn format_date(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "N/A".to_string();
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return timestamp.format("%d/%m/%Y").to_string();
    }

    let date_part = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lookup_is_case_insensitive() {
        assert_eq!(status_class("ABERTA"), "bg-warning text-dark");
        assert_eq!(status_icon("Em_Andamento"), "fas fa-cogs");
        assert_eq!(status_label("Concluido"), "Concluída");
    }

    #[test]
    fn test_unknown_status_fallbacks() {
        assert_eq!(status_class("arquivada"), "bg-secondary text-white");
        assert_eq!(status_icon("arquivada"), "fas fa-question-circle");
        assert_eq!(status_label("arquivada"), "arquivada");
        assert_eq!(status_label(""), "Desconhecido");
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(StatusBucket::of("aberta"), StatusBucket::Queued);
        assert_eq!(StatusBucket::of("andamento"), StatusBucket::InProgress);
        assert_eq!(StatusBucket::of("concluida"), StatusBucket::Completed);
        assert_eq!(StatusBucket::of("cancelada"), StatusBucket::Other);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-09"), "09/03/2024");
        assert_eq!(format_date("2024-03-09T14:30:00Z"), "09/03/2024");
        assert_eq!(format_date("2024-03-09T14:30:00.123456"), "09/03/2024");
        assert_eq!(format_date(""), "N/A");
        assert_eq!(format_date("amanhã"), "amanhã");
    }
}
