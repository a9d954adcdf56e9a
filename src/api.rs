// Command Layer
// Each user action maps to one async command over the services; no business
// logic lives here. Errors cross this boundary as display strings.

use crate::models::{AlertRecord, AnalysisReport, Question};
use crate::services::alert_store::AlertStore;
use crate::services::detection::{Analyzer, Engine};
use crate::services::quiz::question_bank;

/// Score a message with the selected engine, storing an alert when the
/// score crosses the engine threshold.
pub async fn analyze_text(
    analyzer: &mut Analyzer,
    store: Option<&AlertStore>,
    engine: &str,
    text: &str,
) -> Result<AnalysisReport, String> {
    analyzer
        .analyze(Engine::from_str(engine), text, store)
        .await
        .map_err(|e| e.to_string())
}

/// Stored alerts, most recent first.
pub fn list_alerts(store: &AlertStore) -> Result<Vec<AlertRecord>, String> {
    store.load().map_err(|e| e.to_string())
}

pub fn clear_alerts(store: &AlertStore) -> Result<(), String> {
    store.clear().map_err(|e| e.to_string())
}

/// The fixed awareness question bank, in asking order.
pub fn quiz_questions() -> Vec<Question> {
    question_bank()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_analyze_text_unknown_engine_defaults_to_keyword() {
        let mut analyzer = Analyzer::new();
        let report = analyze_text(&mut analyzer, None, "whatever", "RDV à 18h au restaurant")
            .await
            .unwrap();
        assert_eq!(report.engine, "keyword");
    }

    #[tokio::test]
    async fn test_analyze_text_surfaces_empty_input_error() {
        let mut analyzer = Analyzer::new();
        let err = analyze_text(&mut analyzer, None, "keyword", "")
            .await
            .unwrap_err();
        assert!(err.contains("vide"));
    }

    #[tokio::test]
    async fn test_alert_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        let mut analyzer = Analyzer::new();
        analyze_text(
            &mut analyzer,
            Some(&store),
            "keyword",
            "Gagnez 100000 FCFA avec Wave cliquez ici",
        )
        .await
        .unwrap();

        assert_eq!(list_alerts(&store).unwrap().len(), 1);
        clear_alerts(&store).unwrap();
        assert!(list_alerts(&store).unwrap().is_empty());
    }

    #[test]
    fn test_quiz_bank_is_complete() {
        assert_eq!(quiz_questions().len(), 10);
    }
}
