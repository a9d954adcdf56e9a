// Analyzer Pipeline
// Runs the selected scoring engine and turns the score into a report + alert

use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{AlertRecord, AnalysisReport};
use crate::services::alert_store::{AlertStore, StoreError};
use crate::services::detection::classifier::{fallback_rule_score, NeuralEngine};
use crate::services::detection::features::extract_features;
use crate::services::detection::keyword_rules::score_text;

/// Keyword engine stores an alert at or above this score.
pub const KEYWORD_ALERT_THRESHOLD: f64 = 0.4;
/// Neural engine stores an alert at or above this score.
pub const NEURAL_ALERT_THRESHOLD: f64 = 0.5;

/// Category labels used by the neural engine, which has no rule categories.
const NEURAL_FLAGGED_CATEGORY: &str = "Phishing / Scam SMS";
const NEURAL_CLEAN_CATEGORY: &str = "Non suspect";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Engine {
    Keyword,
    Neural,
}

impl Engine {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "neural" | "model" => Self::Neural,
            _ => Self::Keyword,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Keyword => "keyword",
            Engine::Neural => "neural",
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("le message à analyser est vide")]
    EmptyInput,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the scoring engines across calls (the neural model is trained once
/// and cached until invalidated).
#[derive(Default)]
pub struct Analyzer {
    neural: NeuralEngine,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            neural: NeuralEngine::new(seed),
        }
    }

    /// Drop the cached neural model; the next neural analysis retrains.
    pub fn invalidate_model(&mut self) {
        self.neural.invalidate();
    }

    /// Score `text` with the selected engine and, when the score crosses the
    /// engine threshold and a store is given, append an alert record.
    /// Duplicate (description, category) pairs are reported as not stored.
    pub async fn analyze(
        &mut self,
        engine: Engine,
        text: &str,
        store: Option<&AlertStore>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AnalyzeError::EmptyInput);
        }

        let started = Instant::now();
        let (engine_name, score, matches, category, threshold) = match engine {
            Engine::Keyword => {
                let heuristic = score_text(trimmed);
                (
                    "keyword".to_string(),
                    heuristic.score,
                    heuristic.matches,
                    heuristic.category,
                    KEYWORD_ALERT_THRESHOLD,
                )
            }
            Engine::Neural => {
                let features = extract_features(trimmed);
                let (name, score) = match self.neural.score(&features).await {
                    Ok(p) => ("neural".to_string(), p),
                    Err(e) => {
                        warn!(error = %e, "neural scoring failed, using rule fallback");
                        ("neural_fallback".to_string(), fallback_rule_score(&features))
                    }
                };
                let category = if score >= NEURAL_ALERT_THRESHOLD {
                    NEURAL_FLAGGED_CATEGORY.to_string()
                } else {
                    NEURAL_CLEAN_CATEGORY.to_string()
                };
                (name, score, Vec::new(), category, NEURAL_ALERT_THRESHOLD)
            }
        };

        let flagged = score >= threshold;
        let mut alert_stored = false;
        if flagged {
            if let Some(store) = store {
                let confidence = (score * 100.0).round().clamp(0.0, 100.0) as u8;
                let record = AlertRecord::new(trimmed, &category, confidence);
                alert_stored = store.push(&record)?;
            }
        }

        let report = AnalysisReport {
            engine: engine_name,
            score,
            matches,
            category,
            flagged,
            alert_stored,
            latency_ms: started.elapsed().as_millis() as i64,
        };
        info!(
            engine = %report.engine,
            score = report.score,
            category = %report.category,
            flagged = report.flagged,
            stored = report.alert_stored,
            "analysis complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, AlertStore) {
        let dir = TempDir::new().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[tokio::test]
    async fn test_scam_message_is_flagged_and_stored() {
        let (_dir, store) = temp_store();
        let mut analyzer = Analyzer::new();
        let report = analyzer
            .analyze(
                Engine::Keyword,
                "Gagnez 100000 FCFA avec Wave cliquez ici",
                Some(&store),
            )
            .await
            .unwrap();
        assert!(report.flagged);
        assert!(report.alert_stored);
        assert_eq!(report.category, "Phishing");

        let alerts = store.load().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].description, "Gagnez 100000 FCFA avec Wave cliquez ici");
        assert_eq!(alerts[0].confidence, 96);
    }

    #[tokio::test]
    async fn test_duplicate_alert_is_not_stored_twice() {
        let (_dir, store) = temp_store();
        let mut analyzer = Analyzer::new();
        let text = "Félicitations vous avez gagné, cliquez ici";
        let first = analyzer
            .analyze(Engine::Keyword, text, Some(&store))
            .await
            .unwrap();
        assert!(first.alert_stored);
        let second = analyzer
            .analyze(Engine::Keyword, text, Some(&store))
            .await
            .unwrap();
        assert!(second.flagged);
        assert!(!second.alert_stored);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clean_message_stores_nothing() {
        let (_dir, store) = temp_store();
        let mut analyzer = Analyzer::new();
        let report = analyzer
            .analyze(Engine::Keyword, "RDV à 18h au restaurant", Some(&store))
            .await
            .unwrap();
        assert_eq!(report.score, 0.0);
        assert_eq!(report.category, "Inconnu");
        assert!(!report.flagged);
        assert!(!report.alert_stored);
        assert!(store.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let mut analyzer = Analyzer::new();
        let err = analyzer
            .analyze(Engine::Keyword, "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyInput));
    }

    #[tokio::test]
    async fn test_neural_engine_produces_probability() {
        let mut analyzer = Analyzer::new();
        let report = analyzer
            .analyze(Engine::Neural, "Votre compte bancaire est bloqué, connectez-vous ici", None)
            .await
            .unwrap();
        assert_eq!(report.engine, "neural");
        assert!((0.0..=1.0).contains(&report.score));
        assert!(report.matches.is_empty());
        assert!(!report.alert_stored);
    }
}
