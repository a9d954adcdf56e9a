// Malaw Guard Data Models
// Shared shapes for the quiz engine, the SMS scanners and the alert store

use serde::{Deserialize, Serialize};

// ============ Quiz ============

/// One awareness question. The bank is fixed at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMistake {
    pub question: String,
    /// Option text the user picked.
    pub user: String,
    /// Option text of the correct answer.
    pub correct: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub mistakes: Vec<QuizMistake>,
}

// ============ Keyword Scanner ============

/// One configured heuristic rule: any trigger hit contributes `weight` once.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub category: &'static str,
    pub weight: f64,
}

/// A rule that fired on the analyzed text (at most one per rule).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub keyword: String,
    pub category: String,
    pub weight: f64,
}

// ============ Feature Vector ============

pub const FEATURE_COUNT: usize = 7;

/// Fixed-size numeric summary of a message, input to the toy classifier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub token_count: f64,
    pub char_count: f64,
    pub digit_count: f64,
    pub url_flag: f64,
    pub exclamation_count: f64,
    pub caps_token_count: f64,
    pub keyword_hits: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.token_count,
            self.char_count,
            self.digit_count,
            self.url_flag,
            self.exclamation_count,
            self.caps_token_count,
            self.keyword_hits,
        ]
    }
}

// ============ Analysis Report ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Scoring strategy that produced the score ("keyword", "neural" or
    /// "neural_fallback" when training failed).
    pub engine: String,
    /// Suspicion score in [0, 1].
    pub score: f64,
    #[serde(default)]
    pub matches: Vec<RuleMatch>,
    /// Dominant category, "Inconnu" when nothing matched.
    pub category: String,
    /// Whether the score crossed the engine's detection threshold.
    pub flagged: bool,
    /// Whether a new alert record was actually inserted (false on duplicate
    /// or when storage was skipped).
    pub alert_stored: bool,
    pub latency_ms: i64,
}

// ============ Alert Record ============

/// A flagged message kept for later review. Field names on the wire match
/// the historical `alertes` storage format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(default = "new_record_id")]
    pub id: String,
    /// RFC 3339 timestamp of the detection.
    pub date: String,
    /// Original message text.
    pub description: String,
    #[serde(rename = "categorie")]
    pub category: String,
    #[serde(rename = "localisation", default = "default_location")]
    pub location: String,
    #[serde(rename = "statut", default = "default_status")]
    pub status: String,
    #[serde(rename = "anonyme", default = "default_true")]
    pub anonymous: bool,
    #[serde(default)]
    pub image: Option<String>,
    /// Confidence in percent, 0-100.
    #[serde(rename = "confiance")]
    pub confidence: u8,
}

impl AlertRecord {
    pub fn new(description: &str, category: &str, confidence: u8) -> Self {
        Self {
            id: new_record_id(),
            date: chrono::Utc::now().to_rfc3339(),
            description: description.to_string(),
            category: category.to_string(),
            location: default_location(),
            status: default_status(),
            anonymous: true,
            image: None,
            confidence,
        }
    }
}

// ============ Default Value Functions ============

fn default_true() -> bool { true }
fn default_location() -> String { "Non précisée".to_string() }
fn default_status() -> String { "Nouveau".to_string() }
fn new_record_id() -> String { uuid::Uuid::new_v4().to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_record_wire_format() {
        let record = AlertRecord::new("Gagnez un prix", "Phishing", 87);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"categorie\":\"Phishing\""));
        assert!(json.contains("\"statut\":\"Nouveau\""));
        assert!(json.contains("\"anonyme\":true"));
        assert!(json.contains("\"confiance\":87"));
    }

    #[test]
    fn test_alert_record_legacy_fields_default() {
        // Records written by older builds carry no id; they must still load.
        let json = r#"{
            "date": "2024-01-01T00:00:00Z",
            "description": "msg",
            "categorie": "Escroquerie",
            "confiance": 55
        }"#;
        let record: AlertRecord = serde_json::from_str(json).unwrap();
        assert!(!record.id.is_empty());
        assert_eq!(record.status, "Nouveau");
        assert_eq!(record.location, "Non précisée");
        assert!(record.anonymous);
        assert!(record.image.is_none());
    }
}
