// Malaw Guard Core Services

pub mod alert_store;
pub mod detection;
pub mod quiz;
pub mod text_processor;

pub use alert_store::*;
pub use quiz::*;
pub use text_processor::*;

// Re-export detection module items
pub use detection::{
    extract_features,
    fallback_rule_score,
    scan_rules,
    score_text,
    train_model,
    AnalyzeError,
    Analyzer,
    Engine,
    HeuristicScore,
    NeuralEngine,
};
