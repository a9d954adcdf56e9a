// Detection Module
// SMS scam scoring organized into specialized submodules:
// - keyword_rules: weighted substring heuristic over the rule table
// - features: numeric feature extraction for the classifier
// - classifier: toy network trained at runtime, with rule fallback
// - analyzer: engine selection, thresholding and alert emission

pub mod analyzer;
pub mod classifier;
pub mod features;
pub mod keyword_rules;

// Re-export commonly used items
pub use analyzer::{
    AnalyzeError,
    Analyzer,
    Engine,
    KEYWORD_ALERT_THRESHOLD,
    NEURAL_ALERT_THRESHOLD,
};
pub use classifier::{
    fallback_rule_score,
    train_model,
    ClassifierError,
    NeuralEngine,
    TrainedModel,
    DEFAULT_SEED,
    TRAIN_SET,
};
pub use features::{extract_features, MinMaxBasis};
pub use keyword_rules::{
    scan_rules,
    score_text,
    HeuristicScore,
    RULES,
    SCORE_NORMALIZER,
    UNKNOWN_CATEGORY,
};
