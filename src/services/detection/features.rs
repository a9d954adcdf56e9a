// Feature Extraction
// Turns a raw message into the fixed-size numeric vector the classifier eats

use regex::Regex;

use crate::models::{FeatureVector, FEATURE_COUNT};
use crate::services::text_processor::{raw_tokens, tokenize};

/// Substring patterns that count as "contains a link".
const URL_PATTERNS: &[&str] = &[
    "http://",
    "https://",
    "www.",
    ".com",
    ".net",
    ".sn",
    "bit.ly",
    "tinyurl",
];

/// Tokens counted as suspicious, independent of the weighted rule table of
/// the keyword scanner. Pre-normalized.
const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "gagnez",
    "gagne",
    "felicitations",
    "gratuit",
    "cliquez",
    "lien",
    "compte",
    "suspendu",
    "bloque",
    "verifiez",
    "connectez",
    "urgent",
    "prix",
    "fcfa",
    "wave",
    "bancaire",
    "iphone",
];

fn is_caps_token(token: &str) -> bool {
    if token.chars().count() <= 1 {
        return false;
    }
    let mut has_alpha = false;
    for c in token.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

/// Extract the 7 counting features from raw text.
pub fn extract_features(text: &str) -> FeatureVector {
    let lower = text.to_lowercase();
    let tokens = tokenize(text);

    let digit_re = Regex::new(r"\d").unwrap();
    let digit_count = digit_re.find_iter(text).count() as f64;

    let url_flag = if URL_PATTERNS.iter().any(|p| lower.contains(p)) {
        1.0
    } else {
        0.0
    };

    let exclamation_count = text.chars().filter(|c| *c == '!').count() as f64;

    let caps_token_count = raw_tokens(text)
        .iter()
        .filter(|t| is_caps_token(t))
        .count() as f64;

    let keyword_hits = tokens
        .iter()
        .filter(|t| SUSPICIOUS_KEYWORDS.contains(&t.as_str()))
        .count() as f64;

    FeatureVector {
        token_count: tokens.len() as f64,
        char_count: text.chars().count() as f64,
        digit_count,
        url_flag,
        exclamation_count,
        caps_token_count,
        keyword_hits,
    }
}

/// Column-wise min/max scaling basis. Fitted once over the embedded
/// training set; new inputs are scaled against that fixed basis and clamped
/// into [0, 1] so a single extreme message cannot stretch the scale.
#[derive(Debug, Clone)]
pub struct MinMaxBasis {
    min: [f64; FEATURE_COUNT],
    max: [f64; FEATURE_COUNT],
}

impl MinMaxBasis {
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> Self {
        let mut min = [f64::INFINITY; FEATURE_COUNT];
        let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
        for row in rows {
            for (i, v) in row.iter().enumerate() {
                min[i] = min[i].min(*v);
                max[i] = max[i].max(*v);
            }
        }
        for i in 0..FEATURE_COUNT {
            if !min[i].is_finite() {
                min[i] = 0.0;
            }
            if !max[i].is_finite() {
                max[i] = 0.0;
            }
        }
        Self { min, max }
    }

    pub fn apply(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let span = self.max[i] - self.min[i];
            out[i] = if span > 0.0 {
                ((row[i] - self.min[i]) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        out
    }
}
