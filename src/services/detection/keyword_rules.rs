// Keyword Heuristic Scanner
// Substring rules with per-category weights; deterministic, no model

use serde::{Deserialize, Serialize};

use crate::models::{KeywordRule, RuleMatch};
use crate::services::text_processor::normalize;

/// Matched weights are summed then divided by this constant and clamped to
/// [0, 1]: the score saturates, it is not a probability.
pub const SCORE_NORMALIZER: f64 = 2.5;

/// Category reported when no rule fires.
pub const UNKNOWN_CATEGORY: &str = "Inconnu";

/// Static rule table. Trigger substrings are stored pre-normalized
/// (lowercase, no diacritics) so they can be matched directly against
/// normalized input.
pub const RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &[
            "gagnez",
            "vous avez gagne",
            "felicitations",
            "tirage au sort",
            "loterie",
            "iphone gratuit",
        ],
        category: "Fraude concours",
        weight: 0.8,
    },
    KeywordRule {
        keywords: &[
            "fcfa",
            "wave",
            "orange money",
            "transfert d'argent",
            "remboursement",
            "recevoir votre prix",
        ],
        category: "Escroquerie",
        weight: 0.7,
    },
    KeywordRule {
        keywords: &[
            "cliquez ici",
            "cliquez sur ce lien",
            "verifiez maintenant",
            "connectez-vous ici",
            "confirmez votre compte",
            "mot de passe",
        ],
        category: "Phishing",
        weight: 0.9,
    },
    KeywordRule {
        keywords: &[
            "compte suspendu",
            "compte bloque",
            "compte bancaire",
            "votre banque",
            "service client",
        ],
        category: "Usurpation d'identité",
        weight: 0.6,
    },
    KeywordRule {
        keywords: &[
            "urgent",
            "immediatement",
            "dernier avertissement",
            "sous 24h",
            "avant ce soir",
        ],
        category: "Pression / urgence",
        weight: 0.5,
    },
    KeywordRule {
        keywords: &[
            "colis en attente",
            "frais de livraison",
            "frais de douane",
            "livraison bloquee",
        ],
        category: "Arnaque au colis",
        weight: 0.6,
    },
];

/// Heuristic scan result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicScore {
    /// Saturating score in [0, 1].
    pub score: f64,
    pub matches: Vec<RuleMatch>,
    /// Category with the greatest summed weight, "Inconnu" when no match.
    pub category: String,
}

/// Scan the rule table against the normalized text. Within a rule the scan
/// stops at the first trigger hit: a rule contributes at most once.
pub fn scan_rules(text: &str) -> Vec<RuleMatch> {
    let normalized = normalize(text);
    let mut matches = Vec::new();
    for rule in RULES {
        for keyword in rule.keywords {
            if normalized.contains(keyword) {
                matches.push(RuleMatch {
                    keyword: (*keyword).to_string(),
                    category: rule.category.to_string(),
                    weight: rule.weight,
                });
                break;
            }
        }
    }
    matches
}

/// Category with the greatest cumulative weight among the matches. Ties
/// resolve to the category that appeared first.
fn dominant_category(matches: &[RuleMatch]) -> String {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    for m in matches {
        match totals.iter_mut().find(|(cat, _)| *cat == m.category) {
            Some((_, w)) => *w += m.weight,
            None => totals.push((m.category.as_str(), m.weight)),
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (cat, w) in &totals {
        match best {
            Some((_, bw)) if *w <= bw => {}
            _ => best = Some((*cat, *w)),
        }
    }

    best.map(|(cat, _)| cat.to_string())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Run the full heuristic: match rules, sum weights, saturate.
pub fn score_text(text: &str) -> HeuristicScore {
    let matches = scan_rules(text);
    let raw: f64 = matches.iter().map(|m| m.weight).sum();
    let score = (raw / SCORE_NORMALIZER).clamp(0.0, 1.0);
    let category = dominant_category(&matches);
    HeuristicScore {
        score,
        matches,
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_scores_zero() {
        let result = score_text("RDV à 18h au restaurant");
        assert_eq!(result.score, 0.0);
        assert!(result.matches.is_empty());
        assert_eq!(result.category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_scam_text_matches_expected_rules() {
        let result = score_text("Gagnez 100000 FCFA avec Wave cliquez ici");
        let categories: Vec<&str> =
            result.matches.iter().map(|m| m.category.as_str()).collect();
        assert!(categories.contains(&"Fraude concours"));
        assert!(categories.contains(&"Escroquerie"));
        assert!(categories.contains(&"Phishing"));
        // 0.8 + 0.7 + 0.9 = 2.4 -> 0.96 after normalization
        assert!(result.score > 0.4);
        assert_eq!(result.category, "Phishing");
    }

    #[test]
    fn test_rule_contributes_at_most_once() {
        // Two triggers of the same rule must count a single time.
        let result = score_text("Gagnez vite, félicitations !");
        let concours: Vec<&RuleMatch> = result
            .matches
            .iter()
            .filter(|m| m.category == "Fraude concours")
            .collect();
        assert_eq!(concours.len(), 1);
        assert_eq!(concours[0].keyword, "gagnez");
    }

    #[test]
    fn test_score_saturates_at_one() {
        // Every rule fires; summed weights exceed the normalizer.
        let text = "URGENT felicitations vous avez gagne sur Wave, \
                    cliquez ici, compte suspendu, colis en attente";
        let result = score_text(text);
        assert_eq!(result.matches.len(), RULES.len());
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_matching_is_accent_insensitive() {
        let with_accents = score_text("FÉLICITATIONS, vérifiez maintenant");
        assert_eq!(with_accents.matches.len(), 2);
    }
}
