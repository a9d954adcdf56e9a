// Text Processing Service
// Normalization and tokenization shared by both scanners

/// Fold one accented Latin character to its unaccented base.
/// Covers the Latin-1 / Latin Extended-A range seen in French SMS text.
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

/// Lowercase and strip diacritics. Applied uniformly before keyword
/// matching so "Vérifiez" and "verifiez" hit the same rule.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_diacritic)
        .collect()
}

/// Normalize, strip everything outside [a-z0-9] and whitespace, then split
/// on whitespace. Empty tokens are discarded.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Raw whitespace tokens, case preserved. Used by feature extraction where
/// capitalization itself is a signal.
pub fn raw_tokens(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
