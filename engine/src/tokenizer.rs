use crate::stopwords::StopwordSet;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
}

/// Analyzer for the full-text `title` and `body` fields: NFKC normalization,
/// lowercase, word extraction and stopword removal. No stemming.
pub fn analyze(text: &str, stopwords: &StopwordSet) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str().replace('\'', ""))
        .filter(|t| !t.is_empty() && !stopwords.contains(t))
        .collect()
}

/// Analyzer for the `tags` field: the tag string is already normalized.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_analyze() {
        let t = analyze("Crude OIL prices, the café's menu 1987", &StopwordSet::english());
        assert_eq!(t, vec!["crude", "oil", "prices", "cafés", "menu", "1987"]);
    }

    #[test]
    fn tags_are_split_verbatim() {
        assert_eq!(split_tags(" bana anan  nana "), vec!["bana", "anan", "nana"]);
    }
}
