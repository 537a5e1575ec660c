//! Stemming capabilities used by the stemmed and k-gram strategies.
//!
//! Two variants are provided: the classic Porter (1980) algorithm and the
//! Snowball English stemmer from `rust-stemmers`.

use rust_stemmers::{Algorithm, Stemmer as SnowballAlgorithm};

pub trait Stem {
    /// Maps a lowercased token to its stem.
    fn stem(&self, token: &str) -> String;
}

pub struct SnowballStemmer {
    inner: SnowballAlgorithm,
}

impl SnowballStemmer {
    pub fn english() -> Self {
        Self { inner: SnowballAlgorithm::create(Algorithm::English) }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self { Self::english() }
}

impl Stem for SnowballStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}

/// Classic Porter stemmer over ASCII words. Tokens containing anything other
/// than ASCII lowercase letters are returned unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PorterStemmer;

impl Stem for PorterStemmer {
    fn stem(&self, token: &str) -> String {
        if token.len() <= 2 || !token.bytes().all(|b| b.is_ascii_lowercase()) {
            return token.to_string();
        }
        let mut w = token.as_bytes().to_vec();
        step_1a(&mut w);
        step_1b(&mut w);
        step_1c(&mut w);
        step_2(&mut w);
        step_3(&mut w);
        step_4(&mut w);
        step_5a(&mut w);
        step_5b(&mut w);
        // only ASCII letters are ever removed or appended
        String::from_utf8(w).unwrap_or_else(|_| token.to_string())
    }
}

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of VC sequences in `[C](VC)^m[V]`.
fn measure(w: &[u8]) -> usize {
    let n = w.len();
    let mut i = 0;
    while i < n && is_consonant(w, i) {
        i += 1;
    }
    let mut m = 0;
    loop {
        while i < n && !is_consonant(w, i) {
            i += 1;
        }
        if i >= n {
            return m;
        }
        while i < n && is_consonant(w, i) {
            i += 1;
        }
        m += 1;
    }
}

fn contains_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn stem_of<'a>(w: &'a [u8], suffix: &str) -> Option<&'a [u8]> {
    w.strip_suffix(suffix.as_bytes())
}

fn replace(w: &mut Vec<u8>, suffix: &str, replacement: &str) {
    w.truncate(w.len() - suffix.len());
    w.extend_from_slice(replacement.as_bytes());
}

/// Applies the first rule whose suffix matches, provided the remaining stem
/// has a measure above `min_measure`. Later rules are not tried once a suffix matched.
fn apply_rules(w: &mut Vec<u8>, rules: &[(&str, &str)], min_measure: usize) {
    for &(suffix, replacement) in rules {
        if let Some(stem) = stem_of(w, suffix) {
            if measure(stem) > min_measure {
                replace(w, suffix, replacement);
            }
            return;
        }
    }
}

fn step_1a(w: &mut Vec<u8>) {
    if w.ends_with(b"sses") || w.ends_with(b"ies") {
        w.truncate(w.len() - 2);
    } else if !w.ends_with(b"ss") && w.ends_with(b"s") {
        w.pop();
    }
}

fn step_1b(w: &mut Vec<u8>) {
    if let Some(stem) = stem_of(w, "eed") {
        if measure(stem) > 0 {
            w.pop();
        }
        return;
    }
    let word: &[u8] = w;
    let suffix = ["ed", "ing"]
        .into_iter()
        .find(|s| stem_of(word, s).is_some_and(contains_vowel));
    let Some(suffix) = suffix else { return };
    w.truncate(w.len() - suffix.len());

    if w.ends_with(b"at") || w.ends_with(b"bl") || w.ends_with(b"iz") {
        w.push(b'e');
    } else if ends_double_consonant(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
        w.pop();
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

fn step_1c(w: &mut Vec<u8>) {
    if let Some(stem) = stem_of(w, "y") {
        if contains_vowel(stem) {
            let last = w.len() - 1;
            w[last] = b'i';
        }
    }
}

fn step_2(w: &mut Vec<u8>) {
    const RULES: &[(&str, &str)] = &[
        ("ational", "ate"), ("tional", "tion"), ("enci", "ence"), ("anci", "ance"),
        ("izer", "ize"), ("abli", "able"), ("alli", "al"), ("entli", "ent"),
        ("eli", "e"), ("ousli", "ous"), ("ization", "ize"), ("ation", "ate"),
        ("ator", "ate"), ("alism", "al"), ("iveness", "ive"), ("fulness", "ful"),
        ("ousness", "ous"), ("aliti", "al"), ("iviti", "ive"), ("biliti", "ble"),
    ];
    apply_rules(w, RULES, 0);
}

fn step_3(w: &mut Vec<u8>) {
    const RULES: &[(&str, &str)] = &[
        ("icate", "ic"), ("ative", ""), ("alize", "al"), ("iciti", "ic"),
        ("ical", "ic"), ("ful", ""), ("ness", ""),
    ];
    apply_rules(w, RULES, 0);
}

fn step_4(w: &mut Vec<u8>) {
    const RULES: &[(&str, &str)] = &[
        ("ement", ""), ("ment", ""), ("ent", ""), ("ance", ""), ("ence", ""),
        ("able", ""), ("ible", ""), ("ant", ""), ("ism", ""), ("ate", ""),
        ("iti", ""), ("ous", ""), ("ive", ""), ("ize", ""), ("al", ""),
        ("er", ""), ("ic", ""), ("ou", ""),
    ];
    if let Some(stem) = stem_of(w, "ion") {
        if matches!(stem.last(), Some(b's') | Some(b't')) {
            if measure(stem) > 1 {
                w.truncate(w.len() - 3);
            }
            return;
        }
    }
    apply_rules(w, RULES, 1);
}

fn step_5a(w: &mut Vec<u8>) {
    if let Some(stem) = stem_of(w, "e") {
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            w.pop();
        }
    }
}

fn step_5b(w: &mut Vec<u8>) {
    if measure(w) > 1 && ends_double_consonant(w) && w.ends_with(b"l") {
        w.pop();
    }
}
