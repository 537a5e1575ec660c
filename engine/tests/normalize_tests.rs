use engine::stem::{PorterStemmer, SnowballStemmer, Stem};
use engine::{Normalizer, Strategy};

#[test]
fn it_stems_and_filters_stopwords() {
    let n = Normalizer::default();
    let tags = n.tags(Strategy::SnowballStem, "The runners were running, and the prices FELL.");
    let words: Vec<&str> = tags.string.split(' ').collect();
    assert!(words.contains(&"run"));
    assert!(words.contains(&"price"));
    assert!(!words.contains(&"the"));
    assert!(!words.contains(&"and"));
}

#[test]
fn stemming_is_idempotent_on_typical_tokens() {
    let porter = PorterStemmer;
    let snowball = SnowballStemmer::english();
    for word in ["running", "prices", "cats", "exports", "motoring", "hopping", "wheat"] {
        let p = porter.stem(word);
        assert_eq!(porter.stem(&p), p, "porter on {word}");
        let s = snowball.stem(word);
        assert_eq!(snowball.stem(&s), s, "snowball on {word}");
    }
}

#[test]
fn kgram_window_count_is_len_minus_k_plus_one() {
    let n = Normalizer::default();
    for (strategy, k) in [(Strategy::KGram4, 4), (Strategy::KGram5, 5)] {
        for word in ["oil", "wheat", "shipments", "interest"] {
            let tags = n.tags(strategy, word);
            let expected = word.len().saturating_sub(k - 1);
            assert_eq!(tags.emitted(), expected, "{word} with k={k}");
        }
    }
}

#[test]
fn banana_windows_collapse_only_in_the_set() {
    let n = Normalizer::default();
    let tags = n.tags(Strategy::KGram4, "banana");
    assert_eq!(tags.string, "bana anan nana");
    assert_eq!(tags.set.len(), 3);
    let twice = n.tags(Strategy::KGram4, "banana banana");
    assert_eq!(twice.emitted(), 6);
    assert_eq!(twice.set.len(), 3);
}

#[test]
fn every_strategy_transforms_queries_into_its_own_tags() {
    let n = Normalizer::default().with_kgram_query_stemming(false);
    for strategy in Strategy::ALL {
        let doc_tags = n.tags(strategy, "grain shipments");
        assert_eq!(n.transform_query("Grain Shipments", strategy), doc_tags.string, "{strategy}");
    }
}
