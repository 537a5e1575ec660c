use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Term-normalization strategy. Each variant owns one index and is applied
/// to both documents and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[serde(alias = "unstemmed")]
    Identity,
    #[serde(rename = "porter")]
    PorterStem,
    #[serde(rename = "snowball")]
    SnowballStem,
    KGram4,
    KGram5,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Identity,
        Strategy::PorterStem,
        Strategy::SnowballStem,
        Strategy::KGram4,
        Strategy::KGram5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Identity => "identity",
            Strategy::PorterStem => "porter",
            Strategy::SnowballStem => "snowball",
            Strategy::KGram4 => "kgram4",
            Strategy::KGram5 => "kgram5",
        }
    }

    /// Window length for the k-gram variants.
    pub fn kgram_len(self) -> Option<usize> {
        match self {
            Strategy::KGram4 => Some(4),
            Strategy::KGram5 => Some(5),
            _ => None,
        }
    }

    /// Directory name of this strategy's index under the indices root.
    pub fn index_dir_name(self) -> String {
        format!("{}_index", self.as_str())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown strategy `{0}` (expected one of identity, porter, snowball, kgram4, kgram5)")]
pub struct UnknownStrategy(String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" | "unstemmed" => Ok(Strategy::Identity),
            "porter" => Ok(Strategy::PorterStem),
            "snowball" => Ok(Strategy::SnowballStem),
            "kgram4" => Ok(Strategy::KGram4),
            "kgram5" => Ok(Strategy::KGram5),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}
