//! Enrichment payloads returned by the Remote API `analyze` operation

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire sentinel for "score not available"
pub const NOT_AVAILABLE: &str = "N/A";

/// Popcorn score value
///
/// `NotAvailable` is a valid terminal answer, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopcornScore {
    NotAvailable,
    /// Score as reported, e.g. "95%"
    Value(String),
}

impl PopcornScore {
    pub fn from_wire(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case(NOT_AVAILABLE) {
            PopcornScore::NotAvailable
        } else {
            PopcornScore::Value(raw.to_string())
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            PopcornScore::NotAvailable => NOT_AVAILABLE,
            PopcornScore::Value(v) => v,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PopcornScore::Value(_))
    }
}

impl Serialize for PopcornScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for PopcornScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PopcornScore::from_wire(&raw))
    }
}

/// Popularity ("popcorn") score analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityScore {
    #[serde(rename = "popcorn_score")]
    pub score: PopcornScore,
    /// Vote count as reported; the backend omits it for some subjects
    #[serde(
        rename = "popcorn_votes",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub votes: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    }))
}

/// Emotional experience metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalMetrics {
    #[serde(alias = "action")]
    pub thrill: i64,
    #[serde(alias = "fun")]
    pub glee: i64,
    #[serde(alias = "romance")]
    pub love: i64,
    #[serde(alias = "tension")]
    pub terror: i64,
}

/// Narrative structure metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeMetrics {
    pub twist: i64,
    pub complexity: i64,
    pub pacing: i64,
    pub novelty: i64,
}

/// Content intensity (parental advisory) metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetrics {
    pub gore: i64,
    pub nudity: i64,
    pub profanity: i64,
    pub substance: i64,
}

/// Technical diagnostics metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalMetrics {
    pub cinematography: i64,
    pub score: i64,
    pub performance: i64,
    pub immersion: i64,
}

/// Upper bound of every composition metric
pub const METRIC_MAX: i64 = 100;

/// Four-group composition breakdown (sixteen 0-100 metrics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub emotional: EmotionalMetrics,
    pub narrative: NarrativeMetrics,
    pub content: ContentMetrics,
    pub technical: TechnicalMetrics,
}

impl Composition {
    /// All metrics as (group, name, value), in display order
    pub fn metrics(&self) -> [(&'static str, &'static str, i64); 16] {
        let e = &self.emotional;
        let n = &self.narrative;
        let c = &self.content;
        let t = &self.technical;
        [
            ("emotional", "thrill", e.thrill),
            ("emotional", "glee", e.glee),
            ("emotional", "love", e.love),
            ("emotional", "terror", e.terror),
            ("narrative", "twist", n.twist),
            ("narrative", "complexity", n.complexity),
            ("narrative", "pacing", n.pacing),
            ("narrative", "novelty", n.novelty),
            ("content", "gore", c.gore),
            ("content", "nudity", c.nudity),
            ("content", "profanity", c.profanity),
            ("content", "substance", c.substance),
            ("technical", "cinematography", t.cinematography),
            ("technical", "score", t.score),
            ("technical", "performance", t.performance),
            ("technical", "immersion", t.immersion),
        ]
    }

    /// Reject metrics outside 0-100
    ///
    /// Values are never clamped; an out-of-range value makes the whole payload
    /// a contract violation.
    pub fn validate(&self) -> Result<(), String> {
        let offending: Vec<String> = self
            .metrics()
            .iter()
            .filter(|(_, _, v)| !(0..=METRIC_MAX).contains(v))
            .map(|(group, name, v)| format!("{}.{}={}", group, name, v))
            .collect();

        if offending.is_empty() {
            Ok(())
        } else {
            Err(format!("metrics out of range [0,100]: {}", offending.join(", ")))
        }
    }
}

/// Long-form synopsis with separately labeled ending
///
/// Both texts may contain `**bold**` emphasis pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synopsis {
    pub full_plot: String,
    pub detailed_ending: String,
}
