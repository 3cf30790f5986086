//! Subject (movie or series) record and cross-references
//!
//! Optional extension fields stay `Option` so that "absent" is distinct from
//! "present but empty" all the way to the presentation layer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque subject identifier
///
/// The resolve endpoint echoes the id it was given, so the wire value may be
/// a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(pub u64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SubjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for SubjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(SubjectId(n)),
            Raw::Text(s) => s
                .trim()
                .parse::<u64>()
                .map(SubjectId)
                .map_err(|_| serde::de::Error::custom(format!("invalid subject id '{}'", s))),
        }
    }
}

/// Kind of a resolvable subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv", alias = "series")]
    Series,
}

impl SubjectKind {
    /// Wire value used for the `type` query parameter
    pub fn as_wire(&self) -> &'static str {
        match self {
            SubjectKind::Movie => "movie",
            SubjectKind::Series => "tv",
        }
    }

    /// Parse a user or wire supplied kind
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "movie" | "film" => Some(SubjectKind::Movie),
            "tv" | "series" | "show" => Some(SubjectKind::Series),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// (id, kind) pair that identifies a subject for enrichment requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectKey {
    pub id: SubjectId,
    pub kind: SubjectKind,
}

/// Kind of a cross-reference embedded in a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv", alias = "series")]
    Series,
    /// Season entry of a series manifest (not independently resolvable)
    #[serde(rename = "tv_season")]
    Season,
}

impl RefKind {
    /// Selectable subject kind, `None` for seasons
    pub fn subject_kind(&self) -> Option<SubjectKind> {
        match self {
            RefKind::Movie => Some(SubjectKind::Movie),
            RefKind::Series => Some(SubjectKind::Series),
            RefKind::Season => None,
        }
    }
}

/// Lightweight link to another subject (recommendation, collection part, season)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRef {
    pub id: SubjectId,
    pub title: String,
    /// Release year, or "YYYY | N Eps" for seasons
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(rename = "media_type")]
    pub kind: RefKind,
}

/// Franchise collection (movies) or season manifest (series)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub parts: Vec<SubjectRef>,
}

impl Collection {
    /// Season titles, in manifest order
    pub fn season_titles(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter(|p| p.kind == RefKind::Season)
            .map(|p| p.title.as_str())
    }
}

/// External critic/aggregator scores ("N/A" when unknown)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalScores {
    #[serde(default = "not_available")]
    pub imdb: String,
    #[serde(default = "not_available")]
    pub metacritic: String,
    #[serde(default = "not_available")]
    pub rotten_tomatoes_critic: String,
}

impl Default for ExternalScores {
    fn default() -> Self {
        Self {
            imdb: not_available(),
            metacritic: not_available(),
            rotten_tomatoes_critic: not_available(),
        }
    }
}

/// Cast member entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

fn not_available() -> String {
    "N/A".to_string()
}

/// Fully resolved movie or series record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "tmdb_id")]
    pub id: SubjectId,
    #[serde(rename = "media_type")]
    pub kind: SubjectKind,
    pub title: String,
    /// Release year, or "YYYY - YYYY|Present" timeline for series
    #[serde(default)]
    pub year: String,
    #[serde(default = "not_available")]
    pub rated: String,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub scores: ExternalScores,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub production: Vec<String>,
    #[serde(default)]
    pub producers: Vec<String>,

    // Optional extension fields
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub awards: Option<String>,
    #[serde(default)]
    pub collection: Option<Collection>,
    #[serde(default)]
    pub recommendations: Option<Vec<SubjectRef>>,
    #[serde(default)]
    pub trailer_key: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    // Crew and production details (kind dependent)
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub revenue: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub creators: Option<Vec<String>>,
    #[serde(default)]
    pub networks: Option<Vec<String>>,
    #[serde(default)]
    pub cinematographers: Option<Vec<String>>,
    #[serde(default)]
    pub composers: Option<Vec<String>>,
}

impl Subject {
    pub fn key(&self) -> SubjectKey {
        SubjectKey {
            id: self.id,
            kind: self.kind,
        }
    }

    /// Season titles from the manifest (series only, empty otherwise)
    pub fn season_titles(&self) -> Vec<String> {
        match (&self.kind, &self.collection) {
            (SubjectKind::Series, Some(collection)) => {
                collection.season_titles().map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }
}
