//! Wire-shaped fixtures
//!
//! Built from JSON so the fixtures also exercise the decoders.

use mel_lab::api::{Analysis, ResolveResponse};
use mel_lab::models::{CandidatePage, Composition, PopularityScore, Subject, Synopsis};
use serde_json::json;

pub const INCEPTION_ID: u64 = 27205;
pub const BATMAN_1989_ID: u64 = 268;
pub const GOT_ID: u64 = 1399;

pub fn inception() -> Subject {
    serde_json::from_value(json!({
        "tmdb_id": "27205",
        "media_type": "movie",
        "title": "Inception",
        "year": "2010",
        "rated": "PG-13",
        "plot": "A thief who steals corporate secrets through dream-sharing technology.",
        "poster": "https://image.tmdb.org/t/p/w500/inception.jpg",
        "vote_average": 8.4,
        "vote_count": 35000,
        "scores": {"imdb": "8.8", "metacritic": "74", "rotten_tomatoes_critic": "87%"},
        "genres": ["Action", "Science Fiction"],
        "cast": [{"name": "Leonardo DiCaprio"}, {"name": "Elliot Page"}],
        "tagline": "Your mind is the scene of the crime.",
        "recommendations": [
            {"id": 157336, "title": "Interstellar", "year": "2014", "media_type": "movie"}
        ],
        "director": "Christopher Nolan"
    }))
    .unwrap()
}

pub fn batman_1989() -> Subject {
    serde_json::from_value(json!({
        "tmdb_id": BATMAN_1989_ID,
        "media_type": "movie",
        "title": "Batman",
        "year": "1989"
    }))
    .unwrap()
}

pub fn game_of_thrones() -> Subject {
    serde_json::from_value(json!({
        "tmdb_id": GOT_ID,
        "media_type": "tv",
        "title": "Game of Thrones",
        "year": "2011 - 2019",
        "collection": {
            "name": "Season Manifest",
            "parts": [
                {"id": 3624, "title": "Season 1", "year": "2011 | 10 Eps", "media_type": "tv_season"},
                {"id": 3625, "title": "Season 2", "year": "2012 | 10 Eps", "media_type": "tv_season"}
            ]
        }
    }))
    .unwrap()
}

/// Five "Batman" candidates, page 1 of 4
pub fn batman_page() -> CandidatePage {
    serde_json::from_value(json!({
        "candidates": [
            {"id": 268, "title": "Batman", "year": "1989", "media_type": "movie", "overview": ""},
            {"id": 2661, "title": "Batman", "year": "1966", "media_type": "movie", "overview": ""},
            {"id": 2287, "title": "Batman", "year": "1966", "media_type": "tv", "overview": ""},
            {"id": 414906, "title": "The Batman", "year": "2022", "media_type": "movie", "overview": ""},
            {"id": 272, "title": "Batman Begins", "year": "2005", "media_type": "movie", "overview": ""}
        ],
        "page": 1,
        "total_pages": 4
    }))
    .unwrap()
}

pub fn resolved(subject: Subject) -> ResolveResponse {
    ResolveResponse::Resolved(Box::new(subject))
}

pub fn score(popcorn_score: &str, votes: &str) -> Analysis {
    Analysis::Score(
        serde_json::from_value::<PopularityScore>(json!({
            "popcorn_score": popcorn_score,
            "popcorn_votes": votes
        }))
        .unwrap(),
    )
}

pub fn composition_value(v: i64) -> Composition {
    serde_json::from_value(json!({
        "emotional": {"thrill": v, "glee": v, "love": v, "terror": v},
        "narrative": {"twist": v, "complexity": v, "pacing": v, "novelty": v},
        "content": {"gore": v, "nudity": v, "profanity": v, "substance": v},
        "technical": {"cinematography": v, "score": v, "performance": v, "immersion": v}
    }))
    .unwrap()
}

pub fn synopsis(plot: &str) -> Analysis {
    Analysis::Synopsis(Synopsis {
        full_plot: plot.to_string(),
        detailed_ending: "The top **keeps spinning**.".to_string(),
    })
}
