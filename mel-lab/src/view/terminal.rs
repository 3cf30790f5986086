//! Plain-text rendering of workflow state for the CLI

use super::rich_text::{self, Span};
use crate::models::{CandidatePage, Composition, PopcornScore, PopularityScore, Subject, Synopsis};
use crate::orchestrator::{Enrichment, WorkflowState};
use std::fmt::Write;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render the whole state the way the CLI prints it
pub fn render_state(state: &WorkflowState) -> String {
    let mut out = String::new();

    if let Some(error) = &state.error {
        let _ = writeln!(out, "{}", error);
        return out;
    }
    if let Some(page) = state.candidates() {
        out.push_str(&render_candidates(page));
        return out;
    }
    if let Some(subject) = state.subject() {
        out.push_str(&render_subject(subject));
        out.push('\n');
        out.push_str(&render_popularity(&state.popularity));
        out.push('\n');
        out.push_str(&render_composition(&state.composition));
        if !matches!(state.synopsis, Enrichment::Idle) {
            out.push('\n');
            out.push_str(&render_synopsis(&state.synopsis));
        }
    }
    out
}

pub fn render_candidates(page: &CandidatePage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Page {} of {}", page.page, page.total_pages);
    for candidate in &page.candidates {
        let _ = writeln!(
            out,
            "  [{:>8}] {} ({}) {}",
            candidate.id, candidate.title, candidate.year, candidate.kind
        );
    }
    out
}

pub fn render_subject(subject: &Subject) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}{}{} ({}) [{}]",
        BOLD, subject.title, RESET, subject.year, subject.kind
    );
    if let Some(tagline) = &subject.tagline {
        let _ = writeln!(out, "  \"{}\"", tagline);
    }
    let _ = writeln!(out, "  Rated: {}", subject.rated);
    let _ = writeln!(
        out,
        "  Votes: {:.1} ({} votes)  IMDb: {}  Metacritic: {}  RT: {}",
        subject.vote_average,
        subject.vote_count,
        subject.scores.imdb,
        subject.scores.metacritic,
        subject.scores.rotten_tomatoes_critic
    );
    if !subject.genres.is_empty() {
        let _ = writeln!(out, "  Genres: {}", subject.genres.join(", "));
    }
    if let Some(director) = &subject.director {
        let _ = writeln!(out, "  Director: {}", director);
    }
    if let Some(creators) = &subject.creators {
        let _ = writeln!(out, "  Created by: {}", creators.join(", "));
    }
    if !subject.cast.is_empty() {
        let names: Vec<&str> = subject.cast.iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(out, "  Cast: {}", names.join(", "));
    }
    if let Some(plot) = &subject.plot {
        let _ = writeln!(out, "  {}", plot);
    }
    if let Some(awards) = &subject.awards {
        let _ = writeln!(out, "  Awards: {}", awards);
    }
    let seasons = subject.season_titles();
    if !seasons.is_empty() {
        let _ = writeln!(out, "  Seasons: {}", seasons.join(", "));
    }
    if let Some(recommendations) = &subject.recommendations {
        for r in recommendations {
            let _ = writeln!(out, "  See also: [{}] {} ({})", r.id, r.title, r.year);
        }
    }
    out
}

pub fn render_popularity(result: &Enrichment<PopularityScore>) -> String {
    match result {
        Enrichment::Idle => "Popcorn score: not requested\n".to_string(),
        Enrichment::Loading => "Popcorn score: loading...\n".to_string(),
        Enrichment::Exhausted => "Popcorn score: unavailable (request failed)\n".to_string(),
        Enrichment::Ready(score) => match &score.score {
            PopcornScore::NotAvailable => {
                "Popcorn score: N/A (no audience data yet, try again later)\n".to_string()
            }
            PopcornScore::Value(value) => match &score.votes {
                Some(votes) => format!("Popcorn score: {} ({} votes)\n", value, votes),
                None => format!("Popcorn score: {}\n", value),
            },
        },
    }
}

pub fn render_composition(result: &Enrichment<Composition>) -> String {
    match result {
        Enrichment::Idle => "Composition: not requested\n".to_string(),
        Enrichment::Loading => "Composition: loading...\n".to_string(),
        Enrichment::Exhausted => "Composition: unavailable (request failed)\n".to_string(),
        Enrichment::Ready(composition) => {
            let mut out = String::from("Composition:\n");
            let mut current_group = "";
            for (group, name, value) in composition.metrics() {
                if group != current_group {
                    let _ = writeln!(out, "  {}", group);
                    current_group = group;
                }
                let _ = writeln!(out, "    {:<15} {:>3} {}", name, value, bar(value));
            }
            out
        }
    }
}

fn bar(value: i64) -> String {
    "#".repeat(usize::try_from(value / 5).unwrap_or(0))
}

pub fn render_synopsis(result: &Enrichment<Synopsis>) -> String {
    match result {
        Enrichment::Idle => String::new(),
        Enrichment::Loading => "Synopsis: decrypting...\n".to_string(),
        Enrichment::Exhausted => "Synopsis: unavailable (request failed)\n".to_string(),
        Enrichment::Ready(synopsis) => {
            let mut out = String::from("Full plot:\n");
            out.push_str(&render_rich_text(&synopsis.full_plot));
            out.push_str("Ending:\n");
            out.push_str(&render_rich_text(&synopsis.detailed_ending));
            out
        }
    }
}

/// Render `**emphasis**` as ANSI bold, one paragraph per line
pub fn render_rich_text(text: &str) -> String {
    let mut out = String::new();
    for paragraph in rich_text::parse(text) {
        out.push_str("  ");
        for span in paragraph {
            match span {
                Span::Plain(t) => out.push_str(&t),
                Span::Emphasis(t) => {
                    let _ = write!(out, "{}{}{}", BOLD, t, RESET);
                }
            }
        }
        out.push('\n');
    }
    out
}
