//! Data model shared by the API adapter, orchestrator and views

pub mod analysis;
pub mod candidate;
pub mod subject;

pub use analysis::{Composition, PopcornScore, PopularityScore, Synopsis};
pub use candidate::{Candidate, CandidatePage};
pub use subject::{Collection, RefKind, Subject, SubjectId, SubjectKey, SubjectKind, SubjectRef};
