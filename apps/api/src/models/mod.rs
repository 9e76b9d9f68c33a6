pub mod candidate;

pub use candidate::{Candidate, CandidateRow, EnrichedCandidate, Feedback, MatchedCandidate};
