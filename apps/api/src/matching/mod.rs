// Skill extraction from job descriptions and deterministic candidate matching.

pub mod extractor;
pub mod matcher;

pub use extractor::extract_skills;
pub use matcher::SkillMatcher;
