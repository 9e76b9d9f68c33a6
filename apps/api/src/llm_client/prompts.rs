// Prompt templates for every Gemini call. Placeholders in braces are
// replaced with `str::replace` before sending.

/// Skill extraction prompt. Replace `{description}`.
pub const EXTRACT_SKILLS_PROMPT_TEMPLATE: &str = r#"
You are an expert HR professional and technical recruiter. Your task is to extract ALL relevant skills from the job description.

Instructions:
- Extract ALL technical skills, soft skills, tools, platforms, frameworks, libraries, programming languages, methodologies, certifications, etc.
- Include both explicit skills mentioned and implicit skills that would be required
- Include synonyms, abbreviations, and related terms (e.g., AI/artificial intelligence, ML/machine learning, JS/JavaScript)
- Consider industry-specific skills and domain knowledge
- Include both entry-level and advanced skills mentioned
- Return a comprehensive, comma-separated list with no duplicates
- Be thorough and capture every skill mentioned or implied

Job description:
"""{description}"""

Extract ALL skills:"#;

pub const EXTRACT_SKILLS_TEMPERATURE: f32 = 0.2;

/// Skill summary prompt. Replace `{skills}`.
pub const SUMMARIZE_SKILLS_PROMPT_TEMPLATE: &str = r#"
You are an expert career consultant and HR professional. Create a comprehensive skill summary for a candidate.

Instructions:
- Analyze the skill list thoroughly
- Identify the candidate's primary strengths and expertise areas
- Highlight any unique or specialized skills
- Consider the overall skill level and breadth
- Write 2-3 detailed sentences that capture the candidate's professional profile
- Be specific about their technical capabilities and experience level

Skills: {skills}

Provide a detailed skill summary:"#;

pub const SUMMARIZE_SKILLS_TEMPERATURE: f32 = 0.4;

/// Interview feedback review prompt. Replace `{feedback}`.
pub const ANALYZE_FEEDBACK_PROMPT_TEMPLATE: &str = r#"
You're an expert evaluating interview feedback quality.

Here is candidate interview feedback:
"""{feedback}"""
Does this feedback suggest any of the following?
- Poor technical skills
- Negative attitude
- Lack of communication
- Not a strong candidate
Answer with one of the following and explain why:
- ✅ Suitable based on feedback
- ⚠️ Warning: Some concerns found
- ❌ Not suitable based on feedback"#;

pub const ANALYZE_FEEDBACK_TEMPERATURE: f32 = 0.3;
