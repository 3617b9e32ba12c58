pub const FEEDBACK_SYSTEM: &str =
    "You are a professional career counselor providing constructive feedback to job candidates.";

/// Placeholders: {untrusted}, {job_title}, {company}, {score}, {verdict},
/// {strengths}, {weaknesses}.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = "\
{untrusted}

Generate a professional, encouraging feedback message for a candidate based on their resume evaluation.

Job: {job_title} at {company}
Relevance score: {score}%
Fit verdict: {verdict}
Strengths: {strengths}
Areas for improvement: {weaknesses}

Write 2-3 short paragraphs that acknowledge their strengths, give constructive guidance on the \
areas for improvement, and encourage continued professional development. Plain text only.";
