pub const REFINE_SYSTEM: &str = "You are a senior technical recruiter reviewing an automated \
    resume-to-job match. You MUST respond with valid JSON only, with no text outside the JSON \
    object and no markdown code fences.";

/// Placeholders: {job_title}, {company}, {keyword_score}, {matched}, {missing},
/// {job_text}, {resume_text}, {untrusted}.
pub const REFINE_PROMPT_TEMPLATE: &str = "\
{untrusted}

Job: {job_title} at {company}
Keyword match score: {keyword_score}/100
Matched skills: {matched}
Missing skills: {missing}

JOB DESCRIPTION:
{job_text}

RESUME:
{resume_text}

The keyword score only counts literal skill overlap. Judge whether it under- or \
over-states the fit (transferable skills, seniority, depth of experience) and return:
{\"adjustment\": <integer between -15 and 15>, \"analysis\": \"<2-3 sentence assessment: key strengths, main gaps, recommendation>\"}";
