//! Skill dictionary and word-boundary skill matching.

use std::collections::BTreeSet;

/// Skill dictionary grouped by category. Entries are already normalized.
pub const SKILL_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "programming_languages",
        &[
            "python", "java", "javascript", "typescript", "c++", "c#", "go", "rust", "php",
            "ruby", "swift", "kotlin", "scala", "r", "matlab", "sql", "html", "css", "sass",
            "scss", "dart", "perl", "bash", "powershell",
        ],
    ),
    (
        "frameworks",
        &[
            "react", "angular", "vue", "django", "flask", "spring", "express", "laravel",
            "rails", "asp.net", "node.js", "fastapi", "tensorflow", "pytorch", "keras",
            "scikit-learn", "pandas", "numpy",
        ],
    ),
    (
        "databases",
        &[
            "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "cassandra", "oracle",
            "sqlite", "dynamodb", "neo4j", "influxdb", "couchdb",
        ],
    ),
    (
        "cloud_platforms",
        &["aws", "azure", "gcp", "google cloud", "heroku", "digitalocean", "linode"],
    ),
    (
        "tools",
        &[
            "docker", "kubernetes", "jenkins", "git", "github", "gitlab", "jira", "confluence",
            "terraform", "ansible", "figma", "postman", "swagger", "kafka", "linux",
        ],
    ),
    (
        "methodologies",
        &[
            "agile", "scrum", "kanban", "devops", "ci/cd", "tdd", "bdd", "microservices", "rest",
            "graphql", "serverless", "machine learning", "data analysis",
        ],
    ),
    (
        "soft_skills",
        &[
            "leadership", "communication", "teamwork", "problem solving", "analytical",
            "collaboration", "presentation", "negotiation", "mentoring", "project management",
        ],
    ),
];

/// Common spellings folded onto the dictionary form.
const ALIASES: &[(&str, &str)] = &[
    ("golang", "go"),
    ("js", "javascript"),
    ("k8s", "kubernetes"),
    ("nodejs", "node.js"),
    ("node", "node.js"),
    ("postgres", "postgresql"),
    ("problem-solving", "problem solving"),
    ("reactjs", "react"),
    ("scikit learn", "scikit-learn"),
    ("sklearn", "scikit-learn"),
    ("ts", "typescript"),
    ("vuejs", "vue"),
];

/// Lower-cases, trims, collapses inner whitespace and resolves aliases.
pub fn normalize_skill(raw: &str) -> String {
    let collapsed = raw
        .trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == collapsed)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(collapsed)
}

/// Normalizes a recruiter-supplied list, dropping blanks and duplicates.
pub fn normalize_skill_set<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|s| normalize_skill(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Dictionary skills present in `text`, matched on word boundaries.
pub fn extract_skills(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    let mut found = BTreeSet::new();

    for (_, skills) in SKILL_CATEGORIES {
        for skill in *skills {
            if contains_term(&lower, skill) {
                found.insert(skill.to_string());
            }
        }
    }
    for (alias, canonical) in ALIASES {
        if contains_term(&lower, alias) {
            found.insert(canonical.to_string());
        }
    }

    found
}

/// `+` and `#` count as word characters so `c` does not match inside `c++`.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '+' || c == '#'
}

/// Word-boundary containment for terms that may carry punctuation
/// (`c++`, `node.js`, `ci/cd`), which `\b` in a regex cannot express.
pub fn contains_term(haystack_lower: &str, term: &str) -> bool {
    haystack_lower.match_indices(term).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack_lower[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c) && c != '.');
        let after_ok = match haystack_lower[end..].chars().next() {
            None => true,
            // "node.js." ends a sentence; "asp.netcore" does not.
            Some('.') => haystack_lower[end + 1..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c)),
            Some(c) => !is_word_char(c),
        };
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_dictionary_skills() {
        let skills = extract_skills("Senior engineer: Python, SQL, AWS and Docker; some Kubernetes.");
        let expected: BTreeSet<String> = ["aws", "docker", "kubernetes", "python", "sql"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(skills, expected);
    }

    #[test]
    fn test_word_boundaries() {
        // "go" inside "google", "r" inside "rust", "java" inside "javascript"
        let skills = extract_skills("Google Cloud expert, Rust, JavaScript");
        assert!(skills.contains("google cloud"));
        assert!(skills.contains("rust"));
        assert!(skills.contains("javascript"));
        assert!(!skills.contains("go"));
        assert!(!skills.contains("r"));
        assert!(!skills.contains("java"));
    }

    #[test]
    fn test_punctuated_skills() {
        let skills = extract_skills("Wrote C++ and C# services, Node.js. CI/CD pipelines.");
        assert!(skills.contains("c++"));
        assert!(skills.contains("c#"));
        assert!(skills.contains("node.js"));
        assert!(skills.contains("ci/cd"));
        assert!(!skills.contains("r"));
    }

    #[test]
    fn test_aliases_fold_to_canonical() {
        let skills = extract_skills("Golang, k8s, Postgres");
        assert!(skills.contains("go"));
        assert!(skills.contains("kubernetes"));
        assert!(skills.contains("postgresql"));
    }

    #[test]
    fn test_normalize_skill_set() {
        let set = normalize_skill_set(["  Python ", "python", "Postgres", "", "Spring   Boot"]);
        let expected: BTreeSet<String> = ["postgresql", "python", "spring boot"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_empty_text_has_no_skills() {
        assert!(extract_skills("").is_empty());
    }
}
