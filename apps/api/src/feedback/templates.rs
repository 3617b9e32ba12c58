//! Deterministic feedback content, used on its own or around an AI summary.

use crate::feedback::{ActionItem, FeedbackPriority, LongTermGoal, ProjectSuggestion, SkillImprovement};
use crate::scoring::Verdict;

const MAX_SKILL_IMPROVEMENTS: usize = 5;
const MAX_PROJECT_SUGGESTIONS: usize = 3;

pub fn overall_feedback(score: u8, verdict: Verdict) -> String {
    match verdict {
        Verdict::High => format!(
            "Congratulations! Your resume shows a strong match ({score}%) for this position. \
             Your technical skills and experience align well with the job requirements. \
             Continue building on your strengths and consider applying for similar roles."
        ),
        Verdict::Medium => format!(
            "Your resume shows a moderate match ({score}%) for this position. There are several \
             areas where you can strengthen your candidacy. Focus on developing the missing \
             skills and gaining relevant experience to improve your chances."
        ),
        Verdict::Low => format!(
            "While your current profile shows a lower match ({score}%) for this specific role, \
             there are clear paths to improve your candidacy. Focus on developing the key skills \
             and experience mentioned in the job requirements."
        ),
    }
}

pub fn priority(score: u8, verdict: Verdict) -> FeedbackPriority {
    if verdict == Verdict::Low || score < 40 {
        FeedbackPriority::High
    } else if verdict == Verdict::Medium || score < 70 {
        FeedbackPriority::Medium
    } else {
        FeedbackPriority::Low
    }
}

/// Learning resources for well-known skills.
fn skill_resources(skill: &str) -> Vec<String> {
    let resources: &[&str] = match skill {
        "python" => &[
            "Python for Data Science - Coursera",
            "Automate the Boring Stuff with Python",
            "Python.org Official Tutorial",
        ],
        "javascript" | "typescript" | "node.js" => &[
            "MDN Web Docs - JavaScript Guide",
            "Eloquent JavaScript",
            "TypeScript Handbook",
        ],
        "java" => &["Oracle Java Tutorials", "Effective Java by Joshua Bloch"],
        "rust" => &["The Rust Programming Language", "Rust by Example"],
        "react" => &["React Official Documentation", "React - The Complete Guide - Udemy"],
        "django" => &["Django Girls Tutorial", "Django Official Documentation"],
        "aws" => &[
            "AWS Skill Builder",
            "AWS Free Tier Hands-on Labs",
            "AWS Well-Architected Framework",
        ],
        "azure" => &["Microsoft Learn - Azure Fundamentals", "Azure Architecture Center"],
        "gcp" | "google cloud" => &["Google Cloud Skills Boost", "Google Cloud Documentation"],
        "docker" | "kubernetes" => &["Docker Getting Started Guide", "Kubernetes Basics Tutorial"],
        "sql" | "postgresql" | "mysql" => &["SQLBolt Interactive Lessons", "PostgreSQL Tutorial"],
        "leadership" => &[
            "Leadership and Management - Coursera",
            "Harvard Business Review Leadership Articles",
        ],
        "communication" => &["Effective Communication - Coursera", "Toastmasters International"],
        _ => &[],
    };
    resources.iter().map(|r| r.to_string()).collect()
}

pub fn skill_improvements(missing_skills: &[String]) -> Vec<SkillImprovement> {
    missing_skills
        .iter()
        .take(MAX_SKILL_IMPROVEMENTS)
        .map(|skill| SkillImprovement {
            skill: skill.clone(),
            current_level: "Not mentioned".to_string(),
            target_level: "Proficient".to_string(),
            suggestion: format!(
                "Focus on developing {skill} skills through hands-on projects and practice"
            ),
            timeline: "3-6 months".to_string(),
            resources: skill_resources(skill),
        })
        .collect()
}

pub fn project_suggestions(missing_skills: &[String]) -> Vec<ProjectSuggestion> {
    missing_skills
        .iter()
        .take(MAX_PROJECT_SUGGESTIONS)
        .map(|skill| ProjectSuggestion {
            project_type: format!("{skill} project"),
            description: format!(
                "Build a practical project using {skill} to demonstrate your skills"
            ),
            technologies: vec![skill.clone()],
            timeline: "1-2 months".to_string(),
            difficulty: "Intermediate".to_string(),
        })
        .collect()
}

pub fn immediate_actions(missing_skills: &[String], missing_certifications: &[String]) -> Vec<ActionItem> {
    let mut actions = vec![ActionItem {
        action: "Update Resume".to_string(),
        description: "Incorporate missing skills and keywords from the job description"
            .to_string(),
        timeline: "1 week".to_string(),
        priority: FeedbackPriority::High,
    }];

    if let Some(first) = missing_skills.first() {
        actions.push(ActionItem {
            action: "Start Skill Development".to_string(),
            description: format!("Begin learning {first} through online courses"),
            timeline: "2 weeks".to_string(),
            priority: FeedbackPriority::High,
        });
    }

    for cert in missing_certifications {
        actions.push(ActionItem {
            action: "Plan Certification".to_string(),
            description: format!("Prepare for the {cert} certification the role asks for"),
            timeline: "2-4 months".to_string(),
            priority: FeedbackPriority::Medium,
        });
    }

    actions.push(ActionItem {
        action: "Network and Research".to_string(),
        description: "Connect with professionals in the field and research the company"
            .to_string(),
        timeline: "1 week".to_string(),
        priority: FeedbackPriority::Medium,
    });
    actions
}

pub fn long_term_goals() -> Vec<LongTermGoal> {
    let goal = |goal: &str, description: &str, timeline: &str, milestones: &[&str]| LongTermGoal {
        goal: goal.to_string(),
        description: description.to_string(),
        timeline: timeline.to_string(),
        milestones: milestones.iter().map(|m| m.to_string()).collect(),
    };
    vec![
        goal(
            "Master Key Technologies",
            "Develop expertise in the technologies most relevant to your target roles",
            "6-12 months",
            &["Complete 3 projects", "Obtain 2 certifications", "Contribute to open source"],
        ),
        goal(
            "Build Relevant Experience",
            "Gain hands-on experience through projects, internships, or freelance work",
            "6-18 months",
            &["Complete 5 projects", "Work with 2 companies", "Build professional network"],
        ),
        goal(
            "Career Advancement",
            "Position yourself for senior roles and leadership opportunities",
            "1-3 years",
            &["Lead a team project", "Mentor junior developers", "Speak at conferences"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_priority_bands() {
        assert_eq!(priority(20, Verdict::Low), FeedbackPriority::High);
        assert_eq!(priority(67, Verdict::Medium), FeedbackPriority::Medium);
        assert_eq!(priority(90, Verdict::High), FeedbackPriority::Low);
        // custom thresholds can label a 35 as medium; the score still wins
        assert_eq!(priority(35, Verdict::Medium), FeedbackPriority::High);
    }

    #[test]
    fn test_overall_feedback_mentions_score() {
        assert!(overall_feedback(82, Verdict::High).contains("82%"));
        assert!(overall_feedback(50, Verdict::Medium).contains("moderate"));
        assert!(overall_feedback(10, Verdict::Low).contains("lower match"));
    }

    #[test]
    fn test_improvements_capped() {
        let missing = skills(&["aws", "docker", "go", "rust", "kafka", "terraform", "redis"]);
        assert_eq!(skill_improvements(&missing).len(), 5);
        assert_eq!(project_suggestions(&missing).len(), 3);
        assert!(!skill_improvements(&missing)[0].resources.is_empty());
    }

    #[test]
    fn test_immediate_actions_shape() {
        let none = immediate_actions(&[], &[]);
        assert_eq!(none.len(), 2);

        let actions = immediate_actions(&skills(&["aws"]), &skills(&["PMP"]));
        assert_eq!(actions.len(), 4);
        assert!(actions[1].description.contains("aws"));
        assert!(actions[2].description.contains("PMP"));
    }
}
