//! Section generators — pure functions turning structured content into LaTeX
//! fragments that drop into the template placeholders.
//!
//! Every user-supplied string passes through `escape_latex`; link targets pass
//! through `escape_url`. Empty input yields an empty fragment.

use std::fmt::Write;

use crate::models::resume::{Certification, EducationEntry, ResumeBlock, SkillCategory};
use crate::render::escape::{escape_latex, escape_opt, escape_url};

const ROW_BEGIN: &str = "\\begin{tabular*}{1.0\\textwidth}[b]{l@{\\extracolsep{\\fill}}r}\n";
const ROW_END: &str = "\\end{tabular*}\n";
const BULLETS_BEGIN: &str = "\\begin{itemize}[leftmargin=\\bulletIndent]\n";
const BULLETS_END: &str = "\\end{itemize}\\vspace{\\vspaceAfterBullets}\n\n";

/// Scale printed after a bare GPA value ("3.9" → "GPA: 3.9/4.0").
const GPA_SCALE: &str = "4.0";

// ────────────────────────────────────────────────────────────────────────────
// Experience & projects
// ────────────────────────────────────────────────────────────────────────────

pub fn experience_section(experiences: &[ResumeBlock]) -> String {
    let mut latex = String::new();
    for experience in experiences {
        latex.push_str("\\item\n");

        latex.push_str(ROW_BEGIN);
        let _ = writeln!(
            latex,
            "\\textbf{{{}}} & {}",
            escape_opt(experience.company.as_deref()),
            escape_opt(experience.location.as_deref())
        );
        latex.push_str(ROW_END);

        latex.push_str(ROW_BEGIN);
        let _ = writeln!(
            latex,
            "\\textit{{\\small {}}} & \\textit{{\\small {}}}",
            escape_latex(&experience.title),
            escape_opt(experience.date_range.as_deref())
        );
        latex.push_str(ROW_END);

        latex.push_str(BULLETS_BEGIN);
        if experience.has_sub_projects() {
            // Sub-project lines are flattened; a linked sub-project gets the
            // link glyph on its first line only.
            for project in &experience.projects {
                let link = non_blank(project.link.as_deref());
                for (i, line) in project.lines.iter().enumerate() {
                    let mut item = escape_latex(line);
                    if let (0, Some(link)) = (i, link) {
                        let _ = write!(
                            item,
                            " \\href{{{}}}{{\\textcolor{{blue}}{{\\faLink}}}}",
                            escape_url(link)
                        );
                    }
                    push_bullet(&mut latex, &item);
                }
            }
        } else {
            for line in &experience.lines {
                push_bullet(&mut latex, &escape_latex(line));
            }
        }
        latex.push_str(BULLETS_END);
    }
    latex
}

pub fn project_section(projects: &[ResumeBlock]) -> String {
    let mut latex = String::new();
    for project in projects {
        latex.push_str("\\item\n");

        let mut heading = format!(
            "\\textbf{{{}}} $|$ \\emph{{{}}}",
            escape_latex(&project.title),
            escape_opt(project.technologies.as_deref())
        );
        if let Some(link) = non_blank(project.link.as_deref()) {
            let _ = write!(
                heading,
                " $|$ \\href{{{}}}{{\\textcolor{{blue}}{{{}}}}}",
                escape_url(link),
                link_icon(link)
            );
        }

        latex.push_str(ROW_BEGIN);
        let _ = writeln!(latex, "\\small{heading} & {{}}");
        latex.push_str(ROW_END);

        latex.push_str(BULLETS_BEGIN);
        for line in &project.lines {
            push_bullet(&mut latex, &escape_latex(line));
        }
        latex.push_str(BULLETS_END);
    }
    latex
}

/// Picks the FontAwesome glyph shown for a project link.
pub fn link_icon(link: &str) -> &'static str {
    let link = link.to_lowercase();
    if link.contains("github.com") {
        "\\faGithub"
    } else if link.contains("linkedin.com") {
        "\\faLinkedin"
    } else if link.contains("figma.com") {
        "\\faFigma"
    } else {
        "\\faLink"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills, education, certifications
// ────────────────────────────────────────────────────────────────────────────

pub fn skills_section(skills: &[SkillCategory]) -> String {
    if skills.is_empty() {
        return String::new();
    }
    let mut latex = String::from(BULLETS_BEGIN);
    for category in skills {
        let listed: Vec<String> = category
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(escape_latex)
            .collect();
        let _ = writeln!(
            latex,
            "\\bulletItem{{\\textbf{{{}:}} {}}}",
            escape_latex(category.category.trim()),
            listed.join(", ")
        );
    }
    latex.push_str(BULLETS_END);
    latex
}

pub fn education_section(education: &[EducationEntry]) -> String {
    let mut latex = String::new();
    for entry in education {
        latex.push_str("\\item\n");

        latex.push_str(ROW_BEGIN);
        let _ = writeln!(
            latex,
            "\\textbf{{{}}} & {}",
            escape_latex(&entry.institution),
            escape_opt(entry.location.as_deref())
        );
        latex.push_str(ROW_END);

        let mut degree = escape_latex(&entry.degree);
        if let Some(gpa) = non_blank(entry.gpa.as_deref()) {
            let _ = write!(degree, "; GPA: {}", format_gpa(gpa));
        }

        latex.push_str(ROW_BEGIN);
        let _ = writeln!(
            latex,
            "\\textit{{\\small {}}} & \\textit{{\\small {}}}",
            degree,
            escape_opt(entry.date_range.as_deref())
        );
        latex.push_str(ROW_END);
        latex.push_str("\\vspace{\\vspaceAfterBullets}\n\n");
    }
    latex
}

pub fn certification_section(certifications: &[Certification]) -> String {
    if certifications.is_empty() {
        return String::new();
    }
    let mut latex = String::from(BULLETS_BEGIN);
    for cert in certifications {
        let mut item = format!("\\textbf{{{}}}", escape_latex(&cert.name));
        if let Some(issuer) = non_blank(cert.issuer.as_deref()) {
            let _ = write!(item, " -- {}", escape_latex(issuer));
        }
        if let Some(date) = non_blank(cert.date.as_deref()) {
            let _ = write!(item, " \\hfill \\textit{{{}}}", escape_latex(date));
        }
        if let Some(link) = non_blank(cert.link.as_deref()) {
            let _ = write!(
                item,
                " \\href{{{}}}{{\\textcolor{{blue}}{{\\faLink}}}}",
                escape_url(link)
            );
        }
        let _ = writeln!(latex, "\\bulletItem{{{item}}}");
    }
    latex.push_str(BULLETS_END);
    latex
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn push_bullet(latex: &mut String, item: &str) {
    let _ = writeln!(latex, "\\item\\small{{{item}}}");
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// "4.0" → "4.0/4.0"; values that already carry a scale are printed as given.
fn format_gpa(gpa: &str) -> String {
    if gpa.contains('/') {
        escape_latex(gpa)
    } else {
        format!("{}/{GPA_SCALE}", escape_latex(gpa))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::SubProject;

    fn experience() -> ResumeBlock {
        let mut block = ResumeBlock::new("exp-1", "Software Engineer");
        block.company = Some("Acme & Sons".into());
        block.location = Some("Raleigh, NC".into());
        block.date_range = Some("2021 -- 2023".into());
        block.lines = vec!["Cut latency by 40%".into(), "Owned CI_CD".into()];
        block
    }

    #[test]
    fn test_empty_inputs_render_empty() {
        assert_eq!(experience_section(&[]), "");
        assert_eq!(project_section(&[]), "");
        assert_eq!(skills_section(&[]), "");
        assert_eq!(education_section(&[]), "");
        assert_eq!(certification_section(&[]), "");
    }

    #[test]
    fn test_experience_rows_and_escaped_bullets() {
        let latex = experience_section(&[experience()]);
        assert!(latex.starts_with("\\item\n"));
        assert!(latex.contains("\\textbf{Acme \\& Sons} & Raleigh, NC"));
        assert!(latex.contains("\\textit{\\small Software Engineer} & \\textit{\\small 2021 -- 2023}"));
        assert!(latex.contains("\\item\\small{Cut latency by 40\\%}"));
        assert!(latex.contains("\\item\\small{Owned CI\\_CD}"));
        assert!(latex.ends_with(BULLETS_END));
    }

    #[test]
    fn test_sub_projects_replace_plain_lines() {
        let mut block = experience();
        block.projects = vec![
            SubProject {
                tags: vec![],
                lines: vec!["Built ingest".into(), "Tuned queries".into()],
                link: Some("https://github.com/acme/ingest".into()),
            },
            SubProject {
                tags: vec![],
                lines: vec!["Wrote runbooks".into()],
                link: None,
            },
        ];
        let latex = experience_section(&[block]);

        assert!(!latex.contains("Cut latency"));
        assert!(latex.contains(
            "\\item\\small{Built ingest \\href{https://github.com/acme/ingest}{\\textcolor{blue}{\\faLink}}}"
        ));
        assert!(latex.contains("\\item\\small{Tuned queries}\n"));
        assert!(latex.contains("\\item\\small{Wrote runbooks}\n"));
        assert_eq!(latex.matches("\\faLink").count(), 1);
    }

    #[test]
    fn test_project_heading_with_icon() {
        let mut project = ResumeBlock::new("p1", "Tailor");
        project.technologies = Some("Rust, Axum".into());
        project.link = Some(" https://github.com/me/tailor ".into());
        project.lines = vec!["Ranks résumé blocks".into()];

        let latex = project_section(&[project]);
        assert!(latex.contains(
            "\\small\\textbf{Tailor} $|$ \\emph{Rust, Axum} $|$ \\href{https://github.com/me/tailor}{\\textcolor{blue}{\\faGithub}} & {}"
        ));
        assert!(latex.contains("\\item\\small{Ranks résumé blocks}"));
    }

    #[test]
    fn test_project_without_link_has_no_href() {
        let mut project = ResumeBlock::new("p1", "Tailor");
        project.link = Some("   ".into());
        let latex = project_section(&[project]);
        assert!(!latex.contains("\\href"));
        assert!(latex.contains("\\emph{}"));
    }

    #[test]
    fn test_link_icon_by_domain() {
        assert_eq!(link_icon("https://github.com/x"), "\\faGithub");
        assert_eq!(link_icon("https://www.LinkedIn.com/in/x"), "\\faLinkedin");
        assert_eq!(link_icon("https://figma.com/file/x"), "\\faFigma");
        assert_eq!(link_icon("https://x.netlify.app"), "\\faLink");
    }

    #[test]
    fn test_skills_section() {
        let skills = vec![
            SkillCategory {
                category: "Languages".into(),
                skills: vec!["Java".into(), "C#".into(), " ".into()],
            },
            SkillCategory {
                category: "Skills & Technologies".into(),
                skills: vec!["React".into(), "Git & GitHub".into()],
            },
        ];
        let latex = skills_section(&skills);
        assert!(latex.contains("\\bulletItem{\\textbf{Languages:} Java, C\\#}"));
        assert!(latex.contains("\\textbf{Skills \\& Technologies:} React, Git \\& GitHub"));
        assert!(latex.contains("\\vspace{\\vspaceAfterBullets}"));
    }

    #[test]
    fn test_education_with_and_without_gpa() {
        let with_gpa = EducationEntry {
            id: "e1".into(),
            institution: "North Carolina State University".into(),
            location: Some("Raleigh, NC".into()),
            degree: "Master of Computer Science".into(),
            date_range: Some("2023 -- 2025".into()),
            gpa: Some("4.0".into()),
        };
        let latex = education_section(&[with_gpa.clone()]);
        assert!(latex.contains("\\textbf{North Carolina State University} & Raleigh, NC"));
        assert!(latex.contains("Master of Computer Science; GPA: 4.0/4.0"));
        assert!(latex.contains("\\textit{\\small"));

        let scaled = EducationEntry {
            gpa: Some("9.1/10".into()),
            ..with_gpa.clone()
        };
        assert!(education_section(&[scaled]).contains("GPA: 9.1/10}"));

        for gpa in [None, Some("  ".to_string())] {
            let without = EducationEntry {
                gpa,
                ..with_gpa.clone()
            };
            assert!(!education_section(&[without]).contains("GPA:"));
        }
    }

    #[test]
    fn test_certification_section() {
        let cert = Certification {
            id: "c1".into(),
            name: "AWS Solutions Architect".into(),
            issuer: Some("Amazon".into()),
            date: Some("2024".into()),
            link: Some("https://aws.amazon.com/verify?id=1&x=2".into()),
        };
        let latex = certification_section(&[cert]);
        assert!(latex.contains("\\bulletItem{\\textbf{AWS Solutions Architect} -- Amazon \\hfill \\textit{2024}"));
        assert!(latex.contains("\\href{https://aws.amazon.com/verify?id=1\\&x=2}"));
    }
}
