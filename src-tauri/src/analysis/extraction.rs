//! Collector side: turn job-posting text into the `technologies` mapping that
//! `history.json` records.
//!
//! Matching uses a small controlled vocabulary (label → spelling variants).
//! A variant only counts when it is not glued to other letters or digits,
//! longer variants are tried first, and each label is counted at most once
//! per posting.

use crate::models::snapshot::JobPosting;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::HashSet;

const STANDARD_TERMS: &[(&str, &[&str])] = &[
    // Web / JS
    ("React", &["react", "reactjs", "react.js"]),
    ("Next.js", &["nextjs", "next.js"]),
    ("Vue.js", &["vue", "vuejs", "vue.js"]),
    ("Angular", &["angular"]),
    ("JavaScript", &["javascript", "js"]),
    ("TypeScript", &["typescript", "type script"]),
    // Back-end / languages
    ("Node.js", &["node", "nodejs", "node.js"]),
    ("Python", &["python"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("FastAPI", &["fastapi"]),
    (".NET", &[".net", "dotnet"]),
    ("C#", &["c#"]),
    ("Java", &["java"]),
    ("PHP", &["php"]),
    ("Ruby", &["ruby"]),
    ("Go", &["golang", "Go"]),
    ("C++", &["c++", "cpp"]),
    // Databases
    ("PostgreSQL", &["postgres", "postgresql"]),
    ("MySQL", &["mysql"]),
    ("SQL", &["sql"]),
    ("MongoDB", &["mongodb"]),
    ("Redis", &["redis"]),
    ("SQLite", &["sqlite"]),
    // DevOps / Cloud / OS
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("AWS", &["aws"]),
    ("Azure", &["azure"]),
    ("GCP", &["gcp"]),
    ("Linux", &["linux"]),
    ("Windows", &["windows"]),
    ("macOS", &["macos", "mac os"]),
    ("Bash/Shell", &["bash", "shell"]),
    ("CI/CD", &["ci/cd", "cicd", "continuous integration", "continuous deployment"]),
    ("DevOps", &["devops", "dev-ops"]),
    ("QA / Testing", &["qa", "testing", "test automation"]),
    ("Ubuntu", &["ubuntu"]),
    // Web basics / tools
    ("HTML", &["html"]),
    ("CSS", &["css"]),
    ("Sass/SCSS", &["sass", "scss"]),
    ("Git", &["git"]),
    ("Tailwind CSS", &["tailwind", "tailwindcss"]),
    ("GitHub", &["github"]),
    // Design
    ("Figma", &["figma"]),
    ("Adobe Photoshop", &["photoshop"]),
    ("Adobe Illustrator", &["illustrator"]),
    // Networking
    ("Cisco", &["cisco"]),
    // Other
    ("Salesforce", &["salesforce"]),
    ("Microsoft 365", &["microsoft 365", "office 365", "microsoft365"]),
    ("Power BI", &["power bi", "powerbi"]),
    ("Fortinet", &["fortinet"]),
    ("Active Directory", &["active directory", "ad"]),
];

/// (label, variant) pairs matched case-sensitively; "Go" must not match "go".
const CASE_SENSITIVE_VARIANTS: &[(&str, &str)] = &[("Go", "Go")];

/// Parent label → child labels suppressed when the parent is present.
const IMPLIES_DROP: &[(&str, &[&str])] = &[
    ("Tailwind CSS", &["CSS"]),
    ("React", &["JavaScript"]),
];

#[derive(Debug)]
struct VariantMatcher {
    label: String,
    regex: Regex,
    len: usize,
}

#[derive(Debug)]
pub struct TechVocabulary {
    matchers: Vec<VariantMatcher>,
}

impl TechVocabulary {
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(STANDARD_TERMS, CASE_SENSITIVE_VARIANTS)
    }

    pub fn new(terms: &[(&str, &[&str])], case_sensitive: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let mut matchers = Vec::new();
        for (label, variants) in terms {
            for variant in *variants {
                let pattern = format!(
                    "(?:^|[^A-Za-z0-9]){}(?:[^A-Za-z0-9]|$)",
                    regex::escape(variant)
                );
                let regex = RegexBuilder::new(&pattern)
                    .case_insensitive(!case_sensitive.contains(&(*label, *variant)))
                    .build()?;
                matchers.push(VariantMatcher {
                    label: label.to_string(),
                    regex,
                    len: variant.len(),
                });
            }
        }

        // Longest first so "postgresql" is tried before "sql".
        matchers.sort_by(|a, b| b.len.cmp(&a.len));
        Ok(Self { matchers })
    }

    /// Labels found in `text`, in match order, after implication suppression.
    pub fn find(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        for matcher in &self.matchers {
            if seen.contains(matcher.label.as_str()) {
                continue;
            }
            if matcher.regex.is_match(text) {
                seen.insert(matcher.label.as_str());
                found.push(matcher.label.clone());
            }
        }
        apply_implications(found)
    }

    /// A posting that mentions every found label once.
    pub fn posting_from_text(&self, text: &str) -> JobPosting {
        JobPosting::new(self.find(text).into_iter().map(|label| (label, 1)))
    }
}

/// Drop child labels whose parent label is also present, keeping order.
pub fn apply_implications(labels: Vec<String>) -> Vec<String> {
    let dropped: HashSet<&str> = IMPLIES_DROP
        .iter()
        .filter(|(parent, _)| labels.iter().any(|label| label == parent))
        .flat_map(|(_, children)| children.iter().copied())
        .collect();

    labels
        .iter()
        .filter(|label| !dropped.contains(label.as_str()))
        .cloned()
        .collect()
}

/// Plain text from posting HTML: entities decoded, tags removed, list
/// separators and dashes turned into spaces so tokens do not glue together,
/// whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    let text = remove_tags(&decode_entities(html));

    let spaced: String = text
        .chars()
        .map(|c| match c {
            ',' | ';' | '/' | '-' | '–' | '—' => ' ',
            _ => c,
        })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace every `<...>` run (at least one character between the brackets)
/// with a space. A `<` without a later `>` is ordinary text, e.g. "<5 years".
fn remove_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match candidate[1..].find('>') {
            Some(0) => {
                out.push('<');
                rest = &candidate[1..];
            }
            Some(end) => {
                out.push(' ');
                rest = &candidate[end + 2..];
            }
            None => {
                out.push_str(candidate);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let decoded = candidate
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&candidate[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "shy" => Some('\u{AD}'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "hellip" => Some('…'),
        "bull" => Some('•'),
        "middot" => Some('·'),
        "lsquo" => Some('‘'),
        "rsquo" => Some('’'),
        "ldquo" => Some('“'),
        "rdquo" => Some('”'),
        "laquo" => Some('«'),
        "raquo" => Some('»'),
        "bdquo" => Some('„'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        "trade" => Some('™'),
        "euro" => Some('€'),
        "times" => Some('×'),
        "deg" => Some('°'),
        // Icelandic letters and the other accents the job board emits.
        "aacute" => Some('á'),
        "Aacute" => Some('Á'),
        "eacute" => Some('é'),
        "Eacute" => Some('É'),
        "iacute" => Some('í'),
        "Iacute" => Some('Í'),
        "oacute" => Some('ó'),
        "Oacute" => Some('Ó'),
        "uacute" => Some('ú'),
        "Uacute" => Some('Ú'),
        "yacute" => Some('ý'),
        "Yacute" => Some('Ý'),
        "eth" => Some('ð'),
        "ETH" => Some('Ð'),
        "thorn" => Some('þ'),
        "THORN" => Some('Þ'),
        "aelig" => Some('æ'),
        "AElig" => Some('Æ'),
        "ouml" => Some('ö'),
        "Ouml" => Some('Ö'),
        "auml" => Some('ä'),
        "Auml" => Some('Ä'),
        "uuml" => Some('ü'),
        "Uuml" => Some('Ü'),
        "oslash" => Some('ø'),
        "Oslash" => Some('Ø'),
        "aring" => Some('å'),
        "Aring" => Some('Å'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Whether a job-board posting is filed under information technology.
pub fn is_it_job(job: &Value) -> bool {
    let Some(categories) = job.get("categories").and_then(Value::as_array) else {
        return false;
    };

    categories.iter().any(|category| {
        let name = field(category, "name").to_lowercase();
        let slug = field(category, "slug").to_lowercase();
        slug.contains("upplysingataekni")
            || name.contains("upplýsingatækni")
            || name.contains("information technology")
    })
}

/// High-signal text of a posting: title, body, qualification and
/// responsibility sections, and listed qualifications. Address and benefits
/// sections are left out.
pub fn build_text(job: &Value) -> String {
    let mut parts: Vec<String> = vec![field(job, "title").to_string()];

    let body = match field(job, "bodyhtml") {
        "" => field(job, "description"),
        body => body,
    };
    parts.push(body.to_string());

    for section in job
        .get("customSections")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let label = field(section, "label").to_lowercase();
        let title = field(section, "title").to_lowercase();
        let relevant = ["qualifications", "responsibilities"]
            .iter()
            .any(|k| label.contains(k))
            || ["menntunar", "hæfni", "verkefni"]
                .iter()
                .any(|k| title.contains(k));
        if relevant {
            parts.push(field(section, "content").to_string());
        }
    }

    for qualification in job
        .get("jobQualifications")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        match qualification {
            Value::Object(_) => parts.push(field(qualification, "description").to_string()),
            Value::String(s) => parts.push(s.clone()),
            other => parts.push(other.to_string()),
        }
    }

    let text = parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" \n ");
    strip_html(&text)
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vocabulary() -> TechVocabulary {
        TechVocabulary::standard().unwrap()
    }

    #[test]
    fn matches_only_on_word_boundaries() {
        let vocab = vocabulary();
        let found = vocab.find("We use Java and JSON, nothing else");
        assert!(found.contains(&"Java".to_string()));
        assert!(!found.contains(&"JavaScript".to_string()));

        let none = vocab.find("Adobe Lightroom and paddling");
        assert!(!none.contains(&"Active Directory".to_string()));
    }

    #[test]
    fn counts_each_label_once_and_prefers_longer_variants() {
        let found = vocabulary().find("PostgreSQL, postgres and more PostgreSQL");
        assert_eq!(found.iter().filter(|l| *l == "PostgreSQL").count(), 1);
        assert!(!found.contains(&"SQL".to_string()));
    }

    #[test]
    fn go_is_case_sensitive_but_golang_is_not() {
        let vocab = vocabulary();
        assert!(vocab.find("Experience with Go services").contains(&"Go".to_string()));
        assert!(vocab.find("GOLANG microservices").contains(&"Go".to_string()));
        assert!(!vocab.find("ready to go live").contains(&"Go".to_string()));
    }

    #[test]
    fn parent_labels_suppress_children() {
        let found = vocabulary().find("React, JavaScript, Tailwind and CSS");
        assert!(found.contains(&"React".to_string()));
        assert!(found.contains(&"Tailwind CSS".to_string()));
        assert!(!found.contains(&"JavaScript".to_string()));
        assert!(!found.contains(&"CSS".to_string()));
    }

    #[test]
    fn strips_tags_entities_and_separators() {
        let text = strip_html("<p>C++/PostgreSQL &amp; Docker&#8212;Kubernetes</p>\n<ul><li>AWS</li></ul>");
        assert_eq!(text, "C++ PostgreSQL & Docker Kubernetes AWS");
    }

    #[test]
    fn unterminated_angle_bracket_is_kept_as_text() {
        let text = strip_html("Experience <5 years with Python and Docker");
        assert_eq!(text, "Experience <5 years with Python and Docker");

        let found = vocabulary().find(&text);
        assert!(found.contains(&"Python".to_string()));
        assert!(found.contains(&"Docker".to_string()));

        let escaped = strip_html("<p>Experience &lt;5 years with Python</p>");
        assert_eq!(escaped, "Experience <5 years with Python");
        assert_eq!(strip_html("a <> b <i>c</i>"), "a <> b c");
    }

    #[test]
    fn decodes_icelandic_and_typographic_entities() {
        let text = strip_html("&THORN;j&oacute;nusta &ndash; Hugb&uacute;na&eth;ur&hellip; Kerfisfr&aelig;&eth;ingur");
        assert_eq!(text, "Þjónusta Hugbúnaður… Kerfisfræðingur");
    }

    #[test]
    fn posting_from_text_counts_one_per_label() {
        let posting = vocabulary().posting_from_text("python python django");
        assert_eq!(posting.technologies.get("Python"), Some(&1));
        assert_eq!(posting.technologies.get("Django"), Some(&1));
    }

    #[test]
    fn recognises_it_postings() {
        let it = json!({ "categories": [{ "name": "Upplýsingatækni", "slug": "upplysingataekni" }] });
        let other = json!({ "categories": [{ "name": "Sales", "slug": "sala" }] });
        assert!(is_it_job(&it));
        assert!(!is_it_job(&other));
        assert!(!is_it_job(&json!({})));
    }

    #[test]
    fn builds_text_from_relevant_sections_only() {
        let job = json!({
            "title": "Backend developer",
            "bodyhtml": "<p>Rust and Go</p>",
            "customSections": [
                { "label": "Qualifications", "content": "Kubernetes" },
                { "label": "Benefits", "content": "Free Figma licence" }
            ],
            "jobQualifications": [{ "description": "Docker" }, "Linux"]
        });

        let text = build_text(&job);
        assert!(text.contains("Kubernetes"));
        assert!(text.contains("Docker"));
        assert!(text.contains("Linux"));
        assert!(!text.contains("Figma"));
    }
}
