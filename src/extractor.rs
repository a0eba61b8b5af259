//! Detail page field extraction.
//!
//! Each field owns an ordered list of [`ClassRule`]s. Rules are tried in
//! order and the first element any rule matches supplies the field's text.
//! A field with no matching rule stays `None`; it never affects the others.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::models::{JobId, JobRecord};

/// Matches `<tag class="... token ...">` where some class token contains `class_contains`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRule {
    pub tag: String,
    pub class_contains: String,
}

impl ClassRule {
    pub fn new(tag: &str, class_contains: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class_contains: class_contains.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Company,
    Location,
    TimePosted,
    ApplicantCount,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Company,
        Field::Location,
        Field::TimePosted,
        Field::ApplicantCount,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "job title",
            Field::Company => "company name",
            Field::Location => "location",
            Field::TimePosted => "time posted",
            Field::ApplicantCount => "number of applicants",
        }
    }
}

/// Rule chains per field, overridable from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    pub title: Vec<ClassRule>,
    pub company: Vec<ClassRule>,
    pub location: Vec<ClassRule>,
    pub time_posted: Vec<ClassRule>,
    pub applicant_count: Vec<ClassRule>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            title: vec![
                ClassRule::new("h2", "top-card-layout__title"),
                ClassRule::new("h2", "title"),
            ],
            company: vec![
                ClassRule::new("a", "topcard__org-name-link"),
                ClassRule::new("span", "company-name"),
            ],
            location: vec![ClassRule::new("span", "location")],
            time_posted: vec![ClassRule::new("span", "posted-time")],
            applicant_count: vec![ClassRule::new("span", "num-applicants")],
        }
    }
}

impl FieldRules {
    pub fn rules_for(&self, field: Field) -> &[ClassRule] {
        match field {
            Field::Title => &self.title,
            Field::Company => &self.company,
            Field::Location => &self.location,
            Field::TimePosted => &self.time_posted,
            Field::ApplicantCount => &self.applicant_count,
        }
    }
}

/// Detail page fields before the identifier is attached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub time_posted: Option<String>,
    pub applicant_count: Option<String>,
}

impl ExtractedFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => self.title.as_deref(),
            Field::Company => self.company.as_deref(),
            Field::Location => self.location.as_deref(),
            Field::TimePosted => self.time_posted.as_deref(),
            Field::ApplicantCount => self.applicant_count.as_deref(),
        }
    }

    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Company => &mut self.company,
            Field::Location => &mut self.location,
            Field::TimePosted => &mut self.time_posted,
            Field::ApplicantCount => &mut self.applicant_count,
        };
        *slot = Some(value);
    }

    pub fn into_record(self, identifier: impl Into<JobId>) -> JobRecord {
        JobRecord {
            identifier: identifier.into(),
            title: self.title,
            company: self.company,
            location: self.location,
            time_posted: self.time_posted,
            applicant_count: self.applicant_count,
            fetch_error: None,
        }
    }
}

struct CompiledRule {
    selector: Selector,
    class_contains: String,
}

impl CompiledRule {
    fn matches(&self, element: &ElementRef) -> bool {
        element
            .value()
            .classes()
            .any(|class| class.contains(&self.class_contains))
    }
}

pub struct FieldExtractor {
    chains: Vec<(Field, Vec<CompiledRule>)>,
}

impl FieldExtractor {
    pub fn new(rules: &FieldRules) -> Result<Self> {
        let mut chains = Vec::with_capacity(Field::ALL.len());

        for field in Field::ALL {
            let mut compiled = Vec::new();
            for rule in rules.rules_for(field) {
                let selector = Selector::parse(&rule.tag).map_err(|e| {
                    anyhow!("Invalid tag '{}' in {} rule: {:?}", rule.tag, field.label(), e)
                })?;
                compiled.push(CompiledRule {
                    selector,
                    class_contains: rule.class_contains.clone(),
                });
            }
            chains.push((field, compiled));
        }

        Ok(Self { chains })
    }

    /// Extract every field independently from a detail page
    pub fn extract(&self, html: &str) -> ExtractedFields {
        let document = Html::parse_document(html);
        let mut fields = ExtractedFields::default();

        for (field, rules) in &self.chains {
            if let Some(value) = Self::first_match(&document, rules) {
                fields.set(*field, value);
            }
        }

        fields
    }

    fn first_match(document: &Html, rules: &[CompiledRule]) -> Option<String> {
        rules.iter().find_map(|rule| {
            document
                .select(&rule.selector)
                .find(|element| rule.matches(element))
                .map(|element| element.text().collect::<String>().trim().to_string())
        })
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        // Built-in tags are plain element names and always parse
        Self::new(&FieldRules::default()).unwrap_or(Self { chains: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r##"
        <html><body>
            <section class="top-card-layout">
                <h2 class="top-card-layout__title font-sans">  Data Analyst Intern </h2>
                <h4>
                    <a class="topcard__org-name-link topcard__flavor--black-link" href="/company/acme">
                        Acme Analytics
                    </a>
                    <span class="topcard__flavor topcard__flavor--bullet">Dublin, County Dublin, Ireland</span>
                </h4>
                <span class="posted-time-ago__text">2 weeks ago</span>
                <span class="num-applicants__caption">Over 200 applicants</span>
            </section>
        </body></html>
    "##;

    #[test]
    fn test_extracts_marked_fields() {
        let extractor = FieldExtractor::default();
        let fields = extractor.extract(DETAIL_PAGE);

        assert_eq!(fields.title.as_deref(), Some("Data Analyst Intern"));
        assert_eq!(fields.company.as_deref(), Some("Acme Analytics"));
        assert_eq!(fields.time_posted.as_deref(), Some("2 weeks ago"));
        assert_eq!(fields.applicant_count.as_deref(), Some("Over 200 applicants"));
        // "topcard__flavor" has no "location" token, so nothing matches here
        assert_eq!(fields.location, None);
    }

    #[test]
    fn test_only_title_present() {
        let html = r#"<html><body><h2 class="top-card-layout__title">Software Intern</h2></body></html>"#;
        let fields = FieldExtractor::default().extract(html);

        assert_eq!(fields.title.as_deref(), Some("Software Intern"));
        assert!(fields.company.is_none());
        assert!(fields.location.is_none());
        assert!(fields.time_posted.is_none());
        assert!(fields.applicant_count.is_none());
    }

    #[test]
    fn test_fallback_rule_used_when_primary_missing() {
        let html = r#"
            <h2 class="sub-title">Backend Engineer</h2>
            <span class="company-name">Globex</span>
            <span class="job-location">Cork, Ireland</span>
        "#;
        let fields = FieldExtractor::default().extract(html);

        assert_eq!(fields.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(fields.company.as_deref(), Some("Globex"));
        assert_eq!(fields.location.as_deref(), Some("Cork, Ireland"));
    }

    #[test]
    fn test_first_rule_wins_over_document_order() {
        let html = r#"
            <h2 class="section-title">Similar jobs</h2>
            <h2 class="top-card-layout__title">Platform Intern</h2>
        "#;
        let fields = FieldExtractor::default().extract(html);
        assert_eq!(fields.title.as_deref(), Some("Platform Intern"));
    }

    #[test]
    fn test_tag_must_match() {
        let html = r#"<div class="top-card-layout__title">Not a heading</div>"#;
        let fields = FieldExtractor::default().extract(html);
        assert!(fields.title.is_none());
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        let extractor = FieldExtractor::default();
        assert_eq!(extractor.extract(""), ExtractedFields::default());
        assert_eq!(extractor.extract("<li><div class="), ExtractedFields::default());
    }

    #[test]
    fn test_custom_rules() {
        let rules = FieldRules {
            title: vec![ClassRule::new("h1", "job-title")],
            ..FieldRules::default()
        };
        let extractor = FieldExtractor::new(&rules).unwrap();
        let fields = extractor.extract(r#"<h1 class="job-title">SRE</h1><h2 class="title">ignored</h2>"#);
        assert_eq!(fields.title.as_deref(), Some("SRE"));
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let rules = FieldRules {
            company: vec![ClassRule::new("span[", "x")],
            ..FieldRules::default()
        };
        assert!(FieldExtractor::new(&rules).is_err());
    }

    #[test]
    fn test_into_record() {
        let fields = ExtractedFields {
            title: Some("Intern".to_string()),
            ..Default::default()
        };
        let record = fields.into_record("111");
        assert_eq!(record.identifier, "111");
        assert_eq!(record.title.as_deref(), Some("Intern"));
        assert!(record.fetch_error.is_none());
    }
}
