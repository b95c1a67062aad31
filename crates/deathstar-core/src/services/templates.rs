//! Template catalog: industry to template resolution and placeholder rendering

use crate::error::{DeathStarError, Result};
use crate::types::{Lead, Template};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder regex is valid"));

/// Reserved catalog key used when no industry-specific template matches
pub const DEFAULT_TEMPLATE_KEY: &str = "default";

const DEFAULT_SUBJECT: &str = "Quick intro from YOUR COMPANY";

/// Rendered subject/body plus any tokens that had no matching lead field
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body: String,
    pub unknown_tokens: Vec<String>,
}

/// Industry-keyed template catalog with an optional needle -> key mapping
/// for fuzzy industry names ("Butcher Shop & Deli" -> `butcher_shop`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,

    #[serde(default)]
    map: BTreeMap<String, String>,
}

impl TemplateCatalog {
    /// Load a catalog from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let catalog = Self::from_json_str(&content)?;
        log::info!(
            "Loaded {} template(s) from {}",
            catalog.templates.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Load a catalog from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: TemplateCatalog = serde_json::from_str(json)
            .map_err(|e| DeathStarError::Deserialization(format!("Failed to parse catalog: {}", e)))?;

        Self::from_parts(raw.templates, raw.map)
    }

    fn from_parts(
        templates: BTreeMap<String, Template>,
        map: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut normalized = BTreeMap::new();
        for (key, template) in templates {
            let key_lower = key.trim().to_lowercase();
            if key_lower.is_empty() {
                return Err(DeathStarError::Config(
                    "Template key must not be empty".to_string(),
                ));
            }
            if normalized.insert(key_lower.clone(), template).is_some() {
                return Err(DeathStarError::Config(format!(
                    "Duplicate template key (case-insensitive): {}",
                    key_lower
                )));
            }
        }

        let mut normalized_map = BTreeMap::new();
        for (needle, key) in map {
            let needle_lower = needle.trim().to_lowercase();
            let key_lower = key.trim().to_lowercase();
            if !normalized.contains_key(&key_lower) {
                log::warn!(
                    "Industry mapping '{}' points to unknown template '{}', ignoring",
                    needle_lower,
                    key_lower
                );
                continue;
            }
            normalized_map.insert(needle_lower, key_lower);
        }

        Ok(Self {
            templates: normalized,
            map: normalized_map,
        })
    }

    /// Serialize the catalog back to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DeathStarError::Serialization(format!("Failed to serialize catalog: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Resolve the template for an industry value.
    ///
    /// Order: case-insensitive exact key match, then the needle mapping
    /// (case-insensitive substring match against the industry), then the
    /// reserved default key. Returns the winning key along with the template.
    pub fn resolve(&self, industry: &str) -> Result<(&str, &Template)> {
        let needle = industry.trim().to_lowercase();

        if !needle.is_empty() {
            if let Some((key, template)) = self.templates.get_key_value(&needle) {
                return Ok((key.as_str(), template));
            }

            for (fragment, key) in &self.map {
                if needle.contains(fragment.as_str()) {
                    if let Some((key, template)) = self.templates.get_key_value(key) {
                        return Ok((key.as_str(), template));
                    }
                }
            }
        }

        if let Some((key, template)) = self.templates.get_key_value(DEFAULT_TEMPLATE_KEY) {
            return Ok((key.as_str(), template));
        }

        Err(DeathStarError::TemplateNotFound(industry.to_string()))
    }

    /// Render a template against a lead.
    ///
    /// Known `{Field}` tokens are substituted (a blank first name renders as
    /// "there"); unknown tokens are left verbatim and reported back, never
    /// treated as fatal.
    pub fn render(template: &Template, lead: &Lead) -> RenderedTemplate {
        let mut unknown_tokens = Vec::new();
        let subject = substitute(&template.subject, lead, &mut unknown_tokens);
        let body = substitute(&template.body, lead, &mut unknown_tokens);

        for token in &unknown_tokens {
            log::warn!("Unknown template token left verbatim: {{{}}}", token);
        }

        RenderedTemplate {
            subject,
            body,
            unknown_tokens,
        }
    }

    /// The built-in starter catalog written out by `--init`
    pub fn default_catalog() -> Self {
        let body_for = |audience: &str| {
            format!(
                "Hey {{First Name}},\n\n\
                 My name is YOUR NAME with YOUR COMPANY. We help {audience} MAIN GOAL. \
                 If it's useful, I can share examples or send over a couple of samples.\n\n\
                 Thanks,\n\
                 YOUR NAME\n\
                 YOUR COMPANY\n\
                 PHONE\n\
                 WEBSITE"
            )
        };

        let mut templates = BTreeMap::new();
        templates.insert(
            DEFAULT_TEMPLATE_KEY.to_string(),
            Template {
                subject: DEFAULT_SUBJECT.to_string(),
                body: body_for("{Industry}"),
            },
        );
        templates.insert(
            "butcher_shop".to_string(),
            Template {
                subject: DEFAULT_SUBJECT.to_string(),
                body: body_for("butcher shops"),
            },
        );
        templates.insert(
            "farm_orchard".to_string(),
            Template {
                subject: DEFAULT_SUBJECT.to_string(),
                body: body_for("farms & orchards"),
            },
        );

        Self {
            templates,
            map: BTreeMap::new(),
        }
    }
}

fn substitute(text: &str, lead: &Lead, unknown_tokens: &mut Vec<String>) -> String {
    let mut output = String::with_capacity(text.len());
    let mut last_end = 0;

    for captures in PLACEHOLDER_RE.captures_iter(text) {
        let matched = captures.get(0).expect("capture 0 always present");
        let token = captures
            .get(1)
            .expect("capture 1 always present")
            .as_str()
            .trim();
        let normalized = token.to_lowercase().replace(' ', "_");

        output.push_str(&text[last_end..matched.start()]);
        last_end = matched.end();

        match lead.field(&normalized) {
            Some(value) => {
                if value.is_empty() && is_first_name_token(&normalized) {
                    output.push_str("there");
                } else {
                    output.push_str(value);
                }
            }
            None if is_first_name_token(&normalized) => {
                // "first"/"firstname" spellings without a lead column
                if lead.first_name.is_empty() {
                    output.push_str("there");
                } else {
                    output.push_str(&lead.first_name);
                }
            }
            None => {
                unknown_tokens.push(token.to_string());
                output.push_str(matched.as_str());
            }
        }
    }

    output.push_str(&text[last_end..]);
    output
}

fn is_first_name_token(normalized: &str) -> bool {
    matches!(normalized, "first_name" | "firstname" | "first")
}
