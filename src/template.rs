//! Filename templates built from an example filename.
//!
//! A template is the example split around its identifier:
//! the literal text before and after stays fixed and the identifier becomes a slot.
//! From that the matcher regex and the render template are derived.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::catalog::ReferenceCatalog;
use crate::error::AnalyzeError;
use crate::identifier::{self, IdentifierMatch};

/// Name of the capture group holding the identifier.
pub const SLOT_NAME: &str = "code";

/// Placeholder for the identifier in a render template.
pub const SLOT_PLACEHOLDER: &str = "{code}";

/// One piece of a filename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    IdentifierSlot,
}

/// Filename template with exactly one identifier slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    segments: Vec<Segment>,
    /// The identifier the template was synthesized from.
    /// `None` for templates parsed from a render template string.
    identifier: Option<IdentifierMatch>,
}

/// Compiled case-insensitive filename matcher with a `code` capture group.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl TemplateSpec {
    /// Split `text` around the located identifier.
    #[must_use]
    pub fn synthesize(text: &str, identifier: &IdentifierMatch) -> Self {
        let prefix = &text[..identifier.start];
        let suffix = &text[identifier.end..];
        Self {
            segments: Self::build_segments(prefix, suffix),
            identifier: Some(identifier.clone()),
        }
    }

    /// Parse a render template such as `report_{code}_2024`.
    ///
    /// # Errors
    /// Returns an error unless the template contains exactly one `{code}` placeholder.
    pub fn parse(render_template: &str) -> Result<Self, AnalyzeError> {
        let mut parts = render_template.split(SLOT_PLACEHOLDER);
        let (Some(prefix), Some(suffix), None) = (parts.next(), parts.next(), parts.next()) else {
            let reason = if render_template.contains(SLOT_PLACEHOLDER) {
                "has more than one {code} placeholder"
            } else {
                "is missing the {code} placeholder"
            };
            return Err(AnalyzeError::InvalidTemplate {
                template: render_template.to_string(),
                reason,
            });
        };
        Ok(Self {
            segments: Self::build_segments(prefix, suffix),
            identifier: None,
        })
    }

    fn build_segments(prefix: &str, suffix: &str) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(3);
        if !prefix.is_empty() {
            segments.push(Segment::Literal(prefix.to_string()));
        }
        segments.push(Segment::IdentifierSlot);
        if !suffix.is_empty() {
            segments.push(Segment::Literal(suffix.to_string()));
        }
        segments
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub const fn identifier(&self) -> Option<&IdentifierMatch> {
        self.identifier.as_ref()
    }

    /// Regex source matching the whole base name, with the slot accepting any catalog identifier.
    #[must_use]
    pub fn matcher_pattern(&self, catalog: &ReferenceCatalog) -> String {
        let mut pattern = String::from("^");
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::IdentifierSlot => {
                    pattern.push_str(&format!("(?P<{SLOT_NAME}>{})", catalog.alternation()));
                }
            }
        }
        pattern.push('$');
        pattern
    }

    /// Compile the matcher for this template.
    ///
    /// # Errors
    /// Returns an error if the generated regex fails to compile,
    /// for example when the catalog is large enough to exceed the regex size limit.
    pub fn matcher(&self, catalog: &ReferenceCatalog) -> Result<Matcher, AnalyzeError> {
        Matcher::new(&self.matcher_pattern(catalog))
    }

    /// Render template string with the `{code}` placeholder.
    #[must_use]
    pub fn render_template(&self) -> String {
        self.render(SLOT_PLACEHOLDER)
    }

    /// Fill the slot with the given value.
    #[must_use]
    pub fn render(&self, value: &str) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::IdentifierSlot => value,
            })
            .collect()
    }
}

impl fmt::Display for TemplateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_template())
    }
}

impl Matcher {
    /// Compile a matcher from regex source. Matching is case-insensitive.
    ///
    /// # Errors
    /// Returns an error if the pattern is not a valid regex
    /// or has no named capture group `code`.
    pub fn new(pattern: &str) -> Result<Self, AnalyzeError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| AnalyzeError::InvalidPattern {
                pattern: pattern.to_string(),
                source: Box::new(source),
            })?;

        if !regex.capture_names().flatten().any(|name| name == SLOT_NAME) {
            return Err(AnalyzeError::MissingCapture(pattern.to_string()));
        }
        Ok(Self { regex })
    }

    /// Return the captured identifier if the whole base name matches.
    #[must_use]
    pub fn capture<'a>(&self, base_name: &'a str) -> Option<&'a str> {
        self.regex
            .captures(base_name)
            .and_then(|captures| captures.name(SLOT_NAME))
            .map(|value| value.as_str())
    }

    #[must_use]
    pub fn is_match(&self, base_name: &str) -> bool {
        self.capture(base_name).is_some()
    }

    /// The regex source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.regex.as_str())
    }
}

/// Analyse an example filename and build its template.
///
/// A default supported file extension on the example is ignored.
///
/// # Errors
/// Returns `AnalyzeError::NoIdentifier` if no catalog identifier occurs in the name.
pub fn analyze_template(catalog: &ReferenceCatalog, example_filename: &str) -> Result<TemplateSpec, AnalyzeError> {
    analyze_template_with(catalog, example_filename, crate::batch::DEFAULT_EXTENSIONS)
}

/// Analyse an example filename, ignoring its extension if it is one of `extensions`.
///
/// # Errors
/// Returns `AnalyzeError::NoIdentifier` if no catalog identifier occurs in the name.
pub fn analyze_template_with<S: AsRef<str>>(
    catalog: &ReferenceCatalog,
    example_filename: &str,
    extensions: &[S],
) -> Result<TemplateSpec, AnalyzeError> {
    let base_name = crate::batch::strip_supported_extension(example_filename.trim(), extensions);
    let found = identifier::locate(catalog, base_name)
        .ok_or_else(|| AnalyzeError::NoIdentifier(base_name.to_string()))?;
    Ok(TemplateSpec::synthesize(base_name, &found))
}
