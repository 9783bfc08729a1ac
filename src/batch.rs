//! Build and execute batch rename plans for a directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::catalog::ReferenceCatalog;
use crate::convert::{self, CaseMode, OutputForm};
use crate::error::{ApplyError, ApplyErrorKind};
use crate::template::{Matcher, TemplateSpec};

/// File extensions renamed by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["pdf", "docx", "xlsx", "xls"];

/// Options controlling how matched identifiers are rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOptions {
    pub output_form: OutputForm,
    pub case_mode: CaseMode,
    /// Replace every space in the new name with an underscore.
    pub replace_spaces: bool,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
}

/// One proposed rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameItem {
    pub original: String,
    pub proposed: String,
}

/// Proposed renames and the files that did not fit the template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub items: Vec<RenameItem>,
    pub unmatched: Vec<String>,
}

/// Result of applying a rename plan.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub renamed: Vec<RenameItem>,
    /// Items whose proposed name equals the original name.
    pub unchanged: Vec<RenameItem>,
    pub errors: Vec<ApplyError>,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            output_form: OutputForm::default(),
            case_mode: CaseMode::default(),
            replace_spaces: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl RenameOptions {
    /// Check if the extension is one of the configured ones, ignoring case.
    #[must_use]
    pub fn is_supported_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Convert a matched identifier and apply case and space handling to the rendered name.
    /// Returns `None` if the identifier does not resolve to a catalog entry.
    #[must_use]
    pub fn render(&self, catalog: &ReferenceCatalog, template: &TemplateSpec, identifier: &str) -> Option<String> {
        let converted = convert::convert(catalog, identifier, self.output_form)?;
        let name = template.render(&self.case_mode.apply(&converted));
        Some(if self.replace_spaces {
            name.replace(' ', "_")
        } else {
            name
        })
    }
}

impl RenamePlan {
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.items.len()
    }

    /// Number of files with a supported extension.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.items.len() + self.unmatched.len()
    }

    /// Share of supported files that matched, in percent.
    #[must_use]
    pub fn match_percentage(&self) -> f64 {
        if self.total_count() == 0 {
            0.0
        } else {
            self.matched_count() as f64 / self.total_count() as f64 * 100.0
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ApplyOutcome {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.renamed.len()
    }

    /// Number of files skipped because the destination already existed.
    #[must_use]
    pub fn collision_count(&self) -> usize {
        self.errors.iter().filter(|error| error.is_collision()).count()
    }
}

/// Split a filename into base name and extension.
/// Leading dots do not start an extension, so `.hidden` has none.
#[must_use]
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((base, extension)) if !base.is_empty() => (base, Some(extension)),
        _ => (filename, None),
    }
}

/// Remove the extension if it is one of the given extensions.
#[must_use]
pub fn strip_supported_extension<'a, S: AsRef<str>>(filename: &'a str, extensions: &[S]) -> &'a str {
    match split_extension(filename) {
        (base, Some(extension)) if extensions.iter().any(|e| e.as_ref().eq_ignore_ascii_case(extension)) => base,
        _ => filename,
    }
}

/// Return the extension of `filename` if it looks like a file extension but is not one of `extensions`.
///
/// An extension of one to five ASCII letters or digits, with at least one letter, counts as a file extension.
#[must_use]
pub fn unsupported_extension<'a, S: AsRef<str>>(filename: &'a str, extensions: &[S]) -> Option<&'a str> {
    let (_, Some(extension)) = split_extension(filename.trim()) else {
        return None;
    };
    let looks_like_extension = (1..=5).contains(&extension.len())
        && extension.chars().all(|c| c.is_ascii_alphanumeric())
        && extension.chars().any(|c| c.is_ascii_alphabetic());
    let supported = extensions.iter().any(|e| e.as_ref().eq_ignore_ascii_case(extension));
    (looks_like_extension && !supported).then_some(extension)
}

/// Build a rename plan from a list of filenames.
///
/// Names without a supported extension are ignored.
/// Names that do not match, or whose identifier does not convert, go to the unmatched list.
#[must_use]
pub fn plan_names<I>(
    filenames: I,
    matcher: &Matcher,
    template: &TemplateSpec,
    catalog: &ReferenceCatalog,
    options: &RenameOptions,
) -> RenamePlan
where
    I: IntoIterator<Item = String>,
{
    let mut plan = RenamePlan::default();
    for filename in filenames {
        let (base_name, Some(extension)) = split_extension(&filename) else {
            continue;
        };
        if !options.is_supported_extension(extension) {
            continue;
        }

        let new_base_name = matcher
            .capture(base_name)
            .and_then(|identifier| options.render(catalog, template, identifier));

        match new_base_name {
            Some(new_base_name) => {
                let proposed = format!("{new_base_name}.{extension}");
                plan.items.push(RenameItem {
                    original: filename,
                    proposed,
                });
            }
            None => plan.unmatched.push(filename),
        }
    }
    plan
}

/// List the files directly inside `directory`, sorted case-insensitively.
///
/// Subdirectories are not entered and names that are not valid UTF-8 are skipped.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn list_files(directory: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read directory {}", directory.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort_by_key(|name| name.to_lowercase());
    Ok(names)
}

/// Build a rename plan for the files in `directory`.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn preview(
    directory: &Path,
    matcher: &Matcher,
    template: &TemplateSpec,
    catalog: &ReferenceCatalog,
    options: &RenameOptions,
) -> Result<RenamePlan> {
    if !directory.is_dir() {
        anyhow::bail!("Not a directory: {}", directory.display());
    }
    let filenames = list_files(directory)?;
    Ok(plan_names(filenames, matcher, template, catalog, options))
}

/// Execute a rename plan in `directory`.
///
/// Every item is attempted. Items whose destination already exists are skipped,
/// and failed renames are recorded without stopping the batch.
/// The plan is consumed since the directory no longer matches it afterwards.
#[must_use]
pub fn apply(plan: RenamePlan, directory: &Path) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    for item in plan.items {
        if item.original == item.proposed {
            outcome.unchanged.push(item);
            continue;
        }
        match rename_item(&item, directory) {
            Ok(()) => outcome.renamed.push(item),
            Err(kind) => outcome.errors.push(ApplyError {
                original: item.original,
                proposed: item.proposed,
                kind,
            }),
        }
    }
    outcome
}

fn rename_item(item: &RenameItem, directory: &Path) -> Result<(), ApplyErrorKind> {
    let source = directory.join(&item.original);
    let destination = directory.join(&item.proposed);

    // Capitalization change only:
    // the destination "exists" on case-insensitive file systems even though it is the same file.
    if item.original.to_lowercase() == item.proposed.to_lowercase() {
        if exact_name_exists(directory, &item.proposed)? {
            return Err(ApplyErrorKind::DestinationExists);
        }
        return rename_with_temp_file(&source, &destination);
    }

    if fs::symlink_metadata(&destination).is_ok() {
        return Err(ApplyErrorKind::DestinationExists);
    }
    fs::rename(&source, &destination).map_err(ApplyErrorKind::Io)
}

/// Check for a directory entry with exactly this name, ignoring case folding by the file system.
fn exact_name_exists(directory: &Path, name: &str) -> Result<bool, ApplyErrorKind> {
    for entry in fs::read_dir(directory)? {
        if entry?.file_name().to_str() == Some(name) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Rename through an intermediate `<new_path>.tmp` name.
/// Fails with `DestinationExists` if the intermediate name is taken, since rename would replace it.
fn rename_with_temp_file(path: &Path, new_path: &Path) -> Result<(), ApplyErrorKind> {
    let temp_file: PathBuf = crate::append_extension_to_path(new_path.to_path_buf(), "tmp");
    if fs::symlink_metadata(&temp_file).is_ok() {
        return Err(ApplyErrorKind::DestinationExists);
    }
    fs::rename(path, &temp_file)?;
    fs::rename(&temp_file, new_path)?;
    Ok(())
}
