//! Persistent log of applied renames.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::batch::{ApplyOutcome, RenameOptions, RenamePlan};
use crate::error::ApplyError;
use crate::template::TemplateSpec;

/// Buffered file logger for apply runs.
pub struct RenameLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl RenameLogger {
    /// Create a new logger, writing to `~/logs/code-rename/apply_<timestamp>.log`
    ///
    /// # Errors
    /// Returns an error if the home directory is unknown or the log file cannot be created.
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Self::new_in(&home_dir.join("logs").join("code-rename"))
    }

    /// Create a new logger writing a timestamped log file into `log_dir`.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be created.
    pub fn new_in(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let path = log_dir.join(format!("apply_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log the start of an apply run.
    pub fn log_init(&mut self, directory: &Path, template: &TemplateSpec, options: &RenameOptions, plan: &RenamePlan) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}\"", Self::timestamp(), directory.display());
        let _ = writeln!(self.writer, "  template: {template}");
        let _ = writeln!(self.writer, "  output: {}", options.output_form);
        let _ = writeln!(self.writer, "  case: {}", options.case_mode);
        let _ = writeln!(self.writer, "  replace_spaces: {}", options.replace_spaces);
        let _ = writeln!(self.writer, "  extensions: {:?}", options.extensions);
        let _ = writeln!(
            self.writer,
            "  matched: {}/{}",
            plan.matched_count(),
            plan.total_count()
        );
        let _ = self.writer.flush();
    }

    /// Log the result of an apply run, one line per file.
    pub fn log_outcome(&mut self, outcome: &ApplyOutcome) {
        let timestamp = Self::timestamp();
        for item in &outcome.renamed {
            let _ = writeln!(
                self.writer,
                "[{timestamp}] RENAME \"{}\" -> \"{}\"",
                item.original, item.proposed
            );
        }
        for item in &outcome.unchanged {
            let _ = writeln!(self.writer, "[{timestamp}] UNCHANGED \"{}\"", item.original);
        }
        for error in &outcome.errors {
            self.log_error(&timestamp, error);
        }
        let _ = writeln!(
            self.writer,
            "[{timestamp}] DONE renamed: {}, unchanged: {}, skipped: {}, failed: {}",
            outcome.success_count(),
            outcome.unchanged.len(),
            outcome.collision_count(),
            outcome.errors.len() - outcome.collision_count()
        );
        let _ = self.writer.flush();
    }

    fn log_error(&mut self, timestamp: &str, error: &ApplyError) {
        let label = if error.is_collision() { "SKIP" } else { "ERROR" };
        let _ = writeln!(
            self.writer,
            "[{timestamp}] {label} \"{}\" -> \"{}\": {}",
            error.original, error.proposed, error.kind
        );
    }
}

#[cfg(test)]
mod log_tests {
    use super::*;

    use crate::batch::RenameItem;
    use crate::error::ApplyErrorKind;

    #[test]
    fn writes_init_and_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let mut logger = RenameLogger::new_in(&log_dir).unwrap();
        let path = logger.path().to_path_buf();

        let template = TemplateSpec::parse("report_{code}_2024").unwrap();
        let plan = RenamePlan {
            items: vec![RenameItem {
                original: "report_usa_2024.pdf".to_string(),
                proposed: "report_us_2024.pdf".to_string(),
            }],
            unmatched: vec!["other.pdf".to_string()],
        };
        logger.log_init(dir.path(), &template, &RenameOptions::default(), &plan);

        let outcome = ApplyOutcome {
            renamed: plan.items.clone(),
            unchanged: Vec::new(),
            errors: vec![ApplyError {
                original: "a_fi.pdf".to_string(),
                proposed: "a_fin.pdf".to_string(),
                kind: ApplyErrorKind::DestinationExists,
            }],
        };
        logger.log_outcome(&outcome);
        drop(logger);

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("INIT"));
        assert!(content.contains("template: report_{code}_2024"));
        assert!(content.contains("matched: 1/2"));
        assert!(content.contains("RENAME \"report_usa_2024.pdf\" -> \"report_us_2024.pdf\""));
        assert!(content.contains("SKIP \"a_fi.pdf\""));
        assert!(content.contains("DONE renamed: 1, unchanged: 0, skipped: 1, failed: 0"));
    }
}
