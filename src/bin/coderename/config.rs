use std::fmt;
use std::path::PathBuf;

use itertools::Itertools;

use code_rename::ReferenceCatalog;
use code_rename::batch::{DEFAULT_EXTENSIONS, RenameOptions};
use code_rename::config::{CodeRenameConfig, DEFAULT_CATALOG_PATH, expand_home};
use code_rename::{CaseMode, OutputForm};

use crate::{Args, RenameArgs};

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Default)]
pub struct Config {
    pub(crate) catalog_path: Option<PathBuf>,
    pub(crate) case_mode: CaseMode,
    pub(crate) extensions: Vec<String>,
    pub(crate) log: bool,
    pub(crate) output_form: OutputForm,
    pub(crate) replace_spaces: bool,
    pub(crate) verbose: bool,
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let user_config = CodeRenameConfig::get_user_config()?;
        Ok(Self::from_user_config(args, user_config))
    }

    fn from_user_config(args: &Args, user_config: CodeRenameConfig) -> Self {
        let catalog_path = args
            .catalog
            .as_deref()
            .map(expand_home)
            .or(user_config.catalog)
            .or_else(|| DEFAULT_CATALOG_PATH.clone());

        let extensions = if user_config.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
        } else {
            Self::normalize_extensions(&user_config.extensions)
        };

        Self {
            catalog_path,
            case_mode: user_config.case.unwrap_or_default(),
            extensions,
            log: user_config.log,
            output_form: user_config.output.unwrap_or_default(),
            replace_spaces: user_config.replace_spaces,
            verbose: args.verbose || user_config.verbose,
        }
    }

    /// Lowercase extensions and strip a leading dot.
    fn normalize_extensions(extensions: &[String]) -> Vec<String> {
        extensions
            .iter()
            .map(|extension| extension.trim().trim_start_matches('.').to_lowercase())
            .filter(|extension| !extension.is_empty())
            .unique()
            .collect()
    }

    /// Rename options with command line arguments taking precedence over config.
    pub(crate) fn rename_options(&self, rename: &RenameArgs) -> RenameOptions {
        let extensions = if rename.extensions.is_empty() {
            self.extensions.clone()
        } else {
            Self::normalize_extensions(&rename.extensions)
        };
        RenameOptions {
            output_form: rename.output.unwrap_or(self.output_form),
            case_mode: rename.case.unwrap_or(self.case_mode),
            replace_spaces: rename.spaces || self.replace_spaces,
            extensions,
        }
    }

    /// Load the catalog, falling back to the built-in one.
    pub(crate) fn load_catalog(&self) -> ReferenceCatalog {
        let catalog = self.catalog_path.as_ref().map_or_else(
            || {
                code_rename::print_warning!("No catalog path available, using built-in catalog");
                ReferenceCatalog::builtin()
            },
            |path| ReferenceCatalog::load(path),
        );
        if self.verbose {
            println!(
                "Catalog: {} countries, {} language codes",
                catalog.len(),
                catalog.language_index().len()
            );
        }
        catalog
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let catalog = self
            .catalog_path
            .as_ref()
            .map_or_else(|| "built-in".to_string(), |path| path.display().to_string());
        writeln!(f, "Config:")?;
        writeln!(f, "  catalog:        {catalog}")?;
        writeln!(f, "  output:         {}", self.output_form)?;
        writeln!(f, "  case:           {}", self.case_mode)?;
        writeln!(f, "  extensions:     [{}]", self.extensions.iter().join(", "))?;
        writeln!(f, "  replace spaces: {}", code_rename::colorize_bool(self.replace_spaces))?;
        writeln!(f, "  log:            {}", code_rename::colorize_bool(self.log))?;
        write!(f, "  verbose:        {}", code_rename::colorize_bool(self.verbose))
    }
}

#[cfg(test)]
mod config_from_args_tests {
    use super::*;

    fn default_args() -> Args {
        Args {
            command: None,
            catalog: None,
            completion: None,
            verbose: false,
        }
    }

    #[test]
    fn uses_defaults_without_user_config() {
        let config = Config::from_user_config(&default_args(), CodeRenameConfig::default());
        assert_eq!(config.output_form, OutputForm::Alpha2);
        assert_eq!(config.case_mode, CaseMode::Lower);
        assert_eq!(config.extensions, vec!["pdf", "docx", "xlsx", "xls"]);
        assert!(!config.replace_spaces);
        assert!(!config.verbose);
    }

    #[test]
    fn cli_catalog_overrides_user_config() {
        let mut args = default_args();
        args.catalog = Some(PathBuf::from("cli.json"));
        let user_config = CodeRenameConfig {
            catalog: Some(PathBuf::from("user.json")),
            ..Default::default()
        };
        let config = Config::from_user_config(&args, user_config);
        assert_eq!(config.catalog_path, Some(PathBuf::from("cli.json")));

        let user_config = CodeRenameConfig {
            catalog: Some(PathBuf::from("user.json")),
            ..Default::default()
        };
        let config = Config::from_user_config(&default_args(), user_config);
        assert_eq!(config.catalog_path, Some(PathBuf::from("user.json")));
    }

    #[test]
    fn user_extensions_are_normalized() {
        let user_config = CodeRenameConfig {
            extensions: vec![".PDF".to_string(), "csv".to_string(), "pdf".to_string(), " ".to_string()],
            ..Default::default()
        };
        let config = Config::from_user_config(&default_args(), user_config);
        assert_eq!(config.extensions, vec!["pdf", "csv"]);
    }

    #[test]
    fn rename_args_override_config() {
        let user_config = CodeRenameConfig {
            output: Some(OutputForm::Alpha3),
            case: Some(CaseMode::Title),
            ..Default::default()
        };
        let config = Config::from_user_config(&default_args(), user_config);

        let options = config.rename_options(&RenameArgs::default());
        assert_eq!(options.output_form, OutputForm::Alpha3);
        assert_eq!(options.case_mode, CaseMode::Title);
        assert!(!options.replace_spaces);

        let rename = RenameArgs {
            output: Some(OutputForm::Language),
            case: Some(CaseMode::Upper),
            spaces: true,
            extensions: vec!["DOCX".to_string()],
            ..Default::default()
        };
        let options = config.rename_options(&rename);
        assert_eq!(options.output_form, OutputForm::Language);
        assert_eq!(options.case_mode, CaseMode::Upper);
        assert!(options.replace_spaces);
        assert_eq!(options.extensions, vec!["docx"]);
    }
}
