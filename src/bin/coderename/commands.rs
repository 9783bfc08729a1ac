use anyhow::{Context, Result};
use colored::Colorize;

use code_rename::log::RenameLogger;
use code_rename::{
    CaseMode, Matcher, OutputForm, ReferenceCatalog, RenameOptions, RenamePlan, TemplateSpec, analyze_template_with,
};

use crate::RenameArgs;
use crate::config::Config;

/// Alternation longer than this is abbreviated unless verbose.
const MAX_PATTERN_CHARS: usize = 120;

/// Analyse an example filename and print the identifier, matcher and render template.
pub fn analyze(config: &Config, example: &str) -> Result<()> {
    if config.verbose {
        println!("{config}");
    }
    let catalog = config.load_catalog();
    let template = analyze_example(&catalog, example, &config.extensions)?;
    let matcher = template.matcher(&catalog)?;

    if let Some(identifier) = template.identifier() {
        println!("{} {identifier}", "Identifier:".bold());
    }
    if config.verbose {
        let base_name = code_rename::batch::strip_supported_extension(example.trim(), config.extensions.as_slice());
        for candidate in code_rename::identifier::candidates(&catalog, base_name) {
            println!("  candidate {candidate}");
        }
    }
    println!("{} {}", "Matcher:".bold(), display_pattern(&matcher, config.verbose));
    println!("{} {template}", "Template:".bold());
    Ok(())
}

/// Print the rename plan for a directory.
pub fn preview(config: &Config, rename: &RenameArgs) -> Result<()> {
    let (directory, catalog, template, matcher, options) = prepare(config, rename)?;
    let plan = code_rename::preview(&directory, &matcher, &template, &catalog, &options)?;
    print_plan(&plan, &"Preview:".cyan().bold().to_string());
    print_statistics(&plan);
    Ok(())
}

/// Rename the matching files in a directory.
pub fn apply(config: &Config, rename: &RenameArgs, dryrun: bool, log: bool) -> Result<()> {
    let (directory, catalog, template, matcher, options) = prepare(config, rename)?;
    let plan = code_rename::preview(&directory, &matcher, &template, &catalog, &options)?;

    if dryrun {
        print_plan(&plan, &"Dryrun:".cyan().bold().to_string());
        print_statistics(&plan);
        return Ok(());
    }

    if plan.is_empty() {
        print_statistics(&plan);
        return Ok(());
    }

    let mut logger = if log || config.log {
        match RenameLogger::new() {
            Ok(logger) => Some(logger),
            Err(error) => {
                code_rename::print_warning!("Rename log disabled: {error}");
                None
            }
        }
    } else {
        None
    };
    if let Some(logger) = logger.as_mut() {
        logger.log_init(&directory, &template, &options, &plan);
    }

    let unmatched = plan.unmatched.len();
    let outcome = code_rename::apply(plan, &directory);

    let max_items = outcome.renamed.len();
    let width = max_items.checked_ilog10().map_or(1, |d| d as usize + 1);
    for (index, item) in outcome.renamed.iter().enumerate() {
        println!("{}", format!("Rename {:>width$} / {max_items}:", index + 1).bold().magenta());
        code_rename::show_diff(&item.original, &item.proposed);
    }
    if config.verbose {
        for item in &outcome.unchanged {
            println!("Already named: {}", item.original);
        }
    }
    for error in &outcome.errors {
        if error.is_collision() {
            code_rename::print_warning!("Skipped {error}");
        } else {
            code_rename::print_error!("{error}");
        }
    }

    if let Some(logger) = logger.as_mut() {
        logger.log_outcome(&outcome);
        if config.verbose {
            println!("Log written to {}", logger.path().display());
        }
    }

    let count = outcome.success_count();
    let message = format!("Renamed {count} {}", if count == 1 { "file" } else { "files" });
    if outcome.errors.is_empty() {
        println!("{}", message.green());
    } else {
        println!("{}", format!("{message}, {} failed or skipped", outcome.errors.len()).yellow());
    }
    if unmatched > 0 {
        println!("{unmatched} files did not match the template");
    }
    Ok(())
}

/// Convert a single identifier and print the result.
pub fn convert(config: &Config, identifier: &str, output: Option<OutputForm>, case: Option<CaseMode>) -> Result<()> {
    let catalog = config.load_catalog();
    let output = output.unwrap_or(config.output_form);
    let case = case.unwrap_or(config.case_mode);

    let converted = code_rename::convert(&catalog, identifier, output)
        .with_context(|| format!("Could not convert '{identifier}' to {output}"))?;
    println!("{}", case.apply(&converted));

    if config.verbose {
        print_entry_details(&catalog, identifier);
    }
    Ok(())
}

fn print_entry_details(catalog: &ReferenceCatalog, identifier: &str) {
    let Some(entry) = code_rename::convert::resolve(catalog, identifier) else {
        return;
    };
    println!("{}", CaseMode::Title.apply(&entry.country_name).bold());
    println!("  alpha-2:   {}", entry.alpha2);
    println!("  alpha-3:   {}", entry.alpha3);
    println!("  languages: {}", entry.language_codes.join(", "));
    if let Some(language) = entry.primary_language() {
        let others: Vec<String> = catalog
            .countries_for_language(language)
            .into_iter()
            .filter(|other| other.country_name != entry.country_name)
            .map(|other| CaseMode::Title.apply(&other.country_name))
            .collect();
        if !others.is_empty() {
            println!("  also uses '{language}': {}", others.join(", "));
        }
    }
}

/// Resolve the directory, catalog, template, matcher and options for a rename command.
fn prepare(
    config: &Config,
    rename: &RenameArgs,
) -> Result<(std::path::PathBuf, ReferenceCatalog, TemplateSpec, Matcher, RenameOptions)> {
    let directory = code_rename::resolve_input_dir(rename.path.as_deref())?;
    if config.verbose {
        println!("{config}");
        println!("Directory: {}", directory.display());
    }
    let catalog = config.load_catalog();
    let options = config.rename_options(rename);

    let template = match &rename.template {
        Some(render_template) => TemplateSpec::parse(render_template)?,
        None => analyze_example(&catalog, &rename.example, &options.extensions)?,
    };
    let matcher = match &rename.pattern {
        Some(pattern) => Matcher::new(pattern)?,
        None => template.matcher(&catalog)?,
    };

    if config.verbose {
        println!("Matcher:  {}", display_pattern(&matcher, false));
        println!("Template: {template}");
    }
    Ok((directory, catalog, template, matcher, options))
}

/// Build the template from an example, warning if it keeps an extension no file will have.
fn analyze_example(catalog: &ReferenceCatalog, example: &str, extensions: &[String]) -> Result<TemplateSpec> {
    if let Some(extension) = code_rename::batch::unsupported_extension(example, extensions) {
        code_rename::print_warning!(
            "Example extension '.{extension}' is not a supported extension ({}), it stays part of the template",
            extensions.join(", ")
        );
    }
    Ok(analyze_template_with(catalog, example, extensions)?)
}

fn print_plan(plan: &RenamePlan, heading: &str) {
    for item in &plan.items {
        println!("{heading}");
        code_rename::show_diff(&item.original, &item.proposed);
    }
}

fn print_statistics(plan: &RenamePlan) {
    println!(
        "{}",
        format!(
            "{} / {} files matched ({:.1}%)",
            plan.matched_count(),
            plan.total_count(),
            plan.match_percentage()
        )
        .bold()
    );
    if !plan.unmatched.is_empty() {
        println!("{}", format!("{} files did not match the template:", plan.unmatched.len()).yellow());
        for name in &plan.unmatched {
            println!("  - {name}");
        }
    }
}

/// Show the matcher regex, abbreviating a long identifier alternation.
fn display_pattern(matcher: &Matcher, full: bool) -> String {
    let pattern = matcher.as_str();
    if full || pattern.chars().count() <= MAX_PATTERN_CHARS {
        return pattern.to_string();
    }
    let Some(start) = pattern.find("(?P<code>") else {
        return pattern.to_string();
    };
    match capture_group_end(pattern, start) {
        Some((end, alternatives)) => format!(
            "{}(?P<code>…{alternatives} alternatives…){}",
            &pattern[..start],
            &pattern[end + 1..]
        ),
        None => pattern.to_string(),
    }
}

/// Find the closing paren of the group opening at `start`,
/// skipping escaped characters and nested groups.
/// Returns its byte index and the number of top-level alternatives in the group.
fn capture_group_end(pattern: &str, start: usize) -> Option<(usize, usize)> {
    let mut depth = 0_usize;
    let mut alternatives = 1;
    let mut escaped = false;
    for (index, c) in pattern[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some((start + index, alternatives));
                }
            }
            '|' if depth == 1 => alternatives += 1,
            _ => {}
        }
    }
    None
}
