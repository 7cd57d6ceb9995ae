//! `logsift rules` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use logsift_core::config::LogsiftConfig;
use logsift_core::types::Classification;
use logsift_pipeline::{Classifier, LogicEntry, tokenize};

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let rules_path = resolve_rules_path(args.action.rules_override(), config_path).await?;

    match args.action {
        RulesAction::List { .. } => execute_list(&rules_path, writer).await,
        RulesAction::Validate { .. } => execute_validate(&rules_path, writer).await,
        RulesAction::Test { message, .. } => execute_test(&rules_path, &message, writer).await,
    }
}

/// Use the explicit `--rules` path, else `server.rules_dir/server.rules_file`.
async fn resolve_rules_path(
    explicit: Option<&PathBuf>,
    config_path: &Path,
) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    let config = LogsiftConfig::load(config_path).await?;
    Ok(config.server.rules_path())
}

async fn execute_list(rules_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %rules_path.display(), "loading rule set");

    let classifier = Classifier::load(rules_path).await?;
    let report = RuleListReport::new(rules_path, classifier.rules());
    writer.render(&report)?;

    Ok(())
}

async fn execute_validate(rules_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %rules_path.display(), "validating rule set");

    let report = match Classifier::load(rules_path).await {
        Ok(classifier) => RuleValidationReport {
            path: rules_path.display().to_string(),
            valid: true,
            rules: classifier.len(),
            error: None,
        },
        Err(e) => RuleValidationReport {
            path: rules_path.display().to_string(),
            valid: false,
            rules: 0,
            error: Some(e.to_string()),
        },
    };

    writer.render(&report)?;

    if let Some(error) = report.error {
        return Err(CliError::Rule(error));
    }

    Ok(())
}

async fn execute_test(
    rules_path: &Path,
    message: &str,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let classifier = Classifier::load(rules_path).await?;
    let report = RuleTestReport::evaluate(&classifier, message);
    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct RuleListReport {
    pub path: String,
    pub total: usize,
    pub rules: Vec<RuleEntry>,
}

#[derive(Serialize)]
pub struct RuleEntry {
    pub index: usize,
    pub condition: String,
    pub message: String,
    pub level: String,
}

impl RuleListReport {
    pub fn new(path: &Path, rules: &[LogicEntry]) -> Self {
        Self {
            path: path.display().to_string(),
            total: rules.len(),
            rules: rules
                .iter()
                .enumerate()
                .map(|(index, rule)| RuleEntry {
                    index,
                    condition: rule.condition.clone(),
                    message: rule.message.clone(),
                    level: rule.level.clone(),
                })
                .collect(),
        }
    }
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Rules from {} ({} total)",
            self.path.bold(),
            self.total.to_string().bold()
        )?;
        writeln!(w)?;
        writeln!(w, "{:<5} {:<30} {:<10} Message", "#", "Condition", "Level")?;
        writeln!(w, "{}", "-".repeat(80))?;

        for r in &self.rules {
            writeln!(
                w,
                "{:<5} {:<30} {:<10} {}",
                r.index,
                r.condition,
                level_colored(&r.level),
                r.message
            )?;
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct RuleValidationReport {
    pub path: String,
    pub valid: bool,
    pub rules: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.path.bold())?;
        match &self.error {
            None => {
                writeln!(w, "  Result: {}", "VALID".green().bold())?;
                writeln!(w, "  Rules: {}", self.rules)?;
            }
            Some(error) => {
                writeln!(w, "  Result: {}", "INVALID".red().bold())?;
                writeln!(w, "  Error: {}", error.red())?;
            }
        }
        Ok(())
    }
}

/// Outcome of classifying one message against the rule set.
#[derive(Serialize)]
pub struct RuleTestReport {
    pub input: String,
    pub tokens: Vec<String>,
    /// Index of the first matching rule; `None` means the fallback applied.
    pub matched_rule: Option<usize>,
    pub condition: Option<String>,
    pub result: Classification,
}

impl RuleTestReport {
    /// Classify `message` the same way the daemon does (trim, split on whitespace).
    pub fn evaluate(classifier: &Classifier, message: &str) -> Self {
        let text = message.trim();
        let tokens = tokenize(text);
        let matched = classifier.matching_rule(&tokens);

        Self {
            input: text.to_owned(),
            tokens: tokens.iter().map(|t| (*t).to_owned()).collect(),
            matched_rule: matched.map(|(idx, _)| idx),
            condition: matched.map(|(_, rule)| rule.condition.clone()),
            result: classifier.classify(&tokens),
        }
    }
}

impl Render for RuleTestReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Input: {}", self.input.bold())?;
        for (i, token) in self.tokens.iter().enumerate() {
            writeln!(w, "  ${i} = {token}")?;
        }
        writeln!(w)?;
        match (self.matched_rule, &self.condition) {
            (Some(idx), Some(condition)) => {
                writeln!(w, "Matched rule #{idx}: {}", condition.cyan())?;
            }
            _ => writeln!(w, "Matched rule: {}", "none (fallback)".yellow())?,
        }
        writeln!(w, "Level: {}", level_colored(&self.result.level))?;
        writeln!(w, "Message: {}", self.result.message)?;
        Ok(())
    }
}

fn level_colored(level: &str) -> colored::ColoredString {
    use colored::Colorize;

    match level {
        "emerg" | "alert" | "crit" | "error" | "err" => level.red(),
        "warn" | "warning" => level.yellow(),
        "notice" | "info" => level.green(),
        _ => level.normal(),
    }
}
