//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Compose -> preview -> confirm -> send, plus retrying the failed subset of
//! the last saved report.

use crate::adapters::persistence::{ReportStore, StoredReport, UserDirectory};
use crate::domain::{BulkMessageReport, DeliveryFailure, DomainError};
use crate::ports::InputPort;
use crate::usecases::BulkMessageService;
use async_trait::async_trait;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, MultiSelect, Select, Text};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const MENU_SEND: &str = "Send a bulk message";
const MENU_RETRY: &str = "Retry failures from the last report";
const MENU_RELOAD: &str = "Reload users";
const MENU_EXIT: &str = "Exit";

/// Max failure lines printed after a send; the saved report has all of them.
const MAX_LISTED_FAILURES: usize = 20;

/// Applies the prompt theme globally.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightGreen))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(Color::LightYellow));
    inquire::set_global_render_config(config);
}

/// `Ok(None)` when the user cancelled the prompt (Esc / Ctrl-C).
fn answer<T>(res: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// Split a comma-separated list of group names, dropping blanks.
fn parse_group_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_summary(report: &BulkMessageReport) {
    println!(
        "\nSent: {}  Failed: {}",
        report.num_recipients(),
        report.num_failed()
    );
    for failure in report.errors().iter().take(MAX_LISTED_FAILURES) {
        match failure {
            DeliveryFailure::Group { group, message } => {
                println!("  ✗ group {}: {}", group, message)
            }
            DeliveryFailure::Recipient {
                user,
                name,
                message,
            } => println!("  ✗ {} ({}): {}", name, user, message),
        }
    }
    if report.errors().len() > MAX_LISTED_FAILURES {
        println!(
            "  ... and {} more (see saved report)",
            report.errors().len() - MAX_LISTED_FAILURES
        );
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    service: Arc<BulkMessageService>,
    users: Arc<UserDirectory>,
    reports: Arc<ReportStore>,
}

impl TuiInputPort {
    pub fn new(
        service: Arc<BulkMessageService>,
        users: Arc<UserDirectory>,
        reports: Arc<ReportStore>,
    ) -> Self {
        Self {
            service,
            users,
            reports,
        }
    }

    async fn prompt_groups(&self) -> Result<Option<Vec<String>>, DomainError> {
        let mut options = vec!["all".to_string()];
        options.extend(
            self.users
                .teams()
                .await
                .into_iter()
                .map(|t| format!("team:{}", t)),
        );

        let Some(mut groups) = answer(MultiSelect::new("Recipient groups", options).prompt())?
        else {
            return Ok(None);
        };
        let Some(extra) = answer(
            Text::new("Additional groups (comma-separated):")
                .with_help_message("e.g. user:42, team:Finance. Leave empty for none")
                .prompt(),
        )?
        else {
            return Ok(None);
        };
        groups.extend(parse_group_list(&extra));

        let invalid: Vec<&String> = groups
            .iter()
            .filter(|g| !self.service.can_resolve(g))
            .collect();
        if !invalid.is_empty() {
            println!(
                "Unknown groups: {}",
                invalid
                    .iter()
                    .map(|g| g.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            return Ok(None);
        }
        if groups.is_empty() {
            println!("No recipient groups selected.");
            return Ok(None);
        }
        Ok(Some(groups))
    }

    /// Ask for a template until it previews cleanly and the user accepts it.
    async fn prompt_template(&self) -> Result<Option<String>, DomainError> {
        loop {
            let Some(template) = answer(
                Text::new("Message template:")
                    .with_help_message(
                        "Placeholders: {{name}} {{first_name}} {{phone}} {{email}} {{team}} {{join_date}} {{organization}}",
                    )
                    .prompt(),
            )?
            else {
                return Ok(None);
            };

            match self.service.preview_message(&template).await {
                Ok(preview) => {
                    println!("\nPreview:\n  {}\n", preview);
                    match answer(
                        Confirm::new("Use this message?")
                            .with_default(true)
                            .prompt(),
                    )? {
                        Some(true) => return Ok(Some(template)),
                        Some(false) => continue,
                        None => return Ok(None),
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
    }

    async fn compose_and_send(&self) -> Result<(), DomainError> {
        let Some(groups) = self.prompt_groups().await? else {
            return Ok(());
        };
        let Some(template) = self.prompt_template().await? else {
            return Ok(());
        };
        let confirmed = answer(
            Confirm::new(&format!("Send to {}?", groups.join(", ")))
                .with_default(false)
                .prompt(),
        )?;
        if confirmed == Some(true) {
            self.deliver(groups, template).await?;
        }
        Ok(())
    }

    async fn retry_last(&self) -> Result<(), DomainError> {
        let Some(last) = self.reports.latest().await? else {
            println!("No saved reports yet.");
            return Ok(());
        };
        if last.report.is_complete_success() {
            println!("Last send had no failures.");
            return Ok(());
        }

        let groups = last.report.retry_groups();
        let confirmed = answer(
            Confirm::new(&format!(
                "Retry {} failed entries from {}?",
                groups.len(),
                last.created_at.format("%Y-%m-%d %H:%M UTC")
            ))
            .with_default(true)
            .prompt(),
        )?;
        if confirmed == Some(true) {
            self.deliver(groups, last.message_template).await?;
        }
        Ok(())
    }

    async fn deliver(&self, groups: Vec<String>, template: String) -> Result<(), DomainError> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Sending messages...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.service.send(&groups, &template).await;
        spinner.finish_and_clear();

        let report = match result {
            Ok(report) => report,
            Err(e @ DomainError::Validation { .. }) => {
                println!("{}", e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        print_summary(&report);

        let stored = StoredReport {
            created_at: Utc::now(),
            recipient_groups: groups,
            message_template: template,
            report,
        };
        match self.reports.save(&stored).await {
            Ok(path) => println!("Report saved to {}\n", path.display()),
            Err(e) => warn!(error = %e, "failed to save report"),
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let menu = vec![MENU_SEND, MENU_RETRY, MENU_RELOAD, MENU_EXIT];
            let Some(choice) = answer(Select::new("What do you want to do?", menu).prompt())?
            else {
                return Ok(());
            };

            match choice {
                MENU_SEND => self.compose_and_send().await?,
                MENU_RETRY => self.retry_last().await?,
                MENU_RELOAD => match self.users.reload().await {
                    Ok(()) => println!("Users reloaded."),
                    Err(e) => println!("{}", e),
                },
                _ => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_list() {
        assert_eq!(
            parse_group_list(" user:1, ,team:Ops ,"),
            vec!["user:1".to_string(), "team:Ops".to_string()]
        );
        assert!(parse_group_list("").is_empty());
    }
}
