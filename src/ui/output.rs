use crate::config::ReportConfig;
use crate::error::{CfdiError, UserFriendlyError};
use crate::extractor::{AggregateSummary, RunReport};
use crate::ui::progress::format_duration;
use bigdecimal::{BigDecimal, RoundingMode};
use console::{style, Emoji, Term};

pub const NO_DATA_MESSAGE: &str = "No valid CFDI data found.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✅ ", "+ ");
static CROSS: Emoji = Emoji("❌ ", "x ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static SEARCH: Emoji = Emoji("🔍 ", "> ");

/// Writes the report to stdout and status lines to stderr, so stdout carries
/// nothing but the report. Diagnostics go through `tracing`.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_show_message(0) && self.mode != OutputMode::Json {
            self.print_human_message(MessageType::Success, message);
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "error",
                "message": message
            })),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) && self.mode != OutputMode::Json {
            match self.mode {
                OutputMode::Plain => eprintln!("WARNING: {}", message),
                _ => self.print_human_message(MessageType::Warning, message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) && self.mode != OutputMode::Json {
            match self.mode {
                OutputMode::Plain => eprintln!("INFO: {}", message),
                _ => self.print_human_message(MessageType::Info, message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if !self.should_show_message(0) {
            return;
        }

        match self.mode {
            OutputMode::Human if self.use_colors => {
                eprintln!("{}{}", SEARCH, style(operation).bold())
            }
            OutputMode::Human => eprintln!("> {}", operation),
            OutputMode::Plain => eprintln!("STARTING: {}", operation),
            OutputMode::Json => {}
        }
    }

    pub fn print_user_friendly_error(&self, error: &CfdiError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human if self.use_colors => eprintln!(
                    "{}{}",
                    INFO,
                    style(format!("Suggestion: {}", suggestion)).cyan()
                ),
                OutputMode::Human => eprintln!("Suggestion: {}", suggestion),
                OutputMode::Json => self.print_json_object(&serde_json::json!({
                    "type": "suggestion",
                    "message": suggestion
                })),
                OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
            }
        }
    }

    /// Prints the final report. Always shown, even in quiet mode.
    pub fn print_run_report(&self, report: &RunReport, config: &ReportConfig) {
        println!("{}", self.render_run_report(report, config));
    }

    pub fn render_run_report(&self, report: &RunReport, config: &ReportConfig) -> String {
        match self.mode {
            OutputMode::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputMode::Plain => render_plain_report(report, config),
            OutputMode::Human => self.render_human_report(report, config),
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        println!();
        if self.use_colors {
            println!("{}", style(title).bold().cyan());
        } else {
            println!("=== {} ===", title);
        }
    }

    pub fn print_separator(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        if self.use_colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        let (emoji, prefix) = match msg_type {
            MessageType::Success => (&CHECKMARK, "+"),
            MessageType::Error => (&CROSS, "x"),
            MessageType::Warning => (&WARNING, "!"),
            MessageType::Info => (&INFO, "i"),
        };

        let line = if self.use_colors {
            let styled = match msg_type {
                MessageType::Success => style(message).green().bold(),
                MessageType::Error => style(message).red().bold(),
                MessageType::Warning => style(message).yellow().bold(),
                MessageType::Info => style(message).cyan(),
            };
            format!("{}{}", emoji, styled)
        } else {
            format!("{} {}", prefix, message)
        };

        eprintln!("{}", line);
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn render_human_report(&self, report: &RunReport, config: &ReportConfig) -> String {
        let mut out = String::new();
        let Some(ref summary) = report.summary else {
            out.push_str(&self.paint_warning(NO_DATA_MESSAGE));
            append_failures(&mut out, report);
            return out;
        };

        let title = "CFDI Nomina Summary";
        if self.use_colors {
            out.push_str(&style(title).bold().cyan().to_string());
        } else {
            out.push_str(&format!("=== {} ===", title));
        }
        out.push('\n');

        for (label, value) in summary_lines(summary, config) {
            let value = if self.use_colors {
                style(value).bold().to_string()
            } else {
                value
            };
            out.push_str(&format!("  {:<21}{}\n", format!("{}:", label), value));
        }

        out.push_str(&format!(
            "  Files scanned: {} ({} skipped, {} with errors) in {}",
            report.files_found,
            report.documents_skipped,
            report.failures.len(),
            format_duration(report.duration)
        ));
        append_failures(&mut out, report);
        out
    }

    fn paint_warning(&self, message: &str) -> String {
        if self.use_colors {
            style(message).yellow().bold().to_string()
        } else {
            message.to_string()
        }
    }
}

fn summary_lines(summary: &AggregateSummary, config: &ReportConfig) -> Vec<(String, String)> {
    let mut lines = vec![("Valid CFDIs".to_string(), summary.documents.to_string())];

    if config.show_period {
        lines.push((
            "Periodo".to_string(),
            format!("{} to {}", summary.period.first, summary.period.last),
        ));
    }

    for (label, amount) in summary.amounts() {
        lines.push((
            label.to_string(),
            format_currency(amount, &config.currency_symbol),
        ));
    }

    lines
}

fn render_plain_report(report: &RunReport, config: &ReportConfig) -> String {
    let Some(ref summary) = report.summary else {
        let mut out = NO_DATA_MESSAGE.to_string();
        append_failures(&mut out, report);
        return out;
    };

    let mut out = summary_lines(summary, config)
        .into_iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n");
    append_failures(&mut out, report);
    out
}

fn append_failures(out: &mut String, report: &RunReport) {
    if report.failures.is_empty() {
        return;
    }

    out.push_str(&format!("\nDocuments with errors: {}", report.failures.len()));
    for failure in &report.failures {
        out.push_str(&format!("\n  - {}: {}", failure.path, failure.reason));
    }
}

/// Formats an amount as currency with two decimals, half-up rounding and
/// thousands separators, e.g. `$12,345.67`.
pub fn format_currency(amount: &BigDecimal, symbol: &str) -> String {
    let (cents, _) = amount
        .with_scale_round(2, RoundingMode::HalfUp)
        .as_bigint_and_exponent();
    let digits = cents.to_string();
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits.as_str()),
    };

    let padded = format!("{:0>3}", digits);
    let (whole, fraction) = padded.split_at(padded.len() - 2);

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}{}{}.{}",
        if negative { "-" } else { "" },
        symbol,
        grouped,
        fraction
    )
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}
