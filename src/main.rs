use cfdi_nomina::{
    logging, CfdiError, CfdiNomina, Cli, OutputFormatter, OutputMode, RunReport,
    UserFriendlyError,
};
use clap::Parser;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_config()) {
        eprintln!("{}", e.user_message());
        return 1;
    }

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let app = match CfdiNomina::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &app);
    }

    match app.summarize(&cli.data_dir) {
        Ok(report) => {
            app.output_formatter()
                .print_run_report(&report, &app.config().report);
            report_exit_code(&report)
        }
        Err(e) => {
            app.handle_error(&e);
            match e {
                CfdiError::Cancelled => 130, // Interrupted (SIGINT)
                _ => 1,
            }
        }
    }
}

fn report_exit_code(report: &RunReport) -> i32 {
    if !report.has_data() {
        3 // No valid CFDI data
    } else if report.has_failures() {
        2 // Success with unreadable documents
    } else {
        0
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "cfdi-nomina.toml".to_string());

    match CfdiNomina::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  cfdi-nomina <data-dir> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, app: &CfdiNomina) -> i32 {
    let formatter = app.output_formatter();
    let config = app.config();

    formatter.info("DRY RUN MODE - No files will be parsed");
    formatter.print_separator();

    println!("  Data directory: {}", cli.data_dir.display());
    println!("  Extensions: {}", config.scan.extensions.join(", "));
    println!("  Max file size: {} bytes", config.scan.max_file_size);
    println!("  Max depth: {}", config.scan.max_depth);
    println!("  Exclude directories: {}", config.scan.exclude_dirs.join(", "));

    let documents = app.scan_documents(&cli.data_dir);

    formatter.print_header(&format!("{} candidate files", documents.len()));
    for document in &documents {
        println!("  {}", document.display_path());
    }

    formatter.print_separator();
    if documents.is_empty() {
        formatter.warning("No candidate files found");
    } else {
        formatter.success("Dry run completed successfully");
    }

    0
}

fn print_startup_error(error: &CfdiError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfdi_nomina::{Config, OutputFormat};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cli_for(data_dir: PathBuf) -> Cli {
        Cli {
            data_dir,
            config: None,
            exclude: None,
            max_size: None,
            max_depth: None,
            output_format: OutputFormat::Plain,
            jobs: None,
            verbose: 0,
            quiet: true,
            dry_run: false,
            generate_config: false,
        }
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut cli = cli_for(temp_dir.path().to_path_buf());
        cli.config = Some(config_path.clone());
        cli.generate_config = true;

        assert_eq!(handle_generate_config(&cli), 0);

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[scan]"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.xml"), "<a/>").unwrap();

        let mut cli = cli_for(temp_dir.path().to_path_buf());
        cli.dry_run = true;

        let app = CfdiNomina::detached(Config::default(), OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(&cli, &app), 0);
    }

    #[test]
    fn test_exit_codes_follow_report() {
        let app = CfdiNomina::detached(Config::default(), OutputMode::Plain, 0, true);
        let temp_dir = TempDir::new().unwrap();

        let empty = app.summarize(temp_dir.path()).unwrap();
        assert_eq!(report_exit_code(&empty), 3);
    }
}
