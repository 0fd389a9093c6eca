//! Resume matcher: ATS optimization powered by Claude

use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_matcher::cli::{Cli, Commands, ConfigAction, SaveMode};
use resume_matcher::config::{Config, OutputFormat};
use resume_matcher::input::{InputManager, JobSource};
use resume_matcher::llm::{AnthropicClient, ResumeAnalyzer};
use resume_matcher::output::{formatter_for, ConsoleFormatter, Exporter};
use resume_matcher::{ErrorCategory, Result, ResumeMatcherError, Session};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            error!("Failed to read .env file: {}", e);
        }
    }

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(e.exit_code());
        }
    };

    if let Err(e) = cli.apply_overrides(&mut config) {
        error!("{}", e);
        process::exit(2);
    }

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    let outcome = match &cli.command {
        Some(Commands::Config { action }) => run_config(*action, &cli, &config),
        None => run_analysis(&cli, &config).await,
    };

    if let Err(e) = outcome {
        report_error(&e, &config);
        process::exit(e.exit_code());
    }
}

fn report_error(err: &ResumeMatcherError, config: &Config) {
    eprintln!("{} {}", "❌ Error:".red().bold(), err);
    match err.category() {
        ErrorCategory::Configuration => {
            let var = &config.api.api_key_env;
            eprintln!("{}", "Please set your API key:".yellow());
            eprintln!("  Windows:   set {}=your_key_here", var);
            eprintln!("  Linux/Mac: export {}=your_key_here", var);
            eprintln!("  or add {}=your_key_here to a .env file", var);
        }
        ErrorCategory::Auth => {
            eprintln!("{}", "Check that your API key is valid and active.".yellow());
        }
        ErrorCategory::Quota => {
            eprintln!("{}", "Wait a moment before trying again, or check your plan limits.".yellow());
        }
        _ => {}
    }
}

fn run_config(action: Option<ConfigAction>, cli: &Cli, config: &Config) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            println!("⚙️  Current Configuration\n");
            println!("API endpoint: {}", config.api.base_url);
            println!("Model: {}", config.api.model);
            println!("Max tokens: {}", config.api.max_tokens);
            println!("API key variable: {}", config.api.api_key_env);
            println!("Request timeout: {}s", config.api.timeout_secs);
            println!("\nJob URL scraping: {}", if config.scrape.enabled { "enabled" } else { "disabled" });
            if config.scrape.save_scraped {
                println!("Scraped jobs saved to: {}", config.scrape.save_dir.display());
            }
            println!("\nOutput format: {:?}", config.output.format);
            println!("Colors: {}", if config.output.color_output { "on" } else { "off" });
            println!("Results directory: {}", config.output.output_dir.display());
        }

        Some(ConfigAction::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::config_path);
            println!("{}", path.display());
        }

        Some(ConfigAction::Reset) => {
            println!("🔄 Resetting configuration to defaults...");
            match &cli.config {
                Some(path) => Config::default().save_to(path)?,
                None => Config::default().save()?,
            }
            println!("✅ Configuration reset successfully!");
        }
    }

    Ok(())
}

async fn run_analysis(cli: &Cli, config: &Config) -> Result<()> {
    let json_output = config.output.format == OutputFormat::Json;

    if !json_output {
        print_banner();
    }

    // The credential is checked before anything is read or prompted for
    let client = AnthropicClient::from_config(&config.api)?;
    info!("Using model {}", client.model());

    let session = Session::new(
        InputManager::from_config(&config.scrape)?,
        ResumeAnalyzer::new(client),
    );
    let exporter = Exporter::new(config.output.output_dir.clone());
    let console = ConsoleFormatter::new(config.output.color_output);
    let formatter = formatter_for(config.output.format, config.output.color_output);

    loop {
        let resume_path = match &cli.resume {
            Some(path) => path.clone(),
            None => PathBuf::from(prompt_line("📄 Enter path to resume file")?),
        };
        let job = match &cli.job {
            Some(source) => JobSource::parse(source),
            None => JobSource::parse(&prompt_line("💼 Enter path or URL of the job description")?),
        };

        let loaded = session.load(&resume_path, &job).await?;
        if !json_output {
            println!();
            println!("{} Resume loaded ({} characters)", "✓".green(), loaded.resume_chars());
            println!("{} Job description loaded ({} characters)", "✓".green(), loaded.job_chars());
        }

        let spinner = analysis_spinner(json_output);
        let outcome = session.analyze(loaded).await;
        spinner.finish_and_clear();
        let outcome = outcome?;

        println!("{}", formatter.format_result(&outcome.result)?);
        if !json_output {
            print!("{}", console.format_warnings(&outcome.warnings));
        }

        let save = match cli.save_mode() {
            SaveMode::Always => true,
            SaveMode::Never => false,
            SaveMode::Ask if cli.is_one_shot() || json_output => false,
            SaveMode::Ask => confirm("💾 Save results to JSON file?", false)?,
        };
        if save {
            let path = exporter.export(&outcome.result)?;
            if json_output {
                info!("Results saved to {}", path.display());
            } else {
                println!("{} Results saved to {}", "✓".green(), path.display());
            }
        }

        if cli.is_one_shot() || json_output || !confirm("🔁 Analyze another resume?", false)? {
            break;
        }
        println!();
    }

    if !json_output {
        println!("\n{}\n", "✨ Analysis complete!".green().bold());
    }
    Ok(())
}

fn print_banner() {
    println!();
    println!("{}", "Resume Job Matcher".cyan().bold());
    println!("{}", "ATS optimization powered by Claude".dimmed());
    println!();
}

fn prompt_line(prompt: &str) -> Result<String> {
    let answer: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(answer.trim().to_string())
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
}

fn analysis_spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("🤖 Analyzing resume with Claude...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
