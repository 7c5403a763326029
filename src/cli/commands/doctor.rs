//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    hint: Option<String>,
}

#[derive(Debug, PartialEq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Taler Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    checks.push(check_tool(
        "sox",
        "install with your package manager, e.g. 'apt install sox'",
    ));
    checks.push(check_tool(
        "java",
        "a JRE is required to run the LIUM diarization jar",
    ));
    for check in &checks {
        check.print();
    }

    println!();

    println!("{}", style("Diarization").bold());
    let jar_check = check_jar(settings);
    jar_check.print();
    checks.push(jar_check);

    println!();

    println!("{}", style("API Configuration").bold());
    let api_check = check_api_key();
    api_check.print();
    checks.push(api_check);

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_data_dir(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    let errors = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Error)
        .count();
    let warnings = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Warning)
        .count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Taler.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Taler is ready to use.");
    }

    Ok(())
}

fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(_) => CheckResult::ok(name, "found"),
        Err(_) => CheckResult::error(name, "not found in PATH", hint),
    }
}

fn check_jar(settings: &Settings) -> CheckResult {
    let jar = settings.jar_path();
    if jar.exists() {
        CheckResult::ok("LIUM jar", &format!("{}", jar.display()))
    } else {
        CheckResult::error(
            "LIUM jar",
            &format!("not found at {}", jar.display()),
            "download LIUM_SpkDiarization and set diarization.jar_path",
        )
    }
}

fn check_api_key() -> CheckResult {
    match std::env::var("GOOGLE_API_KEY") {
        Ok(key) if !key.is_empty() => CheckResult::ok("GOOGLE_API_KEY", "configured"),
        _ => CheckResult::warning(
            "GOOGLE_API_KEY",
            "not set",
            "export GOOGLE_API_KEY='...' before running the pipeline",
        ),
    }
}

fn check_data_dir(settings: &Settings) -> CheckResult {
    let data_dir = settings.data_dir();
    if data_dir.is_dir() {
        CheckResult::ok("data directory", &format!("{}", data_dir.display()))
    } else {
        CheckResult::warning(
            "data directory",
            &format!("{} does not exist", data_dir.display()),
            "run 'taler init' to create it",
        )
    }
}
