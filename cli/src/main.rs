//! pdfaudit CLI - reports where the bytes of a PDF file go

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;

use pdfaudit::{audit_files, render, AuditOptions, AuditReport, Category, JsonFormat};

#[derive(Parser)]
#[command(name = "pdfaudit")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Break a PDF's file size down by content category", long_about = None)]
struct Cli {
    /// Input PDF files
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// User password
    #[arg(short = 'u', long, env = "PDFAUDIT_USER_PASSWORD")]
    user_password: Option<String>,

    /// Owner password
    #[arg(short = 'o', long, env = "PDFAUDIT_OWNER_PASSWORD")]
    owner_password: Option<String>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Output compact JSON (with --json)
    #[arg(long, requires = "json")]
    compact: bool,
}

impl Cli {
    fn options(&self) -> AuditOptions {
        let mut options = AuditOptions::new().with_attributions(self.json);
        if let Some(ref password) = self.user_password {
            options = options.with_password(password);
        }
        if let Some(ref password) = self.owner_password {
            options = options.with_owner_password(password);
        }
        options
    }

    fn json_format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if !run(&cli) {
        std::process::exit(1);
    }
}

/// Audit every file and print the reports. Returns `false` if any file
/// failed.
fn run(cli: &Cli) -> bool {
    let results = audit_files(&cli.files, &cli.options());
    let mut ok = true;

    for (path, result) in results {
        let printed = result.and_then(|report| {
            if cli.json {
                println!("{}", render::to_json(&report, cli.json_format())?);
            } else {
                print_report(&path, &report);
            }
            Ok(())
        });

        if let Err(e) = printed {
            eprintln!("{}: {}: {}", "Error".red().bold(), path.display(), e);
            ok = false;
        }
    }

    ok
}

fn print_report(path: &Path, report: &AuditReport) {
    println!(
        "{} file size: {}",
        path.display().to_string().cyan().bold(),
        report.total_file_size()
    );
    println!("{}", "─".repeat(60).dimmed());

    for line in render::to_text(report).lines() {
        match line.split_once(':') {
            Some((label, rest)) if label == Category::TotalFileSize.label() => {
                println!("{}:{}", label.bold(), rest)
            }
            Some((label, rest)) => println!("{}:{}", format!("{:>36}", label).green(), rest),
            None => println!("{}", line),
        }
    }

    for warning in report.warnings() {
        println!("{}: {}", "Warning".yellow().bold(), warning);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_passwords_and_files() {
        let cli = Cli::try_parse_from(["pdfaudit", "-u", "user", "-o", "owner", "a.pdf", "b.pdf"])
            .unwrap();
        assert_eq!(cli.files.len(), 2);

        let options = cli.options();
        assert_eq!(options.password.as_deref(), Some("user"));
        assert_eq!(options.owner_password.as_deref(), Some("owner"));
        assert!(!options.collect_attributions);
    }

    #[test]
    fn test_compact_requires_json() {
        assert!(Cli::try_parse_from(["pdfaudit", "--compact", "a.pdf"]).is_err());
        let cli = Cli::try_parse_from(["pdfaudit", "--json", "--compact", "a.pdf"]).unwrap();
        assert_eq!(cli.json_format(), JsonFormat::Compact);
    }

    #[test]
    fn test_files_required() {
        assert!(Cli::try_parse_from(["pdfaudit"]).is_err());
    }

    #[test]
    fn test_run_reports_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a pdf").unwrap();

        let cli = Cli::try_parse_from([std::ffi::OsStr::new("pdfaudit"), file.path().as_os_str()]).unwrap();
        assert!(!run(&cli));
    }
}
