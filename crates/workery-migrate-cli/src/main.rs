//! workery-migrate CLI - one subcommand per migration step.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use workery_migrate::{Config, MigrateError, Orchestrator, Step};

/// Exit code used when the operator interrupts a step.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "workery-migrate")]
#[command(about = "Migrate the legacy Workery PostgreSQL database to MongoDB")]
#[command(version)]
struct Cli {
    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, global = true, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(rename_all = "snake_case")]
enum Commands {
    /// Import the tenant of every legacy schema
    ImportTenant,
    /// Import users
    ImportUser,
    /// Assign user roles from legacy groups
    ImportUserRole,
    /// Import how-did-you-hear-about-us items
    ImportHowHearAboutUsItem,
    /// Import tags
    ImportTag,
    /// Import vehicle types
    ImportVehicleType,
    /// Import insurance requirements
    ImportInsuranceRequirement,
    /// Import skill sets
    ImportSkillSet,
    /// Link skill sets to insurance requirements
    ImportSkillSetInsuranceRequirement,
    /// Import service fees
    ImportServiceFee,
    /// Import bulletins
    ImportBulletins,
    /// Import comments
    ImportComment,
    /// Import customers
    ImportCustomer,
    /// Attach comments to customers
    ImportCustomerComment,
    /// Tag customers
    ImportCustomerTag,
    /// Import associates
    ImportAssociate,
    /// Attach comments to associates
    ImportAssociateComment,
    /// Tag associates
    ImportAssociateTag,
    /// Link associates to skill sets
    ImportAssociateSkillSet,
    /// Link associates to vehicle types
    ImportAssociateVehicleType,
    /// Link associates to insurance requirements
    ImportAssociateInsuranceRequirement,
    /// Import associate away logs
    ImportAssociateAwayLog,
    /// Archive inactive associates
    ImportAssociateStatus,
    /// Import staff
    ImportStaff,
    /// Attach comments to staff
    ImportStaffComment,
    /// Import work orders
    ImportOrder,
    /// Attach comments to orders
    ImportOrderComment,
    /// Tag orders
    ImportOrderTag,
    /// Link orders to skill sets
    ImportOrderSkillSet,
    /// Import order invoices
    ImportOrderInvoice,
    /// Import order deposits
    ImportOrderDeposit,
    /// Import task items
    ImportTaskItem,
    /// Import activity sheets
    ImportActivitySheet,
    /// Download attachments from the legacy object store to the staging directory
    ImportAttachmentDownloadToTmpDir,
    /// Upload staged attachments to the new object store
    ImportAttachmentUploadFromTmpDir,
    /// Restore public ids and modifiers of customers, associates and staff
    Hotfix01,
    /// Delete duplicate attachments
    Hotfix02,
    /// Export attachments to attachments.csv
    Hotfix03,
    /// Download the whole legacy bucket to the staging directory
    Hotfix04,
    /// Cascade associate service fees to orders and task items
    Hotfix05,
    /// Set the password of a user
    ChangePassword {
        /// Email of the user
        #[arg(long)]
        email: String,

        /// New password
        #[arg(long)]
        password: String,
    },
}

impl Commands {
    fn step(&self) -> Option<Step> {
        let step = match self {
            Commands::ImportTenant => Step::ImportTenant,
            Commands::ImportUser => Step::ImportUser,
            Commands::ImportUserRole => Step::ImportUserRole,
            Commands::ImportHowHearAboutUsItem => Step::ImportHowHearAboutUsItem,
            Commands::ImportTag => Step::ImportTag,
            Commands::ImportVehicleType => Step::ImportVehicleType,
            Commands::ImportInsuranceRequirement => Step::ImportInsuranceRequirement,
            Commands::ImportSkillSet => Step::ImportSkillSet,
            Commands::ImportSkillSetInsuranceRequirement => Step::ImportSkillSetInsuranceRequirement,
            Commands::ImportServiceFee => Step::ImportServiceFee,
            Commands::ImportBulletins => Step::ImportBulletins,
            Commands::ImportComment => Step::ImportComment,
            Commands::ImportCustomer => Step::ImportCustomer,
            Commands::ImportCustomerComment => Step::ImportCustomerComment,
            Commands::ImportCustomerTag => Step::ImportCustomerTag,
            Commands::ImportAssociate => Step::ImportAssociate,
            Commands::ImportAssociateComment => Step::ImportAssociateComment,
            Commands::ImportAssociateTag => Step::ImportAssociateTag,
            Commands::ImportAssociateSkillSet => Step::ImportAssociateSkillSet,
            Commands::ImportAssociateVehicleType => Step::ImportAssociateVehicleType,
            Commands::ImportAssociateInsuranceRequirement => {
                Step::ImportAssociateInsuranceRequirement
            }
            Commands::ImportAssociateAwayLog => Step::ImportAssociateAwayLog,
            Commands::ImportAssociateStatus => Step::ImportAssociateStatus,
            Commands::ImportStaff => Step::ImportStaff,
            Commands::ImportStaffComment => Step::ImportStaffComment,
            Commands::ImportOrder => Step::ImportOrder,
            Commands::ImportOrderComment => Step::ImportOrderComment,
            Commands::ImportOrderTag => Step::ImportOrderTag,
            Commands::ImportOrderSkillSet => Step::ImportOrderSkillSet,
            Commands::ImportOrderInvoice => Step::ImportOrderInvoice,
            Commands::ImportOrderDeposit => Step::ImportOrderDeposit,
            Commands::ImportTaskItem => Step::ImportTaskItem,
            Commands::ImportActivitySheet => Step::ImportActivitySheet,
            Commands::ImportAttachmentDownloadToTmpDir => Step::ImportAttachmentDownloadToTmpDir,
            Commands::ImportAttachmentUploadFromTmpDir => Step::ImportAttachmentUploadFromTmpDir,
            Commands::Hotfix01 => Step::Hotfix01,
            Commands::Hotfix02 => Step::Hotfix02,
            Commands::Hotfix03 => Step::Hotfix03,
            Commands::Hotfix04 => Step::Hotfix04,
            Commands::Hotfix05 => Step::Hotfix05,
            Commands::ChangePassword { .. } => return None,
        };
        Some(step)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tokio::select! {
        result = run() => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.format_detailed());
                ExitCode::from(e.exit_code())
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nReceived Ctrl-C. Exiting.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let config = Config::from_env()?;
    info!("Loaded configuration from environment");

    if let Commands::ChangePassword { email, password } = &cli.command {
        let orchestrator = Orchestrator::target_only(config).await?;
        orchestrator.change_password(email, password).await?;
        println!("Password changed for {}", email);
        return Ok(());
    }

    let Some(step) = cli.command.step() else {
        return Ok(());
    };

    let orchestrator = Orchestrator::new(config, step).await?;
    let result = orchestrator.run(step).await;
    orchestrator.close();
    let result = result?;

    if cli.output_json {
        println!("{}", result.to_json()?);
    } else {
        println!("\n{} completed!", result.step);
        println!("  Records: {}", result.records);
        println!("  Duration: {:.2}s", result.duration_seconds);
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_every_step_has_a_subcommand() {
        let cli = Cli::command();
        for step in Step::ALL {
            let sub = cli
                .find_subcommand(step.name())
                .unwrap_or_else(|| panic!("missing subcommand {}", step.name()));
            let parsed = Cli::try_parse_from(["workery-migrate", sub.get_name()]).unwrap();
            assert_eq!(parsed.command.step(), Some(step));
        }
    }

    #[test]
    fn test_change_password_requires_arguments() {
        assert!(Cli::try_parse_from(["workery-migrate", "change_password"]).is_err());
        let parsed = Cli::try_parse_from([
            "workery-migrate",
            "change_password",
            "--email",
            "a@b.c",
            "--password",
            "secret",
        ])
        .unwrap();
        assert!(parsed.command.step().is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let parsed =
            Cli::try_parse_from(["workery-migrate", "hotfix02", "--output-json", "--verbosity", "debug"])
                .unwrap();
        assert!(parsed.output_json);
        assert_eq!(parsed.verbosity, "debug");
    }
}
