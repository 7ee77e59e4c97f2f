use anyhow::Result;
use clap::{Parser, Subcommand};

use brewpass::{
    BrewpassConfig, OrderStore, RestOrderStore, ScanSession, ScanTurn, ScannerConfig, StdinDecoder,
    ValidatedOrder, ValidationError, ValidationWorkflow,
};

#[derive(Parser)]
#[command(name = "brewpass")]
#[command(about = "Coffee-shop order validation terminal")]
#[command(long_about = "Brewpass validates coffee-shop orders against the hosted order table, \
                       either from a typed identifier or from QR payloads fed in by a scanner. \
                       Start with 'brewpass validate <id>' for a single ticket.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an order by its identifier
    Validate {
        /// Order identifier as printed on the ticket
        id: String,
    },
    /// Look up an order without modifying it
    Lookup {
        /// Order identifier as printed on the ticket
        id: String,
    },
    /// Run a scan session, reading QR payloads line by line from stdin
    Scan {
        /// Ask before validating each decoded payload
        #[arg(long, conflicts_with = "auto", help = "Ask before validating each decoded payload")]
        confirm: bool,
        /// Validate decoded payloads immediately without asking
        #[arg(long, help = "Validate decoded payloads immediately without asking")]
        auto: bool,
        /// Keep scanning after a validation instead of stopping
        #[arg(long, help = "Keep the session alive after a validation instead of stopping")]
        continuous: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = BrewpassConfig::load_env_file();
    let config = BrewpassConfig::load()?;
    brewpass::init_telemetry(&config.observability.log_level)?;

    let cli = Cli::parse();
    let store = RestOrderStore::new(&config.store)?;
    let workflow = ValidationWorkflow::new(store);

    match cli.command {
        Commands::Validate { id } => match workflow.validate(&id).await {
            Ok(validated) => print_validated(&validated),
            Err(err) => {
                report_failure(&err);
                std::process::exit(1);
            }
        },
        Commands::Lookup { id } => match workflow.store().fetch_order(&id).await? {
            Some(order) => {
                println!("Order:       {}", order.id);
                println!("Coffee:      {}", order.coffee_type);
                println!("Status:      {}", order.status);
                println!("Scanned:     {}", if order.is_scanned { "yes" } else { "no" });
            }
            None => {
                eprintln!("Order {id} not found");
                std::process::exit(1);
            }
        },
        Commands::Scan {
            confirm,
            auto,
            continuous,
        } => {
            let mut scanner_config = config.scanner.clone();
            if confirm {
                scanner_config.confirm_before_validate = true;
            }
            if auto {
                scanner_config.confirm_before_validate = false;
            }
            if continuous {
                scanner_config.continuous_scan = true;
            }
            run_scan(workflow, scanner_config).await?;
        }
    }

    Ok(())
}

async fn run_scan(
    workflow: ValidationWorkflow<RestOrderStore>,
    config: ScannerConfig,
) -> Result<()> {
    let mut session = ScanSession::new(Box::new(StdinDecoder::new()), workflow, config);
    session.start().await?;
    println!("Scanning. Enter QR payloads one per line (Ctrl-D to stop).");

    loop {
        match session.next_turn().await {
            ScanTurn::NeedsConfirmation(payload) => {
                println!("Decoded order {payload}. Validate it? [y/N]");
                let answer = session.next_raw_payload().await;
                let accepted = matches!(
                    answer.as_deref().map(str::to_lowercase).as_deref(),
                    Some("y") | Some("yes")
                );
                if accepted {
                    if let Some(result) = session.confirm().await {
                        report(result);
                    }
                } else {
                    session.decline().await;
                    println!("Discarded.");
                }
            }
            ScanTurn::Validated(result) => report(result),
            ScanTurn::Closed => break,
        }
    }

    session.dispose();
    Ok(())
}

fn report(result: Result<ValidatedOrder, ValidationError>) {
    match result {
        Ok(validated) => print_validated(&validated),
        Err(err) => report_failure(&err),
    }
}

fn print_validated(validated: &ValidatedOrder) {
    println!("✓ Order validated");
    println!("  Order:   {}", validated.order.id);
    println!("  Coffee:  {}", validated.order.coffee_type);
    println!("  Status:  Completed");
}

fn report_failure(err: &ValidationError) {
    eprintln!("✗ {err}");
}
