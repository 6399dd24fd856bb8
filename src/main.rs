use clap::{Parser, Subcommand};
use payout::service::{boot, mock::generator, CsvDriver, DriverMode};

#[derive(Parser, Debug)]
#[command(name = "payout", version, about = "Withdrawal lifecycle CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to an operations CSV file to replay
    #[arg(value_name = "FILE")]
    file: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate mock lifecycle operations to a file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "operations.csv", value_name = "FILE")]
        output: String,

        /// Number of withdrawal owners to generate
        #[arg(short, long, default_value = "10", value_name = "COUNT")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match args.command {
        Some(Commands::Generate { output, count }) => {
            generator(&output, count)?;
        }
        None => {
            let file = args
                .file
                .ok_or("Please provide an operations CSV file path or use 'generate'")?;

            let system = boot("local-dev", "not-a-real-secret");
            let driver = CsvDriver::new(system.gateway, DriverMode::Csv { file_path: file });
            driver.process().await?;
            driver.output_csv().await?;
        }
    }

    Ok(())
}
