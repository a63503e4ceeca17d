use anyhow::Result;
use capsandbox::core::log::init_logging;
use capsandbox::core::price::{LookbackPeriod, SamplingInterval};
use capsandbox::core::{BondSpec, Compounding};
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Value a zero-coupon bond
    ZeroBond {
        /// Face value paid at maturity
        #[arg(long, default_value_t = 100.0)]
        par: f64,
        /// Annual discount rate (0 to 1)
        #[arg(long, default_value_t = 0.1)]
        rate: f64,
        /// Years until maturity
        #[arg(long, default_value_t = 5)]
        maturity: u32,
        /// Print the valuation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Value a bond paying periodic coupons
    CouponBond {
        /// Face value paid at maturity
        #[arg(long, default_value_t = 100.0)]
        par: f64,
        /// Annual discount rate (0 to 1)
        #[arg(long, default_value_t = 0.1)]
        rate: f64,
        /// Annual coupon rate (0 to 1)
        #[arg(long, default_value_t = 0.1)]
        coupon: f64,
        /// Years until maturity
        #[arg(long, default_value_t = 5)]
        maturity: u32,
        /// Pay coupons twice a year instead of yearly
        #[arg(long)]
        semi_annual: bool,
        /// Print the valuation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Display return and volatility statistics for stock portfolios
    Portfolio {
        /// Comma separated tickers (max 10); defaults to the configured portfolios
        #[arg(short, long)]
        tickers: Option<String>,
        /// Name for the portfolio built from --tickers
        #[arg(short, long)]
        name: Option<String>,
        /// Price history length: 1Y, 2Y, 5Y, 10Y or MAX
        #[arg(long)]
        lookback: Option<String>,
        /// Sampling interval: daily, weekly or monthly
        #[arg(long)]
        interval: Option<String>,
    },
}

impl TryFrom<Commands> for capsandbox::AppCommand {
    type Error = anyhow::Error;

    fn try_from(cmd: Commands) -> Result<capsandbox::AppCommand> {
        Ok(match cmd {
            Commands::ZeroBond {
                par,
                rate,
                maturity,
                json,
            } => capsandbox::AppCommand::Bond {
                spec: BondSpec::zero(par, rate, maturity),
                json,
            },
            Commands::CouponBond {
                par,
                rate,
                coupon,
                maturity,
                semi_annual,
                json,
            } => capsandbox::AppCommand::Bond {
                spec: BondSpec::coupon(
                    par,
                    coupon,
                    rate,
                    maturity,
                    Compounding::from_yearly(!semi_annual),
                ),
                json,
            },
            Commands::Portfolio {
                tickers,
                name,
                lookback,
                interval,
            } => capsandbox::AppCommand::Portfolio {
                tickers,
                name,
                lookback: lookback.map(|s| s.parse::<LookbackPeriod>()).transpose()?,
                interval: interval
                    .map(|s| s.parse::<SamplingInterval>())
                    .transpose()?,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => capsandbox::cli::setup::setup(),
        Some(cmd) => match capsandbox::AppCommand::try_from(cmd) {
            Ok(command) => capsandbox::run_command(command, cli.config_path.as_deref()).await,
            Err(e) => Err(e),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
