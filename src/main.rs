//! Look up launcher strings from the command line.
//!
//! Usage:
//!   gamehub-i18n settings.title header.add_game    # Print each string on its own line
//!   gamehub-i18n --locale fr error                 # Force a locale
//!   gamehub-i18n --coverage                        # Check every catalog against the fallback
//!
//! Optional environment variables:
//! - GAMEHUB_FALLBACK_LOCALE (defaults to en)
//! - GAMEHUB_LOCALE (defaults to the OS preference)
//! - GAMEHUB_LOCALES_DIR
//! - GAMEHUB_MISSING_KEY (key or empty)

use anyhow::{bail, Context, Result};
use gamehub_i18n::config::Config;
use gamehub_i18n::i18n::LocaleId;
use tracing::{debug, info};

struct Args {
    locale: Option<LocaleId>,
    coverage: bool,
    keys: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        locale: None,
        coverage: false,
        keys: Vec::new(),
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--coverage" => parsed.coverage = true,
            "--locale" => {
                let value = args.next().context("--locale requires a value")?;
                let locale = LocaleId::parse(&value)
                    .with_context(|| format!("Invalid --locale value '{}'", value))?;
                parsed.locale = Some(locale);
            }
            flag if flag.starts_with("--") => bail!("Unknown option {}", flag),
            _ => parsed.keys.push(arg),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gamehub_i18n=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.keys.is_empty() && !args.coverage {
        bail!("Usage: gamehub-i18n [--locale <id>] [--coverage] <key>...");
    }

    let mut config = Config::from_env()?;
    if args.locale.is_some() {
        config.locale = args.locale;
    }

    let registry = gamehub_i18n::bootstrap(&config).await?;
    if let Some(active) = registry.active_locale() {
        info!("Active locale: {}", active);
    }

    for key in &args.keys {
        println!("{}", registry.lookup(key).await);
    }

    if args.coverage {
        let mut incomplete = 0;
        for (locale, report) in registry.coverage().await? {
            if report.is_clean() {
                println!("{}: ok", locale);
                continue;
            }
            if report.has_errors() {
                incomplete += 1;
            }
            println!(
                "{}: {} error(s), {} warning(s)",
                locale,
                report.errors.len(),
                report.warnings.len()
            );
            for error in &report.errors {
                println!("  error: {}", error);
            }
            for warning in &report.warnings {
                println!("  warning: {}", warning);
            }
        }
        if incomplete > 0 {
            bail!("{} catalog(s) are incomplete", incomplete);
        }
    }

    debug!(
        "Lookup metrics: {}",
        serde_json::to_string(&registry.metrics().report())?
    );
    Ok(())
}
