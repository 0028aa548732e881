use anyhow::Result;
use env_logger::Builder;
use log::LevelFilter;
use solana_anomaly_analyzer::{
    analyze_query_with_window, cache::Cache, config::Config, interpreter::is_plausible_address,
};
use std::io::Write;

// Simple CLI without clap
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap().as_secs(),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for --version command
    if args.len() > 1 && (args[1] == "--version" || args[1] == "-v") {
        println!("Solana Anomaly Analyzer v{}", solana_anomaly_analyzer::VERSION);
        return Ok(());
    }

    // Check for --clear-cache command
    if args.len() > 1 && args[1] == "--clear-cache" {
        if args.len() > 2 && is_plausible_address(&args[2]) {
            Cache::clear(&args[2])?;
            println!("Cleared cached metadata for address: {}", args[2]);
        } else {
            Cache::clear_all()?;
            println!("Cleared all cached entity metadata");
        }
        return Ok(());
    }

    // Regular command processing for query analysis
    if args.len() < 2 {
        println!("Solana Anomaly Analyzer v{}", solana_anomaly_analyzer::VERSION);
        println!("\nUsage:");
        println!("  {} \"<QUERY>\" [--hours N] [--model NAME] [--no-cache]", args[0]);
        println!("  {} --clear-cache [ADDRESS]", args[0]);
        println!("  {} --version", args[0]);
        println!("\nOptions:");
        println!("  --hours, -H N        Look back N hours (default: query-dependent)");
        println!("  --model, -m NAME     Completion model to use (default: from env)");
        println!("  --no-cache           Don't use cached entity metadata");
        println!("  --clear-cache        Clear cached metadata for all or one address");
        println!("  --version, -v        Show version information");
        println!("\nEnvironment:");
        println!("  HELIUS_API_KEY       Transaction data provider key (required)");
        println!("  COMPLETION_API_KEY   Completion service key (required)");
        println!("  SOLSCAN_COOKIE       Optional session cookie for entity metadata");
        return Ok(());
    }

    let query = args[1].clone();

    // Parse optional arguments
    let mut config = Config::from_env();
    let mut hours_back = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--hours" | "-H" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u64>() {
                        Ok(hours) => hours_back = Some(hours),
                        Err(_) => {
                            println!("Error: Invalid value for --hours: {}", args[i + 1]);
                            return Ok(());
                        }
                    }
                    i += 2;
                } else {
                    println!("Error: Missing value for --hours");
                    return Ok(());
                }
            }
            "--model" | "-m" => {
                if i + 1 < args.len() {
                    config.completion_model = args[i + 1].clone();
                    i += 2;
                } else {
                    println!("Error: Missing value for --model");
                    return Ok(());
                }
            }
            "--no-cache" => {
                config.use_cache = false;
                i += 1;
            }
            _ => {
                println!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    if config.helius_api_key.is_empty() {
        println!("Error: HELIUS_API_KEY is not set");
        return Ok(());
    }
    if config.completion_api_key.is_empty() {
        println!("Error: COMPLETION_API_KEY (or OPENAI_API_KEY) is not set");
        return Ok(());
    }

    // Show progress message
    println!("Analyzing: {}", query);

    let analysis = analyze_query_with_window(&query, &config, hours_back).await?;

    println!("\n{}", analysis);

    Ok(())
}
