//! Echo Dungeon terminal front end.
//!
//! Reads spoken commands as lines on stdin and prints the narration,
//! pausing between lines the way a voice front end would.
//!
//! ```bash
//! ECHO_DUNGEON_SEED=7 ECHO_NARRATION_PACE_MS=400 cargo run -p echo
//! ```

mod headless;

use echo_core::SessionConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let mut config = SessionConfig::from_env()?;
    if let Some(seed) = flag_value(&args, "--seed") {
        config = config.with_seed(seed.parse()?);
    }
    if args.iter().any(|a| a == "--fast") {
        config = config.with_pacing(std::time::Duration::ZERO);
    }

    headless::run_headless(config).await?;
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_help() {
    println!("Echo Dungeon - a voice-driven dungeon crawl");
    println!();
    println!("USAGE:");
    println!("  echo [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help       Show this help message");
    println!("  --seed <N>       Fixed dungeon seed (overrides ECHO_DUNGEON_SEED)");
    println!("  --fast           Print narration without pausing");
    println!();
    println!("ENVIRONMENT:");
    println!("  ECHO_DUNGEON_SEED        Fixed dungeon seed");
    println!("  ECHO_NARRATION_PACE_MS   Base pause between narration lines");
    println!("  RUST_LOG                 Log filter, e.g. echo_core=debug");
}
