//! Line-oriented game loop.
//!
//! - Lines starting with `#` are meta commands (quit, status, state, help)
//! - Every other line is spoken to the game as-is

use echo_core::{GameMode, GameSession, SessionConfig, SessionError};
use log::debug;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

/// Run the game until stdin closes or the player types `#quit`.
pub async fn run_headless(config: SessionConfig) -> Result<(), SessionError> {
    let pace = config.pace;
    let mut session = GameSession::new(config);

    println!("=== Echo Dungeon ===");
    print_commands();
    println!();
    speak(&mut session, pace).await;

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            match command.trim() {
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                "status" => {
                    let (hp, max_hp) = session.hp_status();
                    let world = session.world();
                    println!("[STATUS]");
                    println!("  Mode: {}", mode_label(session.mode()));
                    println!("  HP: {hp}/{max_hp}");
                    println!(
                        "  Mana: {}/{}",
                        world.player.mana, world.player.max_mana
                    );
                    println!("  Level: {}", world.dungeon.current_level);
                    println!("  Position: {}", world.player.position);
                    println!("  In Combat: {}", session.in_combat());
                }
                "state" => println!("{}", session.snapshot_json()?),
                "help" => {
                    println!("[HELP]");
                    print_commands();
                }
                _ => println!("[ERROR] Unknown command. Type #help for help."),
            }
            std::io::stdout().flush().ok();
            continue;
        }

        let response = session.player_action(line);
        debug!("{} effects, now in {:?}", response.effects.len(), response.mode);
        speak(&mut session, pace).await;
    }

    Ok(())
}

/// Print every queued line, sleeping for its pause.
async fn speak(session: &mut GameSession, pace: std::time::Duration) {
    for line in session.drain_narration() {
        println!("{line}");
        std::io::stdout().flush().ok();
        let wait = line.pause.duration(pace);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
    println!();
}

fn mode_label(mode: GameMode) -> &'static str {
    match mode {
        GameMode::ClassSelect => "choosing a class",
        GameMode::Exploration => "exploring",
        GameMode::Combat => "in combat",
        GameMode::Merchant => "trading",
    }
}

fn print_commands() {
    println!("  #quit        - Exit the game");
    println!("  #status      - Show current game status");
    println!("  #state       - Dump the game world as JSON");
    println!("  #help        - Show this help");
    println!("  (anything else is spoken to the game)");
}
