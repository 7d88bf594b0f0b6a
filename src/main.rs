//! TETRS 2048 - headless autoplay
//!
//! Plays one session with the built-in placement policy and records the score.

use std::error::Error;
use tetrs_2048::autoplay;
use tetrs_2048::session::Session;
use tetrs_2048::settings::{ScoreEntry, Settings};

/// Stop runaway sessions that never top out
const MAX_PIECES: u32 = 10_000;

/// Get the tetrs temp directory, creating it if needed
fn tetrs_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("tetrs-2048");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<(), Box<dyn Error>> {
    // Load settings
    let mut settings = Settings::load();

    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to log file
    let tetrs_dir = tetrs_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&tetrs_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(settings.logging.filter.parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "TETRS 2048 starting up, session={:08x}, log={}",
        session_id,
        tetrs_dir.join(&log_file).display()
    );

    settings.validate()?;
    let seed = settings.spawn.seed.unwrap_or_else(rand::random);
    let mut session = Session::with_seed(
        settings.grid.height,
        settings.grid.width,
        settings.spawn.four_chance,
        u64::from(seed),
    )?;

    while !session.is_over() && session.pieces_locked() < MAX_PIECES {
        let Some(piece) = session.current_piece().cloned() else {
            break;
        };
        for action in autoplay::plan(session.board(), &piece) {
            if let Some(outcome) = session.process_action(action)? {
                tracing::debug!(?outcome, "lock");
            }
        }
    }

    settings.add_high_score(ScoreEntry {
        score: session.score(),
        lines: session.lines_cleared(),
        pieces: session.pieces_locked(),
        seed: Some(seed),
    });
    let best = settings.best_score();

    // Save settings (including any new high scores)
    if let Err(e) = settings.save() {
        tracing::warn!("Could not save settings: {}", e);
        eprintln!("Warning: Could not save settings: {}", e);
    }

    println!("Thanks for playing TETRS 2048!");
    println!("Seed: {}", seed);
    println!("Final Score: {}", session.score());
    println!(
        "Lines: {} | Pieces: {}",
        session.lines_cleared(),
        session.pieces_locked()
    );
    if let Some(best) = best {
        println!("Best: {}", best);
    }

    Ok(())
}
