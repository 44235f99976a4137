//! Line-based console transport for questbot.
//!
//! Reads one message per stdin line, prints every reply with its image
//! reference and buttons. Usage:
//!
//! ```text
//! questbot-repl [questbot.toml]
//! ```
//!
//! The config path may also come from `QUESTBOT_CONFIG`. The `[world]`
//! section must name an SQLite database.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, bail};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use questbot_chat::{GameEngine, Reply};
use questbot_core::{EngineConfig, PlayerKey, SqliteWorld};

fn load_config() -> anyhow::Result<EngineConfig> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("QUESTBOT_CONFIG").map(PathBuf::from));
    match path {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn print_replies(out: &mut impl Write, replies: &[Reply]) -> io::Result<()> {
    for reply in replies {
        if let Some(image) = &reply.image {
            writeln!(out, "[image: {image}]")?;
        }
        writeln!(out, "{}", reply.text)?;
        for row in &reply.menu {
            writeln!(out, "  [{}]", row.join("] ["))?;
        }
        writeln!(out)?;
    }
    out.flush()
}

fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let Some(db) = config.world.database.clone() else {
        bail!("no world database configured; set [world] database in the config file");
    };
    let world = SqliteWorld::open(&db)
        .with_context(|| format!("opening world database {}", db.display()))?;
    let engine = GameEngine::new(Arc::new(world), config);
    info!("questbot console ready");

    let key = PlayerKey(1);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let response = engine.handle(key, "/start")?;
    print_replies(&mut out, &response.replies)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        match engine.handle(key, &line) {
            Ok(response) => print_replies(&mut out, &response.replies)?,
            Err(e) => error!(error = %e, "message not handled"),
        }
    }
    Ok(())
}
