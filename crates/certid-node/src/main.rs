//! certid-node — drives the core deterministically from an ordered
//! transaction log.
//!
//! Startup sequence:
//!   1. Open (or initialise) the state database
//!   2. Apply genesis if the DB is fresh
//!   3. Replay every entry of `--tx-log`, advancing a `BlockContext` per line
//!   4. Print the event log each entry emitted
//!
//! This is not a consensus node: it imposes no ordering of its own, it only
//! replays a log whose ordering (and per-entry height/time) some other host
//! already decided. That is exactly the host integration surface
//! `certid-state`'s handlers assume.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

use certid_core::{BlockContext, Message, VecEventSink};
use certid_genesis::{apply_genesis, export_genesis, import_genesis, GenesisParams};
use certid_state::{engine, StateDb};

#[derive(Parser, Debug)]
#[command(
    name = "certid-node",
    version,
    about = "CertID core node — replays an ordered attestation transaction log"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, default_value = "~/.certid/data")]
    data_dir: PathBuf,

    /// Path to genesis params JSON (only required on first run).
    #[arg(long)]
    genesis_params: Option<PathBuf>,

    /// Path to a JSON-Lines transaction log to replay. Each line is a
    /// `{"height":..,"time":..,"message":{...}}` record.
    #[arg(long)]
    tx_log: Option<PathBuf>,

    /// Export the full core state to this JSON path and exit.
    #[arg(long)]
    genesis_export: Option<PathBuf>,

    /// Import a previously-exported JSON snapshot into a fresh database and exit.
    #[arg(long)]
    genesis_import: Option<PathBuf>,
}

/// One line of a transaction log: the host-decided height/time an otherwise
/// context-free `Message` is to be applied under.
#[derive(Debug, Deserialize)]
struct LogEntry {
    height: certid_core::Height,
    time: certid_core::Timestamp,
    message: Message,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,certid=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("certid-node starting");

    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = StateDb::open(&data_dir).context("opening state database")?;

    if let Some(path) = &args.genesis_import {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading genesis snapshot from {}", path.display()))?;
        let snapshot = serde_json::from_str(&json).context("parsing genesis snapshot JSON")?;
        import_genesis(&db, &snapshot).context("importing genesis snapshot")?;
        info!("genesis snapshot imported");
        return Ok(());
    }

    if let Some(path) = &args.genesis_export {
        let snapshot = export_genesis(&db).context("exporting genesis snapshot")?;
        let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing genesis snapshot to {}", path.display()))?;
        info!(path = %path.display(), "genesis snapshot exported");
        return Ok(());
    }

    if db.is_empty() {
        info!("fresh database — applying genesis");
        let params = load_or_default_genesis_params(args.genesis_params.as_deref())?;
        apply_genesis(&db, &params).context("applying genesis")?;
    } else {
        info!("existing database found — skipping genesis");
    }

    let authority = db
        .authority()?
        .ok_or_else(|| anyhow::anyhow!("database has no authority recorded"))?;

    if let Some(tx_log) = &args.tx_log {
        replay(&db, &authority, tx_log)?;
    } else {
        info!("no --tx-log given, nothing to replay");
    }

    Ok(())
}

fn replay(db: &StateDb, authority: &certid_core::Addr, tx_log: &Path) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(tx_log)
        .with_context(|| format!("reading transaction log {}", tx_log.display()))?;

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: LogEntry = serde_json::from_str(line)
            .with_context(|| format!("parsing transaction log line {}", line_no + 1))?;

        let ctx = BlockContext {
            height: entry.height,
            time: entry.time,
            authority: authority.clone(),
        };
        let mut sink = VecEventSink::default();
        let action_name = entry.message.action.name();

        match engine::apply(db, &ctx, &mut sink, &entry.message) {
            Ok(()) => {
                for event in &sink.events {
                    println!(
                        "{{\"height\":{},\"event_type\":\"{}\",\"attributes\":{}}}",
                        ctx.height,
                        event.event_type,
                        serde_json::to_string(&event.attributes).unwrap_or_default(),
                    );
                }
            }
            Err(err) => warn!(
                action = action_name,
                height = ctx.height,
                error = %err,
                "transaction rejected, continuing replay"
            ),
        }
    }

    Ok(())
}

fn load_or_default_genesis_params(path: Option<&Path>) -> anyhow::Result<GenesisParams> {
    if let Some(p) = path {
        let json = std::fs::read_to_string(p)
            .with_context(|| format!("reading genesis params from {}", p.display()))?;
        return serde_json::from_str(&json).context("parsing genesis params JSON");
    }
    warn!("no --genesis-params provided, using the default development genesis");
    Ok(GenesisParams::default())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
