use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::catalog;
use crate::cli::SnapshotCommands;
use crate::pricing::snapshot;

pub async fn dispatch_snapshot(action: SnapshotCommands, json_output: bool) -> Result<()> {
    match action {
        SnapshotCommands::Refresh { force } => {
            let spinner = super::fetch_spinner(json_output);
            let refreshed = {
                let mut progress = super::spinner_progress(&spinner);
                snapshot::refresh(force, &mut progress).await?
            };
            spinner.finish_and_clear();

            if json_output {
                println!("{}", serde_json::to_string_pretty(&refreshed)?);
            } else {
                println!(
                    "{} Fundamentals for {} of {} instruments (fetched {})",
                    "✓".green(),
                    refreshed.rows.len(),
                    catalog::UNIVERSE.len(),
                    refreshed.fetched_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
            Ok(())
        }

        SnapshotCommands::Status => {
            let loaded = snapshot::load(None)?;

            if json_output {
                #[derive(Serialize)]
                struct Status {
                    present: bool,
                    stale: bool,
                    fetched_at: Option<chrono::DateTime<chrono::Utc>>,
                    instruments: usize,
                    universe: usize,
                }
                let status = match &loaded {
                    Some(s) => Status {
                        present: true,
                        stale: s.is_stale(),
                        fetched_at: Some(s.fetched_at),
                        instruments: s.rows.len(),
                        universe: catalog::UNIVERSE.len(),
                    },
                    None => Status {
                        present: false,
                        stale: false,
                        fetched_at: None,
                        instruments: 0,
                        universe: catalog::UNIVERSE.len(),
                    },
                };
                println!("{}", serde_json::to_string_pretty(&status)?);
                return Ok(());
            }

            match loaded {
                Some(s) => {
                    let age = if s.is_stale() {
                        "stale".yellow().to_string()
                    } else {
                        "fresh".green().to_string()
                    };
                    println!(
                        "Snapshot: {} ({} of {} instruments, fetched {})",
                        age,
                        s.rows.len(),
                        catalog::UNIVERSE.len(),
                        s.fetched_at.format("%Y-%m-%d %H:%M UTC")
                    );
                }
                None => {
                    println!(
                        "No fundamentals snapshot. Run `etfdash snapshot refresh` to fetch one."
                    );
                }
            }
            Ok(())
        }
    }
}
