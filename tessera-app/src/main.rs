//! # Tessera Dashboard Grid Tool
//!
//! Headless entry point for the Tessera grid engine. It fetches a
//! dashboard's layout from the backend, optionally repacks it with the same
//! deterministic compaction the client uses for "compact all", renders the
//! result to the terminal, and can push the repacked positions back.
//!
//! ## Usage
//!
//! ```bash
//! # Show the current layout of the default dashboard
//! tessera
//!
//! # Repack a specific dashboard and preview the result
//! tessera --dashboard metrics --compact
//!
//! # Repack and write the positions back to the backend
//! tessera --dashboard metrics --compact --apply
//!
//! # Point at a non-default backend, with debug logging
//! tessera --base-url http://dash.internal:8000 --debug
//! ```

use clap::{Arg, Command};
use tessera_core::grid::GridState;
use tessera_core::persistence::{HttpPanelStore, PanelStore};
use tessera_core::placement::compact;
use tessera_core::Config;

/// Command line arguments for the grid tool
#[derive(Debug, Clone, Default)]
pub struct AppArgs {
    /// Backend base URL override
    pub base_url: Option<String>,
    /// Dashboard id override
    pub dashboard: Option<String>,
    /// Repack the layout before rendering
    pub compact: bool,
    /// Submit the (possibly repacked) positions back to the backend
    pub apply: bool,
    /// Print the position batch as JSON instead of the grid map
    pub json: bool,
    /// Enable debug logging
    pub debug: bool,
}

/// Parse command line arguments
fn parse_args() -> AppArgs {
    let matches = Command::new("Tessera")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Tessera Team")
        .about("Layout tool for the Tessera dashboard tile grid")
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Backend base URL (overrides config)"),
        )
        .arg(
            Arg::new("dashboard")
                .short('D')
                .long("dashboard")
                .value_name("ID")
                .help("Dashboard to operate on (overrides config)"),
        )
        .arg(
            Arg::new("compact")
                .short('c')
                .long("compact")
                .help("Repack the layout with first-fit compaction")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("apply")
                .short('a')
                .long("apply")
                .help("Submit the resulting positions back to the backend")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the position batch as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    AppArgs {
        base_url: matches.get_one::<String>("base-url").cloned(),
        dashboard: matches.get_one::<String>("dashboard").cloned(),
        compact: matches.get_flag("compact"),
        apply: matches.get_flag("apply"),
        json: matches.get_flag("json"),
        debug: matches.get_flag("debug"),
    }
}

/// Initialize logging based on arguments
fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    tessera_core::init_tracing();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();
    init_logging(args.debug);

    tracing::info!("Starting Tessera grid tool v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_default()?;
    if let Some(url) = args.base_url {
        config.persistence.base_url = url;
    }
    if let Some(id) = args.dashboard {
        config.persistence.dashboard_id = id;
    }

    let store = HttpPanelStore::from_config(&config.persistence)?;
    let dashboard_id = config.persistence.dashboard_id.clone();

    let descriptors = store.fetch_layout(&dashboard_id).await?;
    tracing::info!(
        "Fetched {} panels for dashboard '{}' from {}",
        descriptors.len(),
        dashboard_id,
        config.persistence.base_url
    );

    let mut state = GridState::build(&descriptors, config.grid.clone());
    if args.compact {
        compact(&mut state, None);
        tracing::info!("Repacked {} panels", state.len());
    }

    if args.json {
        let batch = state.to_position_batch(true);
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        print_grid(&state);
    }

    if args.apply {
        let batch = state.to_position_batch(true);
        store.submit_positions(&dashboard_id, &batch).await?;
        tracing::info!("Applied positions for {} panels", batch.len());
    }

    Ok(())
}

/// Render the grid as a cell map plus a placement table.
fn print_grid(state: &GridState) {
    let cols = state.config().cols as usize;
    let rows = state.max_row() as usize;

    if rows == 0 {
        println!("(empty dashboard)");
        return;
    }

    let mut cells = vec![vec!['.'; cols]; rows];
    let marks = "abcdefghijklmnopqrstuvwxyz";

    for (i, widget) in state.widgets().iter().enumerate() {
        let mark = marks.chars().nth(i % marks.len()).unwrap_or('?');
        for y in widget.y..widget.rect().bottom() {
            for x in widget.x..widget.rect().right() {
                if let Some(cell) = cells
                    .get_mut(y as usize)
                    .and_then(|row| row.get_mut(x as usize))
                {
                    *cell = mark;
                }
            }
        }
    }

    for row in &cells {
        println!("{}", row.iter().collect::<String>());
    }
    println!();

    for (i, widget) in state.widgets().iter().enumerate() {
        let mark = marks.chars().nth(i % marks.len()).unwrap_or('?');
        println!(
            "{}  {:<24} {}x{} at ({}, {})",
            mark, widget.id, widget.w, widget.h, widget.x, widget.y
        );
    }
}
