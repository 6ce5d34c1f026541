//! # jitsym - Main Entry Point
//!
//! Resolves addresses of a running (or finished) process against the symbols
//! its JIT runtime published to `perf-<pid>.map`.

use anyhow::{bail, Result};
use clap::Parser;
use log::{info, warn};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use jitsym::cli::Args;
use jitsym::domain::Pid;
use jitsym::export::SymbolReport;
use jitsym::pool::ResolverPool;
use jitsym::process_lookup::{find_process_by_name, find_published_maps, resolve_exe_path};
use jitsym::symbolization::{perf_map_path, ResolverConfig};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().to_lowercase().contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Resolve the target PID from CLI arguments.
///
/// - `jitsym my-app` - find process by name
/// - `jitsym --pid 1234` - explicit PID; the process may already have exited
fn resolve_pid(args: &Args) -> Result<Pid> {
    if let Some(ref name) = args.process {
        let info = find_process_by_name(name)?;
        info!("Found {} ({}) at {}", info.command, info.pid, info.exe_path.display());
        return Ok(info.pid);
    }

    if let Some(pid) = args.pid {
        return Ok(Pid(pid));
    }

    bail!(
        "Missing required argument: PROCESS or --pid\n\n\
         Usage:\n  \
         jitsym my-app -a 0x7f00deadbeef\n  \
         jitsym --pid 1234 --dump\n\n\
         Run 'jitsym --help' for more options"
    )
}

fn list_maps(args: &Args) -> Result<()> {
    let pids = find_published_maps(&args.map_dir)?;
    let mut out = io::stdout().lock();
    if args.json {
        let pids: Vec<u32> = pids.iter().map(|pid| pid.0).collect();
        serde_json::to_writer_pretty(&mut out, &pids)?;
        writeln!(out)?;
    } else {
        for pid in pids {
            writeln!(out, "{}", perf_map_path(&args.map_dir, pid).display())?;
        }
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.list {
        return list_maps(&args);
    }

    let pid = resolve_pid(&args)?;
    if args.addresses.is_empty() && !args.dump {
        bail!("Missing required argument: --addr <ADDR> or --dump");
    }

    let config = ResolverConfig::default()
        .with_map_dir(&args.map_dir)
        .with_min_update_interval(Duration::from_millis(args.interval_ms));
    let map_path = perf_map_path(&config.map_dir, pid);

    // Names are canonicalized per executable; a finished process falls back to its map
    let context: Arc<Path> = match resolve_exe_path(pid) {
        Ok(exe) => Arc::from(exe),
        Err(_) => Arc::from(map_path.as_path()),
    };

    if !args.quiet {
        eprintln!("jitsym v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("pid: {}", pid.0);
        eprintln!("map: {}", map_path.display());
    }
    if !map_path.exists() {
        warn!("{} does not exist yet, nothing will resolve", map_path.display());
    }

    let mut pool = ResolverPool::new(config);
    let mut resolver = pool.acquire(pid, context);
    let mut report = SymbolReport::new(args.demangle);

    if args.dump {
        resolver.refresh();
        report.add_table(resolver.symbols());
    }
    for &address in &args.addresses {
        let symbol = resolver.resolve(address, args.force);
        report.add_resolved(address, symbol.as_deref());
    }
    info!("{} symbols loaded, {} bytes read", resolver.len(), resolver.read_offset());

    let mut out = io::stdout().lock();
    if args.json {
        report.write_json(&mut out)?;
    } else {
        report.write_text(&mut out)?;
    }

    if args.cleanup {
        pool.release(resolver);
        if !args.quiet {
            eprintln!("removed: {}", map_path.display());
        }
    }

    Ok(())
}
