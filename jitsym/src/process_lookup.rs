//! Locate target processes and the maps they publish.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Pid;

/// Result of process lookup.
#[derive(Debug)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub exe_path: PathBuf,
    pub command: String,
}

/// Find a process by name.
///
/// Matches against the command name from `/proc/<pid>/stat` and the
/// executable basename from `/proc/<pid>/exe`.
///
/// # Errors
/// - `/proc` is unreadable
/// - No processes found
/// - Multiple processes found (ambiguous)
pub fn find_process_by_name(name: &str) -> Result<ProcessInfo> {
    let mut matches: Vec<ProcessInfo> = Vec::new();

    for entry in fs::read_dir("/proc").context("Failed to read /proc")?.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };

        // Kernel threads and other users' processes have no readable exe
        let Ok(exe_path) = fs::read_link(format!("/proc/{pid}/exe")) else {
            continue;
        };
        let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) else {
            continue;
        };
        let Some(command) = extract_comm(&stat) else {
            continue;
        };

        if is_match(command, &exe_path, name) {
            matches.push(ProcessInfo { pid: Pid(pid), exe_path, command: command.to_string() });
        }
    }

    match matches.len() {
        0 => bail!("No process matching '{name}' found"),
        1 => Ok(matches.remove(0)),
        _ => {
            let list: Vec<String> =
                matches.iter().map(|m| format!("  {} ({})", m.pid.0, m.command)).collect();
            bail!(
                "Multiple processes match '{name}':\n{}\n\n\
                 Specify PID explicitly: jitsym --pid <PID>",
                list.join("\n")
            )
        }
    }
}

/// Executable of a running process, via `/proc/<pid>/exe`.
///
/// # Errors
/// Returns error if the process doesn't exist or the link is not readable.
pub fn resolve_exe_path(pid: Pid) -> Result<PathBuf> {
    let exe_link = format!("/proc/{}/exe", pid.0);
    fs::read_link(&exe_link).with_context(|| format!("Cannot read {exe_link}"))
}

/// Processes that have published a `perf-<pid>.map` in `dir`, sorted by pid.
///
/// # Errors
/// Returns error if `dir` cannot be listed.
pub fn find_published_maps(dir: &Path) -> Result<Vec<Pid>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut pids: Vec<Pid> = entries
        .flatten()
        .filter_map(|entry| map_file_pid(&entry.file_name().to_string_lossy()))
        .collect();
    pids.sort_unstable_by_key(|pid| pid.0);
    Ok(pids)
}

/// Parse the pid out of a `perf-<pid>.map` file name.
fn map_file_pid(file_name: &str) -> Option<Pid> {
    let digits = file_name.strip_prefix("perf-")?.strip_suffix(".map")?;
    digits.parse().ok().map(Pid)
}

/// Extract command name from `/proc/<pid>/stat`.
/// Format: "pid (comm) state ..."
fn extract_comm(stat_line: &str) -> Option<&str> {
    let open = stat_line.find('(')?;
    let close = stat_line.rfind(')')?;
    (open < close).then(|| &stat_line[open + 1..close])
}

/// Check if process matches the search pattern.
fn is_match(command: &str, exe_path: &Path, pattern: &str) -> bool {
    let exe_basename = exe_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let pattern_basename =
        Path::new(pattern).file_name().and_then(|n| n.to_str()).unwrap_or(pattern);

    command == pattern_basename
        || exe_basename == pattern_basename
        || command.contains(pattern)
        || exe_basename.contains(pattern)
}
