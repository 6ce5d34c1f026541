//! Fake JIT that publishes symbols the way real runtimes do
//!
//! Appends a new "method" to /tmp/perf-<pid>.map every 500ms, writing each
//! line in two halves so readers see partially written lines.
//!
//! Run with: cargo run --example fake-jit
//! Then:     jitsym fake-jit --dump

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;

fn main() -> std::io::Result<()> {
    let pid = std::process::id();
    let path = format!("/tmp/perf-{pid}.map");
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    println!("pid {pid}, publishing to {path}");

    let base: u64 = 0x7f00_0000_0000;
    for i in 0..u64::MAX {
        let addr = base + i * 0x80;
        write!(file, "{addr:x} 40 ")?;
        file.flush()?;
        std::thread::sleep(Duration::from_millis(50));
        writeln!(file, "instance void [Demo] Worker::Tier{}Method{i}()", i % 2)?;
        println!("published 0x{addr:x}");
        std::thread::sleep(Duration::from_millis(450));
    }
    Ok(())
}
