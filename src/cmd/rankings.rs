use anyhow::Result;

use anilink::{JsonFileTracker, PerformanceTracker};

pub fn cmd_rankings(json: bool) -> Result<()> {
    let tracker = JsonFileTracker::open(JsonFileTracker::default_path());
    let rankings = tracker.rankings();

    if json {
        println!("{}", serde_json::to_string_pretty(&rankings)?);
        return Ok(());
    }

    if rankings.is_empty() {
        eprintln!("No provider stats yet ({})", tracker.path().display());
        return Ok(());
    }

    println!("{:<12} {:>8} {:>8} {:>8} {:>12}", "PROVIDER", "RATE", "OK", "FAIL", "AVG LATENCY");
    for row in &rankings {
        println!(
            "{:<12} {:>7.2}% {:>8} {:>8} {:>10.0}ms",
            row.provider, row.success_rate, row.success_count, row.failure_count, row.avg_latency_ms
        );
    }
    Ok(())
}
