use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use anilink::{
    mp4_only, select, JsonFileTracker, MediaLink, QualityPreference, Resolver, ResolverConfig,
    TranslationType,
};

use super::truncate;

pub struct ResolveOptions {
    pub mode: TranslationType,
    /// `None` lists every link; `Some` prints only the selected one.
    pub quality: Option<QualityPreference>,
    pub mp4_only: bool,
    pub json: bool,
}

pub async fn cmd_resolve(
    config: ResolverConfig,
    show_id: &str,
    episode: &str,
    opts: &ResolveOptions,
) -> Result<()> {
    let tracker = Arc::new(JsonFileTracker::open(JsonFileTracker::default_path()));
    let resolver = Resolver::from_config(config, tracker)?;

    let start = Instant::now();
    let mut links = resolver.resolve_all(show_id, episode, opts.mode).await?;
    let elapsed = start.elapsed();

    if opts.mp4_only {
        links = mp4_only(&links);
    }

    if let Some(preference) = &opts.quality {
        let Some(link) = select(&links, preference) else {
            anyhow::bail!("no playable links for {show_id} episode {episode} ({})", opts.mode);
        };
        if opts.json {
            println!("{}", serde_json::to_string_pretty(link)?);
        } else {
            println!("{}", link.url);
        }
        return Ok(());
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&links)?);
        return Ok(());
    }

    if links.is_empty() {
        eprintln!("No links found for {show_id} episode {episode} ({})", opts.mode);
        return Ok(());
    }

    print_table(&links);
    eprintln!("\n{} links in {:.2}s", links.len(), elapsed.as_secs_f64());
    Ok(())
}

fn print_table(links: &[MediaLink]) {
    println!("{:<12} {:<6} {:<12} URL", "PROVIDER", "FORMAT", "QUALITY");
    for link in links {
        println!(
            "{:<12} {:<6} {:<12} {}",
            link.provider,
            link.format,
            truncate(&link.quality, 12),
            link.url
        );
    }
}
