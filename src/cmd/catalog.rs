use anyhow::Result;

use anilink::{HttpClient, MetadataClient, ResolverConfig, TranslationType};

use super::truncate;

fn client(config: &ResolverConfig) -> Result<MetadataClient> {
    config.validate()?;
    let http = HttpClient::new(config)?;
    Ok(MetadataClient::new(http, config))
}

pub async fn cmd_search(
    config: &ResolverConfig,
    query: &str,
    mode: TranslationType,
    limit: u32,
    json: bool,
) -> Result<()> {
    let shows = client(config)?.search(query, mode, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&shows)?);
        return Ok(());
    }

    if shows.is_empty() {
        eprintln!("No {mode} results for \"{query}\"");
        return Ok(());
    }

    println!("{:<20} {:>4}  TITLE", "ID", "EPS");
    for show in &shows {
        let title = match &show.english_name {
            Some(en) if en != &show.name => format!("{} ({en})", show.name),
            _ => show.name.clone(),
        };
        println!("{:<20} {:>4}  {}", show.id, show.episodes, truncate(&title, 70));
    }
    Ok(())
}

pub async fn cmd_episodes(config: &ResolverConfig, show_id: &str, mode: TranslationType) -> Result<()> {
    let episodes = client(config)?.episodes(show_id, mode).await?;

    if episodes.is_empty() {
        eprintln!("No {mode} episodes for {show_id}");
        return Ok(());
    }

    for episode in &episodes {
        println!("{episode}");
    }
    eprintln!("{} episodes", episodes.len());
    Ok(())
}
