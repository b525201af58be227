// Command-line runner for the interlinking engine.
//
// Content is read from a JSON array of articles and pages, link records
// live in a SQLite file next to it.
//
//   kodegen-interlink <content.json> <links.sqlite> <run|report> [limit]
//
// INTERLINK_CONFIG may point at a JSON config file; RUST_LOG sets verbosity.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use kodegen_tools_interlink::{InterlinkConfig, Interlinker, LinkStore, MemoryContentRepository};

const USAGE: &str = "usage: kodegen-interlink <content.json> <links.sqlite> <run|report> [limit]";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [content_path, store_path, command, rest @ ..] = args.as_slice() else {
        bail!(USAGE);
    };
    let content_path = PathBuf::from(content_path);
    let limit = rest
        .first()
        .map(|raw| raw.parse::<usize>().with_context(|| format!("Invalid limit '{raw}'")))
        .transpose()?;

    let config = match std::env::var_os("INTERLINK_CONFIG") {
        Some(path) => InterlinkConfig::from_json_file(&PathBuf::from(path))?,
        None => InterlinkConfig::default(),
    };

    let repo = MemoryContentRepository::load_json(&content_path).await?;
    let store = LinkStore::open(&PathBuf::from(store_path)).await?;
    let engine = Interlinker::new(repo, store, config);

    let output = match command.as_str() {
        "run" => {
            let summary = engine.auto_link_all(limit).await?;
            engine.repo().save_json(&content_path).await?;
            serde_json::to_string_pretty(&summary)?
        }
        "report" => serde_json::to_string_pretty(&engine.generate_report().await?)?,
        other => bail!("Unknown command '{other}'\n{USAGE}"),
    };

    engine.store().close().await;
    println!("{output}");
    Ok(())
}
