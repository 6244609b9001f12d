//! Splat server binary.
//!
//! Usage: `splat-server [config.json]`
//!
//! Without an argument the server runs on the defaults (port 4000, three
//! arenas, 60 Hz). Log verbosity follows `RUST_LOG`, default `info`.

use splat::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = tokio::fs::read_to_string(&path).await?;
            let config = parse_config(&text)?;
            tracing::info!(%path, "loaded config");
            config
        }
        None => ServerConfig::default(),
    };

    tracing::info!(
        addr = %config.bind_addr,
        arenas = config.arenas.len(),
        tick_rate_hz = config.game_loop.tick.tick_rate_hz,
        debug = config.debug.enabled,
        "starting Splat server"
    );

    let server = SplatServer::builder()
        .config(config)
        .build(MemoryStore::new())
        .await?;

    server.run().await?;
    Ok(())
}

fn parse_config(text: &str) -> Result<ServerConfig, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_empty_object_is_default() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:4000");
        assert_eq!(config.arenas.len(), 3);
    }

    #[test]
    fn test_parse_config_custom_arenas() {
        let config = parse_config(
            r#"{ "arenas": [ { "id": 9, "name": "Pit", "capacity": 2 } ] }"#,
        )
        .unwrap();
        assert_eq!(config.arenas.len(), 1);
        assert_eq!(config.arenas[0].id, ArenaId(9));
        assert_eq!(config.arenas[0].name, "Pit");
        assert_eq!(config.arenas[0].capacity, 2);
        assert_eq!(config.arenas[0].min_players, 2);
    }

    #[test]
    fn test_parse_config_rejects_bad_json() {
        assert!(parse_config("{ not json").is_err());
    }
}
