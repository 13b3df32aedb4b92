use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub matrix: MatrixSettings,
    pub curator: CuratorSettings,
}

#[derive(Deserialize, Clone)]
pub struct MatrixSettings {
    pub homeserver_url: String,
    pub user: String,
    pub token: String,
    pub device_id: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct CuratorSettings {
    // 投稿频道：房间 ID (!xxx:server) 或别名 (#xxx:server)
    pub channel: String,
    pub reply_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();

        let s = config::Config::builder()
            .set_default("matrix.homeserver_url", "https://matrix.org")?
            .set_default("curator.reply_timeout_secs", 300)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .expect("Environment variables should serialize to JSON"),
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("CURATOR_"))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches("CURATOR_")
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
