use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use session_core::{routing, PeerConfig, RoutingOptions};

#[derive(Debug, Clone)]
pub struct Settings {
    pub routing_url: String,
    pub routing_profile: String,
    pub routing_alternatives: bool,
    pub routing_timeout_ms: u64,
    pub simulation_tick_ms: u64,
    pub peers: Vec<PeerConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            routing_url: routing::DEFAULT_ROUTING_URL.into(),
            routing_profile: routing::DEFAULT_ROUTING_PROFILE.into(),
            routing_alternatives: true,
            routing_timeout_ms: routing::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            simulation_tick_ms: 2000,
            peers: Vec::new(),
        }
    }
}

impl Settings {
    pub fn routing_options(&self) -> RoutingOptions {
        RoutingOptions {
            base_url: self.routing_url.clone(),
            profile: self.routing_profile.clone(),
            alternatives: self.routing_alternatives,
            timeout: Duration::from_millis(self.routing_timeout_ms),
        }
    }

    pub fn tick_period(&self) -> Option<Duration> {
        (self.simulation_tick_ms > 0).then(|| Duration::from_millis(self.simulation_tick_ms))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    routing_url: Option<String>,
    routing_profile: Option<String>,
    routing_alternatives: Option<bool>,
    routing_timeout_ms: Option<u64>,
    simulation_tick_ms: Option<u64>,
    #[serde(default)]
    peers: Vec<PeerConfig>,
}

/// Defaults, then `path` (when it exists), then environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg = parse_settings_file(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        apply_file(&mut settings, file_cfg);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_settings_file(raw: &str) -> anyhow::Result<SettingsFile> {
    Ok(toml::from_str::<SettingsFile>(raw)?)
}

fn apply_file(settings: &mut Settings, file_cfg: SettingsFile) {
    if let Some(v) = file_cfg.routing_url {
        settings.routing_url = v;
    }
    if let Some(v) = file_cfg.routing_profile {
        settings.routing_profile = v;
    }
    if let Some(v) = file_cfg.routing_alternatives {
        settings.routing_alternatives = v;
    }
    if let Some(v) = file_cfg.routing_timeout_ms {
        settings.routing_timeout_ms = v;
    }
    if let Some(v) = file_cfg.simulation_tick_ms {
        settings.simulation_tick_ms = v;
    }
    if !file_cfg.peers.is_empty() {
        settings.peers = file_cfg.peers;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("ROUTING_URL") {
        settings.routing_url = v;
    }
    if let Some(v) = var("APP__ROUTING_URL") {
        settings.routing_url = v;
    }

    if let Some(v) = var("APP__ROUTING_PROFILE") {
        settings.routing_profile = v;
    }

    if let Some(v) = var("APP__ROUTING_ALTERNATIVES") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.routing_alternatives = parsed;
        }
    }

    if let Some(v) = var("APP__ROUTING_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.routing_timeout_ms = parsed;
        }
    }

    if let Some(v) = var("APP__SIMULATION_TICK_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.simulation_tick_ms = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use shared::domain::{Coordinate, PeerId, PeerStatus};

    use super::*;

    #[test]
    fn missing_file_keeps_defaults() {
        let settings =
            load_settings(Path::new("definitely/not/here/session.toml")).expect("settings");
        assert_eq!(settings.routing_profile, "driving");
        assert!(settings.peers.is_empty());
        assert_eq!(settings.tick_period(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn file_values_override_defaults_and_parse_peers() {
        let raw = r#"
            routing_url = "http://localhost:5000"
            routing_alternatives = false
            simulation_tick_ms = 0

            [[peers]]
            id = 3
            name = "Robin"
            status = "offline"
            start_index = 1
            path = [{ lng = -122.40, lat = 37.79 }, { lng = -122.41, lat = 37.78 }]
        "#;
        let mut settings = Settings::default();
        apply_file(&mut settings, parse_settings_file(raw).expect("parse"));

        assert_eq!(settings.routing_url, "http://localhost:5000");
        assert!(!settings.routing_options().alternatives);
        assert_eq!(settings.tick_period(), None);
        let peer = &settings.peers[0];
        assert_eq!(peer.id, PeerId(3));
        assert_eq!(peer.status, PeerStatus::Offline);
        assert!(peer.simulate);
        assert_eq!(peer.path[1], Coordinate::new(-122.41, 37.78));
    }

    #[test]
    fn env_overrides_file_and_ignores_unparseable_numbers() {
        let vars: HashMap<&str, &str> = [
            ("ROUTING_URL", "http://first"),
            ("APP__ROUTING_URL", "http://second"),
            ("APP__ROUTING_TIMEOUT_MS", "2500"),
            ("APP__SIMULATION_TICK_MS", "soon"),
        ]
        .into_iter()
        .collect();
        let mut settings = Settings::default();
        apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.routing_url, "http://second");
        assert_eq!(
            settings.routing_options().timeout,
            Duration::from_millis(2500)
        );
        assert_eq!(settings.simulation_tick_ms, 2000);
    }

    #[test]
    fn invalid_file_is_reported_with_path() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("geo_session_settings_{suffix}.toml"));
        fs::write(&path, "routing_timeout_ms = \"fast\"").expect("write");

        let err = load_settings(&path).expect_err("must fail");
        assert!(err.to_string().contains("invalid settings file"));

        fs::remove_file(path).expect("cleanup");
    }
}
