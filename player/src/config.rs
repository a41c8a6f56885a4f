// Configuration for the streaming player

use std::path::PathBuf;

use wav_core::DEFAULT_CHUNK_SIZE;

pub const DEFAULT_URL: &str = "http://172.22.0.11:8081/v1/tts";
pub const DEFAULT_REFERENCE_ID: &str = "bg3_narrator";
pub const DEFAULT_TEXT: &str = include_str!("../assets/dawnridge.txt");

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub url: String,
    pub text: String,
    pub reference_id: String,
    pub api_token: Option<String>,
    pub chunk_size: usize,
    pub playback: bool,
    pub save_wav: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            text: DEFAULT_TEXT.trim().to_string(),
            reference_id: DEFAULT_REFERENCE_ID.to_string(),
            api_token: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            playback: true,
            save_wav: None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl PlayerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source, falling back to the
    /// defaults for missing or unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let url = lookup("TTS_URL")
            .and_then(non_empty)
            .unwrap_or(defaults.url);

        let text = lookup("TTS_TEXT")
            .and_then(non_empty)
            .unwrap_or(defaults.text);

        let reference_id = lookup("TTS_REFERENCE_ID")
            .and_then(non_empty)
            .unwrap_or(defaults.reference_id);

        let api_token = lookup("TTS_API_TOKEN").and_then(non_empty);

        let chunk_size = lookup("TTS_CHUNK_SIZE")
            .and_then(|v| v.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.chunk_size);

        let playback = lookup("TTS_PLAYBACK")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.playback);

        let save_wav = lookup("TTS_SAVE_WAV")
            .and_then(non_empty)
            .map(PathBuf::from);

        Self {
            url,
            text,
            reference_id,
            api_token,
            chunk_size,
            playback,
            save_wav,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> PlayerConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlayerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = config_from(&[]);
        assert_eq!(config.url, "http://172.22.0.11:8081/v1/tts");
        assert_eq!(config.reference_id, "bg3_narrator");
        assert_eq!(config.chunk_size, 4096);
        assert!(config.playback);
        assert!(config.api_token.is_none());
        assert!(config.save_wav.is_none());
        assert!(config.text.starts_with("The first light of dawn"));
        assert!(config.text.ends_with("whatever may come?"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TTS_URL", "http://localhost:8081/v1/tts"),
            ("TTS_TEXT", "Hello"),
            ("TTS_REFERENCE_ID", "narrator_2"),
            ("TTS_API_TOKEN", "abc"),
            ("TTS_CHUNK_SIZE", "1024"),
            ("TTS_PLAYBACK", "false"),
            ("TTS_SAVE_WAV", "/tmp/out.wav"),
        ]);
        assert_eq!(config.url, "http://localhost:8081/v1/tts");
        assert_eq!(config.text, "Hello");
        assert_eq!(config.reference_id, "narrator_2");
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.chunk_size, 1024);
        assert!(!config.playback);
        assert_eq!(config.save_wav, Some(PathBuf::from("/tmp/out.wav")));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("TTS_CHUNK_SIZE", "0"),
            ("TTS_PLAYBACK", "maybe"),
            ("TTS_URL", "   "),
            ("TTS_API_TOKEN", ""),
        ]);
        assert_eq!(config.chunk_size, 4096);
        assert!(config.playback);
        assert_eq!(config.url, DEFAULT_URL);
        assert!(config.api_token.is_none());

        let config = config_from(&[("TTS_CHUNK_SIZE", "lots")]);
        assert_eq!(config.chunk_size, 4096);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
