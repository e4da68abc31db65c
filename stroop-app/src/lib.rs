pub mod sink;

pub use sink::JsonLinesSink;

use anyhow::{Context, Result};
use std::path::Path;
use stroop_core::Key;
use stroop_experiment::StroopConfig;
use tracing::info;
use winit::keyboard::KeyCode;

/// Default options, or the JSON file at `path` when one is given.
pub fn load_config(path: Option<&Path>) -> Result<StroopConfig> {
    let Some(path) = path else {
        info!("no config file given, using defaults");
        return Ok(StroopConfig::default());
    };
    let config = StroopConfig::from_json_file(path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Physical key to task key. Layout independent, so the response keys stay
/// put on non-QWERTY keyboards.
pub fn key_for(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyN => Key::N,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_task_keys_are_mapped() {
        assert_eq!(key_for(KeyCode::KeyR), Some(Key::R));
        assert_eq!(key_for(KeyCode::Space), Some(Key::Space));
        assert_eq!(key_for(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(key_for(KeyCode::KeyX), None);
        assert_eq!(key_for(KeyCode::Enter), None);
    }

    #[test]
    fn missing_config_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.practice_ids.len(), config.practice_limit);
        assert_eq!(config.total_trials, 128);
    }
}
