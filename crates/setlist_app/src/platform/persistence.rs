use serde::{Deserialize, Serialize};
use setlist_core::OptionSet;
use setlist_engine::StateDir;
use setlist_logging::{setlist_error, setlist_info, setlist_warn};

const STATE_FILENAME: &str = "setlist_state.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSettings {
    /// Comma-joined enabled option ids.
    setlist_options: String,
}

/// `None` when nothing usable was stored; failures are logged, never raised.
pub(crate) fn load_options(state_dir: &StateDir) -> Option<OptionSet> {
    let content = match state_dir.read_to_string(STATE_FILENAME) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            setlist_warn!(
                "Failed to read saved options from {:?}: {}",
                state_dir.path(),
                err
            );
            return None;
        }
    };

    let settings: PersistedSettings = match ron::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            setlist_warn!(
                "Failed to parse saved options in {:?}: {}",
                state_dir.path(),
                err
            );
            return None;
        }
    };

    setlist_info!("Loaded saved options from {:?}", state_dir.path());
    Some(OptionSet::from_comma_joined(&settings.setlist_options))
}

pub(crate) fn save_options(state_dir: &StateDir, options: &OptionSet) {
    let settings = PersistedSettings {
        setlist_options: options.to_comma_joined(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&settings, pretty) {
        Ok(text) => text,
        Err(err) => {
            setlist_error!("Failed to serialize options: {}", err);
            return;
        }
    };

    if let Err(err) = state_dir.write_atomic(STATE_FILENAME, &content) {
        setlist_error!(
            "Failed to save options to {:?}: {}",
            state_dir.path(),
            err
        );
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn nothing_saved_yet() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_options(&StateDir::new(temp.path())), None);
    }

    #[test]
    fn saved_selection_comes_back_regardless_of_order() {
        let temp = TempDir::new().unwrap();
        let dir = StateDir::new(temp.path().join("state"));

        let saved: OptionSet = ["medleys", "tapes-main"].into_iter().collect();
        save_options(&dir, &saved);

        let loaded = load_options(&dir).unwrap();
        let expected: OptionSet = ["tapes-main", "medleys"].into_iter().collect();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn empty_selection_is_remembered_as_empty() {
        let temp = TempDir::new().unwrap();
        let dir = StateDir::new(temp.path());
        save_options(&dir, &OptionSet::new());
        assert_eq!(load_options(&dir), Some(OptionSet::new()));
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(STATE_FILENAME), "not ron at all (").unwrap();
        assert_eq!(load_options(&StateDir::new(temp.path())), None);
    }
}
