use std::ffi::OsString;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Remissio";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "REMISSIO_DATA_DIR";

/// File name of the SQLite-backed local store inside the data directory.
pub const STORE_FILE_NAME: &str = "local-storage.db";

/// Get the application data directory.
/// `$REMISSIO_DATA_DIR` if set, otherwise ~/Remissio/.
pub fn app_data_dir() -> Option<PathBuf> {
    resolve_data_dir(std::env::var_os(DATA_DIR_ENV), dirs::home_dir())
}

/// Get the path of the local store file.
pub fn store_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(STORE_FILE_NAME))
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "remissio=info"
}

fn resolve_data_dir(env_override: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    match env_override {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home.map(|h| h.join(APP_NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_under_home_by_default() {
        let dir = resolve_data_dir(None, Some(PathBuf::from("/home/alice"))).unwrap();
        assert_eq!(dir, PathBuf::from("/home/alice/Remissio"));
    }

    #[test]
    fn env_override_wins() {
        let dir = resolve_data_dir(
            Some(OsString::from("/tmp/remissio-data")),
            Some(PathBuf::from("/home/alice")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/remissio-data"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let dir = resolve_data_dir(Some(OsString::new()), Some(PathBuf::from("/home/bob"))).unwrap();
        assert!(dir.ends_with("Remissio"));
    }

    #[test]
    fn no_home_and_no_override_is_none() {
        assert!(resolve_data_dir(None, None).is_none());
    }

    #[test]
    fn app_name_is_remissio() {
        assert_eq!(APP_NAME, "Remissio");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
