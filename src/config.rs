use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Telecare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8421";

pub fn default_log_filter() -> String {
    "info,telecare=debug".to_string()
}

/// Application data directory, ~/Telecare/ on all platforms.
/// Overridable via TELECARE_DATA_DIR.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TELECARE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Telecare")
}

pub fn database_path() -> PathBuf {
    app_data_dir().join("telecare.db")
}

/// Bind address for the API server, overridable via TELECARE_BIND_ADDR.
pub fn bind_addr() -> SocketAddr {
    std::env::var("TELECARE_BIND_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            DEFAULT_BIND_ADDR
                .parse()
                .expect("default bind address is valid")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_under_data_dir() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("telecare.db"));
    }

    #[test]
    fn default_bind_addr_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 8421);
    }

    #[test]
    fn app_name_is_telecare() {
        assert_eq!(APP_NAME, "Telecare");
    }
}
