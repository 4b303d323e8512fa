//! Fixed names and defaults shared by the configuration layer

/// Directory name under the user's config and cache directories.
pub const APP_DIR: &str = "nbs";

pub const CONFIG_FILE: &str = "config.toml";

/// Cache namespace used when a build plan does not name one.
pub const DEFAULT_CACHE_NAME: &str = "bootstrap";

/// Per-namespace directory that receives downloaded `.deb` files.
pub const DEBS_DIR: &str = "debs";

/// Directory under the cache root for `--debug` log files.
pub const LOGS_DIR: &str = "logs";

pub const DEFAULT_PPA_BASE: &str = "https://ppa.launchpadcontent.net";

pub const DEFAULT_USER_AGENT: &str = concat!("nbs/", env!("CARGO_PKG_VERSION"));

/// 1 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
