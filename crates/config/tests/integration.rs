//! Integration tests for config

#[cfg(test)]
mod tests {
    use nbs_config::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 7] = [
        "NBS_QUIET",
        "NBS_TIMEOUT",
        "NBS_PROBE_WORKERS",
        "NBS_PROBE_RETRIES",
        "NBS_MIRRORS_PER_COMPONENT",
        "NBS_PPA_BASE",
        "NBS_CACHE_DIR",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.general.quiet);
        assert_eq!(config.network.timeout(), Duration::from_secs(20));
        assert_eq!(config.probe.workers, 5);
        assert_eq!(config.probe.retries, 3);
        assert_eq!(
            config.probe.jitter(),
            (Duration::from_millis(200), Duration::from_millis(600))
        );
        assert_eq!(config.probe.mirrors_per_component, 1);
        assert_eq!(config.probe.ppa_base, "https://ppa.launchpadcontent.net");
        assert_eq!(config.download.passes, 2);
        assert_eq!(config.download.chunk_size, 1024 * 1024);
        assert!(config.mirrors.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
quiet = true

[network]
timeout = 5

[probe]
workers = 8
mirrors_per_component = 0

[paths]
cache_dir = "/var/cache/nbs"

[mirrors]
debian = ["https://deb.internal/debian"]
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert!(config.general.quiet);
        assert_eq!(config.network.timeout, 5);
        assert_eq!(config.network.connect_timeout, 20);
        assert_eq!(config.probe.workers, 8);
        assert_eq!(config.probe.retries, 3);
        assert_eq!(config.probe.mirrors_per_component, 0);
        assert_eq!(config.cache_dir(), PathBuf::from("/var/cache/nbs"));
        assert_eq!(
            config.mirrors["debian"],
            vec!["https://deb.internal/debian".to_string()]
        );
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[probe]\nworkers = 0").unwrap();

        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(err.to_string().contains("probe.workers"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = Config::load_from_file(std::path::Path::new("/nonexistent/nbs.toml")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("NBS_QUIET", "yes");
        std::env::set_var("NBS_TIMEOUT", "7");
        std::env::set_var("NBS_PROBE_WORKERS", "2");
        std::env::set_var("NBS_CACHE_DIR", "/tmp/nbs-cache");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert!(config.general.quiet);
        assert_eq!(config.network.timeout, 7);
        assert_eq!(config.network.connect_timeout, 7);
        assert_eq!(config.probe.workers, 2);
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/nbs-cache"));

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("NBS_PROBE_RETRIES", "many");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    fn test_plan_parsing() {
        let plan = BuildPlan::from_toml(
            r#"
packages = ["base-files", "bash"]

[[repositories]]
distro = "debian"
release = "bookworm"
arch = "amd64"
components = ["main", "contrib"]

[[repositories]]
ppa = "nitrux/tools"
release = "noble"
arch = "amd64"
"#,
        )
        .unwrap();

        assert_eq!(plan.packages, vec!["base-files", "bash"]);
        assert_eq!(plan.cache_name(), "bootstrap");
        assert_eq!(plan.repositories.len(), 2);
        assert_eq!(plan.repositories[0].components, vec!["main", "contrib"]);
        assert!(plan.repositories[1].is_ppa());
        assert_eq!(plan.repositories[1].components, vec!["main"]);
    }

    #[tokio::test]
    async fn test_plan_without_packages_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "cache_name = \"base\"").unwrap();

        let err = BuildPlan::load_from_file(temp_file.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("packages"));
    }
}
