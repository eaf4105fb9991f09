//! Integration tests for secretenv
//!
//! These drive the full pipeline end to end, including the real process
//! environment. Everything touching process-wide state is serialized.

use std::sync::Arc;

use secretenv::{
    MemoryEnv, SecretManager, SecretManagerConfig, StaticProvider,
};
use serial_test::serial;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cached_config(temp: &TempDir, hash_key: Option<&str>) -> SecretManagerConfig {
    SecretManagerConfig {
        env_path: Some(temp.path().join(".env.secret")),
        hash_key: hash_key.map(str::to_string),
        debug: false,
        ..Default::default()
    }
}

mod process_env {
    use super::*;

    const PORT_KEY: &str = "SECRETENV_IT_PORT";
    const VN_KEY: &str = "SECRETENV_IT_VN";

    fn clear_vars() {
        std::env::remove_var(PORT_KEY);
        std::env::remove_var(VN_KEY);
    }

    #[tokio::test]
    #[serial]
    async fn injects_into_real_environment() {
        init_tracing();
        clear_vars();

        let provider = StaticProvider::from_pairs([(PORT_KEY, "3000"), (VN_KEY, "Việt nam")]);
        let config = SecretManagerConfig {
            use_cache: false,
            debug: false,
            ..Default::default()
        };

        let manager = SecretManager::new(provider, config);
        manager.load_env(&[PORT_KEY, VN_KEY]).await.unwrap();

        assert_eq!(std::env::var(PORT_KEY).unwrap(), "3000");
        assert_eq!(std::env::var(VN_KEY).unwrap(), "Việt nam");

        clear_vars();
    }

    #[tokio::test]
    #[serial]
    async fn disabled_pipeline_leaves_environment_untouched() {
        init_tracing();
        clear_vars();

        let provider = StaticProvider::from_pairs([(PORT_KEY, "3000")]);
        let config = SecretManagerConfig {
            enable: false,
            use_cache: false,
            debug: false,
            ..Default::default()
        };

        let manager = SecretManager::new(provider, config);
        manager.load_env(&[PORT_KEY]).await.unwrap();

        assert!(std::env::var(PORT_KEY).is_err());
    }
}

mod cache_reuse {
    use super::*;

    #[tokio::test]
    async fn second_instance_with_same_key_material_reads_cache() {
        init_tracing();
        let temp = TempDir::new().unwrap();

        let first = SecretManager::with_env_sink(
            StaticProvider::from_pairs([("PORT", "3000"), ("VN", "Việt nam")]),
            cached_config(&temp, Some("k1")),
            Arc::new(MemoryEnv::new()),
        );
        first.load_env(&["PORT", "VN"]).await.unwrap();

        // Fresh instance, empty provider: values must come from disk
        let env = Arc::new(MemoryEnv::new());
        let second = SecretManager::with_env_sink(
            StaticProvider::default(),
            cached_config(&temp, Some("k1")),
            env.clone(),
        );
        second.load_env(&["PORT", "VN"]).await.unwrap();

        assert_eq!(env.get("PORT").as_deref(), Some("3000"));
        assert_eq!(env.get("VN").as_deref(), Some("Việt nam"));
    }

    #[tokio::test]
    async fn second_instance_with_different_key_material_gets_nothing() {
        init_tracing();
        let temp = TempDir::new().unwrap();

        let first = SecretManager::with_env_sink(
            StaticProvider::from_pairs([("PORT", "3000"), ("VN", "Việt nam")]),
            cached_config(&temp, Some("k1")),
            Arc::new(MemoryEnv::new()),
        );
        first.load_env(&["PORT", "VN"]).await.unwrap();

        let env = Arc::new(MemoryEnv::new());
        let second = SecretManager::with_env_sink(
            StaticProvider::default(),
            cached_config(&temp, Some("different")),
            env.clone(),
        );
        second.load_env(&["PORT", "VN"]).await.unwrap();

        assert!(env.get("PORT").is_none());
        assert!(env.get("VN").is_none());
    }

    #[tokio::test]
    async fn cache_file_on_disk_is_encrypted() {
        init_tracing();
        let temp = TempDir::new().unwrap();

        let manager = SecretManager::with_env_sink(
            StaticProvider::from_pairs([("TOKEN", "super-sensitive")]),
            cached_config(&temp, Some("k1")),
            Arc::new(MemoryEnv::new()),
        );
        manager.load_env(&["TOKEN"]).await.unwrap();

        let raw = std::fs::read_to_string(temp.path().join(".env.secret")).unwrap();
        assert!(raw.starts_with("TOKEN="));
        assert!(!raw.contains("super-sensitive"));

        let script = std::fs::read_to_string(temp.path().join("remove-secret.sh")).unwrap();
        assert!(script.contains(".env.secret"));
    }
}
