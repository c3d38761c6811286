    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_worker_count_is_rejected() {
        let mut config = Config::default();
        config.worker_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "worker_count", .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(std::path::Path::new("/nonexistent/ac.toml"))).unwrap();
        assert_eq!(config.worker_count, 4);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ac.toml");
        std::fs::write(&path, "worker_count = 8\nreceived_queue_cap = 20\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.received_queue_cap, 20);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ac.toml");
        std::fs::write(&path, "worker_count = 8\n").unwrap();

        std::env::set_var("AC_WORKER_COUNT", "16");
        let config = Config::load(Some(&path)).unwrap();
        std::env::remove_var("AC_WORKER_COUNT");

        assert_eq!(config.worker_count, 16);
    }

    #[test]
    fn debug_port_base_defaults_to_unset_and_layers_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ac.toml");
        std::fs::write(&path, "debug_port_base = 9000\n").unwrap();

        assert_eq!(Config::default().debug_port_base, None);
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.debug_port_base, Some(9000));
    }

    #[test]
    fn worker_command_is_layered_like_every_other_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ac.toml");
        std::fs::write(&path, "worker_command = \"/opt/worker/bin\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.worker_command, PathBuf::from("/opt/worker/bin"));

        std::env::set_var("AC_WORKER_COMMAND", "/override/worker");
        let config = Config::load(Some(&path)).unwrap();
        std::env::remove_var("AC_WORKER_COMMAND");
        assert_eq!(config.worker_command, PathBuf::from("/override/worker"));
    }
