    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_invalid_port() {
        let mut config = Config::default();
        config.server.port = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "server.port"));
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.server.host = String::new();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "server.host"));
    }

    #[test]
    fn test_validate_empty_default_agent() {
        let mut config = Config::default();
        config.workflows.default_agent = String::new();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "workflows.default_agent"));
    }

    #[test]
    fn test_validate_malformed_inline_locator() {
        let mut config = Config::default();
        config
            .workflows
            .graphs
            .insert("broken".to_string(), "workflows/echo".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "workflows.graphs.broken"));
    }

    #[test]
    fn test_validate_empty_db_uri_env() {
        let mut config = Config::default();
        config.checkpoint.db_uri_env = "  ".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "checkpoint.db_uri_env"));
    }

    #[test]
    fn test_validate_pruning_disabled_warning() {
        let mut config = Config::default();
        config.checkpoint.max_checkpoints_per_thread = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.path == "checkpoint.max_checkpoints_per_thread"));
    }

    #[test]
    fn test_validate_locators_default_agent_unmapped() {
        let config = Config::default();
        let locators = WorkflowLocators::default();

        let result = ConfigValidator::validate_locators(&config, &locators).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "workflows.default_agent"));
    }

    #[test]
    fn test_validate_locators_malformed_file_entry() {
        let config = Config::default();
        let mut locators = WorkflowLocators::default();
        locators.insert("echo", "workflows/echo:build_workflow");
        locators.insert("ghost", "no-separator");

        let result = ConfigValidator::validate_locators(&config, &locators).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "graphs.ghost");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_into_result() {
        let mut result = ValidationResult::default();
        result.add_warning(ValidationWarning::new("a", "b"));
        assert_eq!(result.into_result().unwrap().len(), 1);

        let mut result = ValidationResult::default();
        result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        let err = result.into_result().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }
