//! Editor configuration from TOML (`[editor]` section)

use refract_application::EditorConfig;
use refract_application::config::{DEFAULT_FAST_MODEL, DEFAULT_QUALITY_MODEL};
use refract_domain::{ConfigIssue, ConfigIssueCode, EditPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEditorConfig {
    /// Explicit image model; overrides `policy`
    pub model: Option<String>,
    /// "fast" or "quality"
    pub policy: String,
    pub fast_model: String,
    pub quality_model: String,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
    pub passes: usize,
}

impl Default for FileEditorConfig {
    fn default() -> Self {
        Self {
            model: None,
            policy: EditPolicy::default().to_string(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            quality_model: DEFAULT_QUALITY_MODEL.to_string(),
            aspect_ratio: None,
            image_size: None,
            passes: 1,
        }
    }
}

impl FileEditorConfig {
    /// Parse the policy string, falling back to the default on error.
    pub fn parse_policy(&self) -> (EditPolicy, Vec<ConfigIssue>) {
        match self.policy.parse::<EditPolicy>() {
            Ok(policy) => (policy, Vec::new()),
            Err(e) => (
                EditPolicy::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidEditPolicy,
                    format!("editor.policy: {}", e),
                )],
            ),
        }
    }

    pub fn to_editor_config(&self) -> (EditorConfig, Vec<ConfigIssue>) {
        let (policy, mut issues) = self.parse_policy();

        if self.passes == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroPasses,
                "editor.passes must be at least 1",
            ));
        }

        let mut config = EditorConfig {
            model: None,
            policy,
            fast_model: self.fast_model.clone(),
            quality_model: self.quality_model.clone(),
            aspect_ratio: self.aspect_ratio.clone(),
            image_size: self.image_size.clone(),
            passes: 1,
        }
        .with_passes(self.passes);
        if let Some(model) = self.model.as_deref().filter(|m| !m.trim().is_empty()) {
            config = config.with_model(model);
        }
        (config, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_converts_cleanly() {
        let (config, issues) = FileEditorConfig::default().to_editor_config();
        assert!(issues.is_empty());
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_bad_policy_reported() {
        let file = FileEditorConfig {
            policy: "turbo".into(),
            ..Default::default()
        };
        let (config, issues) = file.to_editor_config();
        assert_eq!(config.policy, EditPolicy::Quality);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::InvalidEditPolicy);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_zero_passes_reported_and_floored() {
        let file = FileEditorConfig {
            passes: 0,
            ..Default::default()
        };
        let (config, issues) = file.to_editor_config();
        assert_eq!(config.passes, 1);
        assert_eq!(issues[0].code, ConfigIssueCode::ZeroPasses);
    }

    #[test]
    fn test_model_override_and_hints() {
        let toml_str = r#"
[editor]
model = "custom-image-model"
policy = "fast"
aspect_ratio = "4:3"
passes = 3
"#;
        let file: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let (config, issues) = file.editor.to_editor_config();
        assert!(issues.is_empty());
        assert_eq!(config.select_model(), "custom-image-model");
        assert_eq!(config.policy, EditPolicy::Fast);
        assert_eq!(config.aspect_ratio.as_deref(), Some("4:3"));
        assert_eq!(config.passes, 3);
    }

    #[test]
    fn test_blank_model_ignored() {
        let file = FileEditorConfig {
            model: Some("  ".into()),
            ..Default::default()
        };
        let (config, _) = file.to_editor_config();
        assert_eq!(config.select_model(), DEFAULT_QUALITY_MODEL);
    }
}
