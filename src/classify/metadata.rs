use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Teachable Machine 形式の `metadata.json`（必要な部分だけ）
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMetadata {
    /// クラス名（分類ヘッドの出力順）
    pub labels: Vec<String>,
    #[serde(default, rename = "modelName")]
    pub model_name: Option<String>,
}

impl ModelMetadata {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let metadata: ModelMetadata =
            serde_json::from_str(content).context("Invalid model metadata")?;
        if metadata.labels.is_empty() {
            anyhow::bail!("Model metadata lists no labels");
        }
        Ok(metadata)
    }

    pub fn class_count(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_teachable_machine_metadata() {
        let json = r#"{
            "tfjsVersion": "1.3.1",
            "tmVersion": "2.4.7",
            "packageVersion": "0.8.6",
            "packageName": "@teachablemachine/pose",
            "timeStamp": "2024-03-01T10:00:00.000Z",
            "userMetadata": {},
            "modelName": "my-pose-model",
            "labels": ["Duimpie", "Class 2", "Class 3"]
        }"#;
        let metadata = ModelMetadata::from_json_str(json).unwrap();
        assert_eq!(metadata.class_count(), 3);
        assert_eq!(metadata.labels[1], "Class 2");
        assert_eq!(metadata.model_name.as_deref(), Some("my-pose-model"));
    }

    #[test]
    fn test_missing_or_empty_labels() {
        assert!(ModelMetadata::from_json_str(r#"{"labels": []}"#).is_err());
        assert!(ModelMetadata::from_json_str(r#"{"modelName": "x"}"#).is_err());
        assert!(ModelMetadata::from_json_str("not json").is_err());
    }
}
