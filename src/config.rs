use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

use crate::error::ConfigError;
use crate::gesture::binding::{class_name_for_label, is_valid_class_name};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SamplerConfig {
    /// 推論間隔（ミリ秒）。200ms = 5回/秒
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// 推論タイムアウト（ミリ秒）。超過したら失敗扱い
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebounceConfig {
    /// 信頼度の下限 (0.0〜1.0)。未満はIdle扱い
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// ジェスチャー間の最小間隔（ミリ秒）
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// 「検出なし」を表すラベル名
    #[serde(default = "default_idle_label")]
    pub idle_label: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default)]
    pub index: i32,
    #[serde(default = "default_camera_size")]
    pub width: u32,
    #[serde(default = "default_camera_size")]
    pub height: u32,
    /// 左右反転（鏡像表示）
    #[serde(default = "default_flip")]
    pub flip: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// 姿勢推定モデル (MoveNet ONNX)
    #[serde(default = "default_pose_model")]
    pub pose_model: String,
    /// キーポイント → クラス確率の分類モデル (ONNX)
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
    /// ラベル一覧を含む metadata.json
    #[serde(default = "default_metadata")]
    pub metadata: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DebugConfig {
    /// 骨格を描画する（重いので既定はOFF）
    #[serde(default)]
    pub draw_pose: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BindingConfig {
    pub label: String,
    /// 再生するサウンドID（省略可）
    #[serde(default)]
    pub sound: Option<String>,
    /// 省略時はラベルから生成 ("Class 2" → "active-class-2")
    #[serde(default)]
    pub css_class: Option<String>,
}

impl BindingConfig {
    pub fn class_name(&self) -> String {
        self.css_class
            .clone()
            .unwrap_or_else(|| class_name_for_label(&self.label))
    }
}

fn default_interval_ms() -> u64 { 200 }
fn default_timeout_ms() -> u64 { 1000 }
fn default_confidence_threshold() -> f32 { 0.9 }
fn default_cooldown_ms() -> u64 { 2500 }
fn default_idle_label() -> String { "Idle".to_string() }
fn default_camera_size() -> u32 { 128 }
fn default_flip() -> bool { true }
fn default_pose_model() -> String { "models/movenet_lightning.onnx".to_string() }
fn default_classifier_model() -> String { "my_model/classifier.onnx".to_string() }
fn default_metadata() -> String { "my_model/metadata.json".to_string() }

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            cooldown_ms: default_cooldown_ms(),
            idle_label: default_idle_label(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: default_camera_size(),
            height: default_camera_size(),
            flip: default_flip(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pose_model: default_pose_model(),
            classifier_model: default_classifier_model(),
            metadata: default_metadata(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// ファイルが無ければ既定値。壊れたファイルはエラー
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("{} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// ループを動かせない設定を弾く。起動時に1回呼ぶ
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.debounce.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }
        if self.sampler.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.sampler.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let idle = self.debounce.idle_label.trim();
        if idle.is_empty() {
            return Err(ConfigError::EmptyIdleLabel);
        }

        let mut seen = HashSet::new();
        let mut classes: HashMap<String, &str> = HashMap::new();
        for (i, binding) in self.bindings.iter().enumerate() {
            if binding.label.trim().is_empty() {
                return Err(ConfigError::EmptyLabel(i));
            }
            if binding.label == self.debounce.idle_label {
                return Err(ConfigError::BindingIsIdle(binding.label.clone()));
            }
            if !seen.insert(binding.label.as_str()) {
                return Err(ConfigError::DuplicateBinding(binding.label.clone()));
            }
            let class = binding.class_name();
            if !is_valid_class_name(&class) {
                return Err(ConfigError::InvalidClassName {
                    label: binding.label.clone(),
                    class,
                });
            }
            if let Some(first) = classes.get(&class) {
                return Err(ConfigError::DuplicateClass {
                    class,
                    first: first.to_string(),
                    second: binding.label.clone(),
                });
            }
            classes.insert(class, binding.label.as_str());
            if matches!(&binding.sound, Some(s) if s.trim().is_empty()) {
                return Err(ConfigError::EmptySound(binding.label.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.sampler.interval_ms, 200);
        assert_eq!(config.sampler.timeout_ms, 1000);
        assert_eq!(config.debounce.confidence_threshold, 0.9);
        assert_eq!(config.debounce.cooldown_ms, 2500);
        assert_eq!(config.debounce.idle_label, "Idle");
        assert_eq!(config.camera.width, 128);
        assert!(config.camera.flip);
        assert!(!config.debug.draw_pose);
        assert!(config.bindings.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections_and_bindings() {
        let config = Config::from_toml_str(
            r#"
            [sampler]
            interval_ms = 100

            [debounce]
            confidence_threshold = 0.75
            cooldown_ms = 1000

            [[bindings]]
            label = "Duimpie"
            sound = "my_sounds/mars.mp3"

            [[bindings]]
            label = "Class 2"
            css_class = "wave"
            "#,
        )
        .unwrap();

        assert_eq!(config.sampler.interval_ms, 100);
        assert_eq!(config.sampler.timeout_ms, 1000);
        assert_eq!(config.debounce.confidence_threshold, 0.75);
        assert_eq!(config.debounce.cooldown_ms, 1000);
        assert_eq!(config.bindings.len(), 2);
        assert_eq!(config.bindings[0].class_name(), "active-duimpie");
        assert_eq!(config.bindings[0].sound.as_deref(), Some("my_sounds/mars.mp3"));
        assert_eq!(config.bindings[1].class_name(), "wave");
        assert_eq!(config.bindings[1].sound, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = Config::default();
        config.debounce.confidence_threshold = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::ThresholdOutOfRange(_))));

        config.debounce.confidence_threshold = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::ThresholdOutOfRange(_))));

        config.debounce.confidence_threshold = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::ThresholdOutOfRange(_))));
    }

    #[test]
    fn test_negative_cooldown_rejected_at_parse() {
        let result = Config::from_toml_str("[debounce]\ncooldown_ms = -5\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_interval_and_timeout() {
        let mut config = Config::default();
        config.sampler.interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval)));

        let mut config = Config::default();
        config.sampler.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_malformed_bindings() {
        let binding = |label: &str| BindingConfig {
            label: label.to_string(),
            sound: None,
            css_class: None,
        };

        let mut config = Config::default();
        config.bindings = vec![binding("A"), binding("A")];
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateBinding(l)) if l == "A"));

        config.bindings = vec![binding(" ")];
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLabel(0))));

        config.bindings = vec![binding("Idle")];
        assert!(matches!(config.validate(), Err(ConfigError::BindingIsIdle(_))));

        let mut bad_class = binding("A");
        bad_class.css_class = Some("has space".to_string());
        config.bindings = vec![bad_class];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidClassName { .. })));

        // 別ラベルでも生成されるクラス名が同じなら区別できない
        config.bindings = vec![binding("Class 2"), binding("Class-2")];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateClass { class, first, second })
                if class == "active-class-2" && first == "Class 2" && second == "Class-2"
        ));

        let mut explicit = binding("B");
        explicit.css_class = Some("active-a".to_string());
        config.bindings = vec![binding("A"), explicit];
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateClass { .. })));

        let mut empty_sound = binding("A");
        empty_sound.sound = Some(String::new());
        config.bindings = vec![empty_sound];
        assert!(matches!(config.validate(), Err(ConfigError::EmptySound(_))));
    }

    #[test]
    fn test_empty_idle_label() {
        let mut config = Config::default();
        config.debounce.idle_label = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyIdleLabel)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("definitely/not/here/config.toml").unwrap();
        assert_eq!(config.debounce.cooldown_ms, 2500);
    }
}
