use std::collections::HashMap;

use crate::config::BindingConfig;

/// ジェスチャーラベルに紐づく表示と音
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureBinding {
    pub label: String,
    pub sound: Option<String>,
    pub class_name: String,
}

/// ラベル → バインディング。起動時に1回作り、以後は読み取りのみ
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: HashMap<String, GestureBinding>,
}

impl BindingTable {
    pub fn new(bindings: impl IntoIterator<Item = GestureBinding>) -> Self {
        Self {
            bindings: bindings
                .into_iter()
                .map(|b| (b.label.clone(), b))
                .collect(),
        }
    }

    pub fn from_config(bindings: &[BindingConfig]) -> Self {
        Self::new(bindings.iter().map(|b| GestureBinding {
            label: b.label.clone(),
            sound: b.sound.clone(),
            class_name: b.class_name(),
        }))
    }

    pub fn get(&self, label: &str) -> Option<&GestureBinding> {
        self.bindings.get(label)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// ラベルから既定のクラス名を作る
///
/// 小文字化し、`[a-z0-9_-]` 以外を `-` に置き換えて `active-` を付ける
pub fn class_name_for_label(label: &str) -> String {
    let safe: String = label
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '-' => c,
            _ => '-',
        })
        .collect();
    format!("active-{}", safe)
}

pub fn is_valid_class_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
