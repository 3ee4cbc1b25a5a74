use crate::pose::KeypointIndex;

/// 骨格の接続定義 (開始キーポイント, 終了キーポイント)
pub const SKELETON_CONNECTIONS: [(KeypointIndex, KeypointIndex); 12] = [
    // 上半身
    (KeypointIndex::LeftShoulder, KeypointIndex::RightShoulder),
    (KeypointIndex::LeftShoulder, KeypointIndex::LeftElbow),
    (KeypointIndex::LeftElbow, KeypointIndex::LeftWrist),
    (KeypointIndex::RightShoulder, KeypointIndex::RightElbow),
    (KeypointIndex::RightElbow, KeypointIndex::RightWrist),
    // 胴体
    (KeypointIndex::LeftShoulder, KeypointIndex::LeftHip),
    (KeypointIndex::RightShoulder, KeypointIndex::RightHip),
    (KeypointIndex::LeftHip, KeypointIndex::RightHip),
    // 下半身
    (KeypointIndex::LeftHip, KeypointIndex::LeftKnee),
    (KeypointIndex::LeftKnee, KeypointIndex::LeftAnkle),
    (KeypointIndex::RightHip, KeypointIndex::RightKnee),
    (KeypointIndex::RightKnee, KeypointIndex::RightAnkle),
];

/// キーポイントの色 (RGB)
pub const KEYPOINT_COLOR: u32 = 0x00FF00;

/// 骨格線の色 (RGB)
pub const SKELETON_COLOR: u32 = 0xFFFF00;

/// この信頼度以上のキーポイントだけ描画
pub const KEYPOINT_THRESHOLD: f32 = 0.5;

/// クラスごとのバナー色（名前の FNV-1a）。各チャンネル 0x60 以上
pub fn class_color(class: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for b in class.bytes() {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    let channel = |shift: u32| 0x60 + ((hash >> shift) & 0xFF) * 0x9F / 0xFF;
    (channel(16) << 16) | (channel(8) << 8) | channel(0)
}
