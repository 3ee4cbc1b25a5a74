use anyhow::Result;
use minifb::{Key, Window, WindowOptions};
use opencv::core::{Mat, Vec3b};
use opencv::prelude::*;
use std::time::{Duration, Instant};
use tracing::info;

use crate::effect::Presenter;
use crate::error::EffectError;
use crate::pose::Pose;
use crate::render::skeleton::{class_color, KEYPOINT_COLOR, SKELETON_COLOR, SKELETON_CONNECTIONS};

/// バナーの高さ（ピクセル）
const BANNER_HEIGHT: usize = 24;
/// サウンド再生時の枠フラッシュ
const SOUND_FLASH: Duration = Duration::from_millis(600);
const SOUND_FLASH_WIDTH: usize = 4;
const SOUND_FLASH_COLOR: u32 = 0xFFFFFF;

/// minifbウィンドウを表示先にしたプレゼンター
///
/// アクティブなクラスを上部バナーの色とタイトルで示し、
/// サウンド再生は枠のフラッシュで示す（音声出力は外部）。
/// タイトル末尾には「Detected: ラベル」を常に表示する
pub struct WindowPresenter {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
    title: String,
    active_class: Option<String>,
    detection: Option<(String, f32)>,
    sound: Option<(String, Instant)>,
}

impl WindowPresenter {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        Ok(Self {
            window,
            buffer: vec![0u32; width * height],
            width,
            height,
            title: title.to_string(),
            active_class: None,
            detection: None,
            sound: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// BGR Mat をウィンドウサイズに拡大して描画（最近傍）
    pub fn draw_frame(&mut self, frame: &Mat) -> Result<()> {
        let frame_width = frame.cols() as usize;
        let frame_height = frame.rows() as usize;
        if frame_width == 0 || frame_height == 0 {
            return Ok(());
        }

        for y in 0..self.height {
            let sy = (y * frame_height / self.height) as i32;
            for x in 0..self.width {
                let sx = (x * frame_width / self.width) as i32;
                let pixel = frame.at_2d::<Vec3b>(sy, sx)?;
                let r = pixel[2] as u32;
                let g = pixel[1] as u32;
                let b = pixel[0] as u32;
                self.buffer[y * self.width + x] = (r << 16) | (g << 8) | b;
            }
        }

        Ok(())
    }

    pub fn draw_pose(&mut self, pose: &Pose, confidence_threshold: f32) {
        let w = self.width as u32;
        let h = self.height as u32;

        for (start_idx, end_idx) in SKELETON_CONNECTIONS.iter() {
            let start = pose.get(*start_idx);
            let end = pose.get(*end_idx);
            if start.is_valid(confidence_threshold) && end.is_valid(confidence_threshold) {
                let (x1, y1) = start.to_pixel(w, h);
                let (x2, y2) = end.to_pixel(w, h);
                self.draw_line(x1, y1, x2, y2, SKELETON_COLOR);
            }
        }

        for kp in pose.keypoints.iter().filter(|k| k.is_valid(confidence_threshold)) {
            let (px, py) = kp.to_pixel(w, h);
            self.draw_circle(px, py, 3, KEYPOINT_COLOR);
        }
    }

    /// オーバーレイを重ねてウィンドウに表示
    pub fn update(&mut self) -> Result<()> {
        if let Some(class) = &self.active_class {
            let color = class_color(class);
            let rows = BANNER_HEIGHT.min(self.height);
            self.buffer[..rows * self.width].fill(color);
        }

        let flashing = matches!(&self.sound, Some((_, started)) if started.elapsed() < SOUND_FLASH);
        if flashing {
            self.draw_border(SOUND_FLASH_WIDTH, SOUND_FLASH_COLOR);
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }

    fn window_title(&self) -> String {
        format_title(
            &self.title,
            self.active_class.as_deref(),
            self.detection.as_ref().map(|(l, c)| (l.as_str(), *c)),
        )
    }

    fn draw_border(&mut self, thickness: usize, color: u32) {
        let t = thickness.min(self.width / 2).min(self.height / 2);
        for y in 0..self.height {
            for x in 0..self.width {
                if x < t || y < t || x >= self.width - t || y >= self.height - t {
                    self.buffer[y * self.width + x] = color;
                }
            }
        }
    }

    /// Bresenhamのアルゴリズムで線を描画
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }
}

/// 「基本タイトル - クラス | Detected: ラベル (xx%)」
fn format_title(base: &str, class: Option<&str>, detection: Option<(&str, f32)>) -> String {
    let mut title = base.to_string();
    if let Some(class) = class {
        title.push_str(&format!(" - {}", class));
    }
    if let Some((label, confidence)) = detection {
        title.push_str(&format!(" | Detected: {} ({:.0}%)", label, confidence * 100.0));
    }
    title
}

impl Presenter for WindowPresenter {
    fn set_active_gesture_class(&mut self, class: Option<&str>) -> Result<(), EffectError> {
        self.active_class = class.map(str::to_string);
        let title = self.window_title();
        self.window.set_title(&title);
        Ok(())
    }

    fn play_sound(&mut self, sound: &str) -> Result<(), EffectError> {
        info!("sound cue {}", sound);
        self.sound = Some((sound.to_string(), Instant::now()));
        Ok(())
    }

    fn show_detection(&mut self, label: &str, confidence: f32) -> Result<(), EffectError> {
        // 1%未満の変化ではタイトルを更新しない
        let changed = match &self.detection {
            Some((l, c)) => l != label || (c - confidence).abs() >= 0.01,
            None => true,
        };
        if changed {
            self.detection = Some((label.to_string(), confidence));
            let title = self.window_title();
            self.window.set_title(&title);
        }
        Ok(())
    }
}
