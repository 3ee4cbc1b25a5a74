pub mod skeleton;
#[cfg(feature = "desktop")]
pub mod window;

pub use skeleton::{class_color, SKELETON_CONNECTIONS};
#[cfg(feature = "desktop")]
pub use window::WindowPresenter;
