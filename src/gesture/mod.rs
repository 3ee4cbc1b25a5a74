pub mod binding;
pub mod debounce;
pub mod sample;

pub use binding::{BindingTable, GestureBinding};
pub use debounce::{Debouncer, GestureEvent, GestureState};
pub use sample::{GestureSample, Millis, Prediction};
