//! Domain types shared across the pipeline and the analytics layer.

mod fill;
mod signal;
mod window;

pub use fill::{EngineFill, OptionType, Side};
pub use signal::{Direction, RawSignal, Signal};
pub use window::TradeWindow;
