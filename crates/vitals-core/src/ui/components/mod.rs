mod button;
mod gauge;
mod sparkline;
pub mod text;

pub use button::Button;
pub use gauge::Gauge;
pub use sparkline::Sparkline;
