//! Horizontal and vertical product differentiation
//!
//! - `hotelling`: two firms on a line, consumers pay linear transport costs
//! - `salop`: n firms evenly spaced on a circle, fixed count or free entry
//! - `vertical`: a high- and a low-quality seller splitting a taste range

pub mod hotelling;
pub mod salop;
pub mod spatial;
pub mod vertical;

pub use hotelling::{hotelling, HotellingOutcome, HotellingParams};
pub use salop::{salop, SalopEntry, SalopOutcome, SalopParams};
pub use vertical::{vertical, VerticalOutcome, VerticalParams};
