//! Geographic primitives: angles on the compass circle and observer places.
//!
//! ## Module Structure
//!
//! - [`angles`]: signed and absolute angular distance on a 360° circle
//! - [`place`]: observer location and the `(place, instant)` query key

pub mod angles;
pub mod place;

pub use angles::{arc, distance, normalize_degrees};
pub use place::{Place, PlaceTime};
