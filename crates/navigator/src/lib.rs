#![deny(unsafe_code)]

//! Street safety navigator: a marker walks a fixed street grid and reveals the
//! randomly assigned safety tier of every street it enters.

mod geometry;
mod navigator;
mod panel;
mod safety;
mod street;

pub use geometry::{Bounds, Direction, Position};
pub use navigator::{
    LABEL_OFFSET_Y, MAP_BOUNDS, MAP_HEIGHT, MAP_WIDTH, MOVE_STEP, MoveOutcome, Reveal,
    START_POSITION, StreetSafetyNavigator,
};
pub use panel::{INITIAL_PROMPT_BODY, INITIAL_PROMPT_TITLE, SafetyPanel, SafetyReport};
pub use safety::{SafetyInfo, SafetyTier};
pub use street::{STREET_COUNT, Street, StreetName, UnknownStreet};
