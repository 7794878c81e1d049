use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Mechanical axis of the alt-az mount.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, Serialize, Deserialize)]
pub enum Axis {
    Altitude,
    Azimuth,
}

/// Jog direction of a directional slew.
///
/// `Down`/`Up` move the altitude axis, `Left`/`Right` the azimuth axis. A left
/// jog walks the azimuth from the zero reference towards -180°.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    Left,
    Right,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Altitude,
            Direction::Left | Direction::Right => Axis::Azimuth,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Sign of the angular change this direction produces on its axis.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up | Direction::Right => 1.0,
            Direction::Down | Direction::Left => -1.0,
        }
    }
}
