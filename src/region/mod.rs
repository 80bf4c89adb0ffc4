//! Screen region handling.
//!
//! This module provides:
//! - The `Region` rectangle used for every capture in a run
//! - Persistence of the last selected region (`store`)
//! - Hotkey corner selection on the live screen (`selection`)
//! - The preview image shown before a selection is accepted (`preview`)

pub mod preview;
pub mod selection;
pub mod store;

pub use selection::select_region;
pub use store::{load_saved_region, save_region};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangle in screen pixel coordinates.
///
/// Serialized as a plain `[x, y, width, height]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// Creates a region, rejecting empty or negative sizes.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(anyhow!(
                "Region must have a positive size, got {}x{}",
                width,
                height
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

}

impl TryFrom<[i32; 4]> for Region {
    type Error = anyhow::Error;

    fn try_from(value: [i32; 4]) -> Result<Self> {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl From<Region> for [i32; 4] {
    fn from(region: Region) -> Self {
        [region.x, region.y, region.width, region.height]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_size() {
        assert!(Region::new(0, 0, 0, 10).is_err());
        assert!(Region::new(0, 0, 10, -1).is_err());
        assert!(Region::new(5, 5, 1, 1).is_ok());
    }

    #[test]
    fn test_display() {
        let region = Region::new(10, 20, 300, 400).unwrap();
        assert_eq!(region.to_string(), "(10, 20, 300, 400)");
    }

    #[test]
    fn test_serde_array_format() {
        let region = Region::new(10, 20, 300, 400).unwrap();
        assert_eq!(serde_json::to_string(&region).unwrap(), "[10,20,300,400]");

        let parsed: Region = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(parsed, Region::new(1, 2, 3, 4).unwrap());

        assert!(serde_json::from_str::<Region>("[1, 2, 0, 4]").is_err());
    }
}
