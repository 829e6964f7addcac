use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_DPI, DATA_BUNDLE_DIR, WINDOW_HEIGHT, WINDOW_ORIGIN_X, WINDOW_ORIGIN_Y, WINDOW_TITLE, WINDOW_WIDTH,
};

/// Top-left corner of a window, in logical (96 DPI) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Window extent, in logical (96 DPI) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Scale factor for a monitor DPI, relative to the 96 DPI logical baseline.
pub fn scale_factor(dpi: u32) -> f64 {
    if dpi == 0 {
        return 1.0;
    }
    dpi as f64 / BASE_DPI as f64
}

/// Geometry and title of the single top-level window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub title: String,
    pub origin: Point,
    pub size: Size,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            origin: Point::new(WINDOW_ORIGIN_X, WINDOW_ORIGIN_Y),
            size: Size::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        }
    }
}

impl WindowSpec {
    /// Origin and size converted to physical pixels for the given scale factor.
    pub fn scaled(&self, scale_factor: f64) -> (Point, Size) {
        let scale = |v: f64| (v * scale_factor).round();
        (
            Point::new(
                scale(self.origin.x as f64) as i32,
                scale(self.origin.y as f64) as i32,
            ),
            Size::new(
                scale(self.size.width as f64) as u32,
                scale(self.size.height as f64) as u32,
            ),
        )
    }
}

/// Everything the bootstrapper needs that does not come from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSettings {
    pub window: WindowSpec,
    /// Data bundle directory, relative to the executable.
    pub data_dir: String,
    pub quit_on_close: bool,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            window: WindowSpec::default(),
            data_dir: DATA_BUNDLE_DIR.to_string(),
            quit_on_close: true,
        }
    }
}
