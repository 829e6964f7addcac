//! Shared constants used across the runner.

// Deep links
pub const DEEP_LINK_SCHEME: &str = "otzaria://";
pub const URL_FLAG_PREFIX: &str = "--url=";

// Main window
pub const WINDOW_TITLE: &str = "אוצריא";
pub const WINDOW_ORIGIN_X: i32 = 10;
pub const WINDOW_ORIGIN_Y: i32 = 10;
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;
pub const WINDOW_CLASS_NAME: &str = "OTZARIA_RUNNER_WIN32_WINDOW";

// Data bundle layout, relative to the executable directory
pub const DATA_BUNDLE_DIR: &str = "data";
pub const ASSETS_DIR: &str = "flutter_assets";
pub const ICU_DATA_FILE: &str = "icudtl.dat";
pub const AOT_LIBRARY_FILE: &str = "app.so";

// DPI
pub const BASE_DPI: u32 = 96;

// Process exit status
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

// Console close: Windows terminates the process about 5 s after the handler is
// called, so waiting for teardown has to end before that
pub const TEARDOWN_WAIT_MS: u64 = 4_500;
