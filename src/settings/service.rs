use once_cell::sync::Lazy;

use super::types::LaunchSettings;

// Built once, never changes for the lifetime of the process
static LAUNCH_SETTINGS: Lazy<LaunchSettings> = Lazy::new(LaunchSettings::default);

/// Get the launch settings for this process
pub fn launch_settings() -> &'static LaunchSettings {
    &LAUNCH_SETTINGS
}

/// Log the effective launch settings as JSON
pub fn log_launch_settings(settings: &LaunchSettings) {
    match serde_json::to_string(settings) {
        Ok(json) => log::debug!("[settings] Launch settings: {}", json),
        Err(e) => log::warn!("[settings] Failed to serialize launch settings: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::types::{scale_factor, Point, Size, WindowSpec};

    #[test]
    fn test_default_window_spec() {
        let spec = &launch_settings().window;
        assert_eq!(spec.title, "אוצריא");
        assert_eq!(spec.origin, Point::new(10, 10));
        assert_eq!(spec.size, Size::new(1280, 720));
    }

    #[test]
    fn test_default_launch_settings() {
        let settings = launch_settings();
        assert_eq!(settings.data_dir, "data");
        assert!(settings.quit_on_close);
    }

    #[test]
    fn test_settings_are_shared() {
        assert!(std::ptr::eq(launch_settings(), launch_settings()));
    }

    #[test]
    fn test_scaled_window_spec() {
        let spec = WindowSpec::default();
        assert_eq!(spec.scaled(1.0), (spec.origin, spec.size));

        let (origin, size) = spec.scaled(1.5);
        assert_eq!(origin, Point::new(15, 15));
        assert_eq!(size, Size::new(1920, 1080));
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(96), 1.0);
        assert_eq!(scale_factor(144), 1.5);
        assert_eq!(scale_factor(192), 2.0);
        assert_eq!(scale_factor(0), 1.0);
    }

    #[test]
    fn test_settings_serialize() {
        let json = serde_json::to_value(launch_settings()).unwrap();
        assert_eq!(json["window"]["size"]["width"], 1280);
        assert_eq!(json["data_dir"], "data");

        let back: LaunchSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back.window, WindowSpec::default());
    }
}
