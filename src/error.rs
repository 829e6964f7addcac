use crate::constants::EXIT_FAILURE;

/// Failures the bootstrapper can observe. `ConsoleAttach` and `ComInit` are
/// logged where they happen and startup continues; the others end the run.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
  /// Neither the parent console nor a freshly allocated one is usable.
  #[error("Console attach failed: {0}")]
  ConsoleAttach(String),

  /// COM could not be initialized for the UI thread.
  #[error("COM initialization failed: {0}")]
  ComInit(String),

  /// The top-level window or its content could not be created.
  #[error("Window creation failed: {0}")]
  WindowCreation(String),

  /// Retrieving the next OS message failed.
  #[error("Message loop failed: {0}")]
  MessageLoop(String),
}

/// Result type alias for bootstrap operations.
pub type BootstrapResult<T> = Result<T, BootstrapError>;

impl BootstrapError {
  /// Process exit status reported for this error.
  pub fn exit_code(&self) -> i32 {
    EXIT_FAILURE
  }
}

#[cfg(windows)]
impl BootstrapError {
  pub(crate) fn window(context: &str, err: windows::core::Error) -> Self {
    BootstrapError::WindowCreation(format!("{}: {}", context, err))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display() {
    let err = BootstrapError::WindowCreation("RegisterClassW returned 0".into());
    assert_eq!(
      err.to_string(),
      "Window creation failed: RegisterClassW returned 0"
    );
    assert_ne!(err.exit_code(), 0);
  }
}
