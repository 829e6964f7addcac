//! Boundary to the embedded UI runtime hosted inside the main window.
use std::path::{Path, PathBuf};

use crate::constants::{AOT_LIBRARY_FILE, ASSETS_DIR, ICU_DATA_FILE};
use crate::deep_link::NormalizedArguments;
use crate::error::BootstrapResult;

/// Native handle of a runtime-owned child window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle(pub isize);

/// Startup configuration handed to the runtime: its entrypoint arguments and
/// where its data bundle lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeProject {
  data_dir: PathBuf,
  entrypoint_arguments: NormalizedArguments,
}

impl RuntimeProject {
  pub fn new(data_dir: impl Into<PathBuf>, entrypoint_arguments: NormalizedArguments) -> Self {
    Self {
      data_dir: data_dir.into(),
      entrypoint_arguments,
    }
  }

  pub fn data_dir(&self) -> &Path {
    &self.data_dir
  }

  pub fn entrypoint_arguments(&self) -> &NormalizedArguments {
    &self.entrypoint_arguments
  }

  /// Data bundle directory. Relative locators are resolved against the
  /// directory of the running executable, not the working directory.
  pub fn bundle_root(&self) -> PathBuf {
    if self.data_dir.is_absolute() {
      return self.data_dir.clone();
    }
    match executable_dir() {
      Some(dir) => dir.join(&self.data_dir),
      None => self.data_dir.clone(),
    }
  }

  pub fn assets_path(&self) -> PathBuf {
    self.bundle_root().join(ASSETS_DIR)
  }

  pub fn icu_data_path(&self) -> PathBuf {
    self.bundle_root().join(ICU_DATA_FILE)
  }

  pub fn aot_library_path(&self) -> PathBuf {
    self.bundle_root().join(AOT_LIBRARY_FILE)
  }
}

fn executable_dir() -> Option<PathBuf> {
  std::env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// The embedded runtime as seen from the bootstrapper.
pub trait RuntimeAdapter {
  /// Receive the startup configuration. Called once, before any window exists.
  fn configure(&mut self, project: RuntimeProject);

  /// Create the content view for a client area of the given physical size.
  /// `None` means the runtime renders nothing into the host window.
  fn create_surface(&mut self, width: i32, height: i32) -> BootstrapResult<Option<SurfaceHandle>>;

  /// Called once the host window is gone.
  fn shutdown(&mut self) {}
}

/// Adapter that takes the project handoff and hosts no content of its own.
#[derive(Debug, Default)]
pub struct DataBundleRuntime {
  project: Option<RuntimeProject>,
}

impl DataBundleRuntime {
  pub fn new() -> Self {
    Self::default()
  }

  /// The link delivered with the current project, if any.
  pub fn deep_link(&self) -> Option<&str> {
    self
      .project
      .as_ref()
      .and_then(|project| project.entrypoint_arguments().deep_link())
  }
}

impl RuntimeAdapter for DataBundleRuntime {
  fn configure(&mut self, project: RuntimeProject) {
    log::info!(
      "[runtime] Data bundle '{}' at {}, {} entrypoint argument(s)",
      project.data_dir().display(),
      project.bundle_root().display(),
      project.entrypoint_arguments().as_slice().len()
    );
    log::debug!("[runtime] Assets: {}", project.assets_path().display());
    log::debug!("[runtime] ICU data: {}", project.icu_data_path().display());
    log::debug!("[runtime] AOT library: {}", project.aot_library_path().display());
    self.project = Some(project);
    if let Some(url) = self.deep_link() {
      log::info!("[runtime] Deep link delivered: {}", url);
    }
  }

  fn create_surface(&mut self, width: i32, height: i32) -> BootstrapResult<Option<SurfaceHandle>> {
    log::debug!("[runtime] No surface for {}x{} client area", width, height);
    Ok(None)
  }

  fn shutdown(&mut self) {
    log::debug!("[runtime] Shutdown");
    self.project = None;
  }
}
