//! Process startup, from console attachment to the end of the message loop.
use std::fmt;

use crate::constants::EXIT_SUCCESS;
use crate::deep_link::{normalize_arguments, RawArguments};
use crate::error::BootstrapResult;
use crate::runtime::{RuntimeAdapter, RuntimeProject};
use crate::settings::{LaunchSettings, WindowSpec};

/// Bootstrap progress. States only move forward; a window creation failure
/// jumps from `RuntimeInitialized` straight to `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootstrapState {
  Starting,
  ConsoleReady,
  RuntimeInitialized,
  WindowCreated,
  Running,
  Terminated,
}

impl fmt::Display for BootstrapState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BootstrapState::Starting => "Starting",
      BootstrapState::ConsoleReady => "ConsoleReady",
      BootstrapState::RuntimeInitialized => "RuntimeInitialized",
      BootstrapState::WindowCreated => "WindowCreated",
      BootstrapState::Running => "Running",
      BootstrapState::Terminated => "Terminated",
    };
    f.write_str(name)
  }
}

/// Where diagnostic output ended up after the console step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
  /// Attached to the console of the launching process.
  Inherited,
  /// A new console was allocated because a debugger is attached.
  Allocated,
  /// No console; diagnostics only reach the debugger output stream.
  Detached,
}

/// Process-level services the bootstrapper asks the OS for.
pub trait ProcessEnvironment {
  /// Attach to the console of the parent process, if it has one.
  fn attach_parent_console(&mut self) -> BootstrapResult<()>;

  fn is_debugger_present(&self) -> bool;

  /// Allocate a fresh console and route the standard streams to it.
  fn create_and_attach_console(&mut self) -> BootstrapResult<()>;

  fn raw_arguments(&self) -> RawArguments {
    RawArguments::from_env()
  }
}

/// Process-wide component infrastructure (COM on Windows).
pub trait Apartment {
  fn initialize(&self) -> BootstrapResult<()>;
  fn uninitialize(&self);
}

/// Keeps the apartment initialized for its own lifetime and releases it on drop,
/// whichever path leaves the scope. A failed initialization is not balanced by
/// a release.
pub struct ApartmentGuard<'a, A: Apartment + ?Sized> {
  apartment: &'a A,
  initialized: bool,
}

impl<'a, A: Apartment + ?Sized> ApartmentGuard<'a, A> {
  pub fn enter(apartment: &'a A) -> Self {
    let initialized = match apartment.initialize() {
      Ok(()) => true,
      Err(e) => {
        log::warn!("[bootstrap] {}", e);
        false
      }
    };
    Self {
      apartment,
      initialized,
    }
  }
}

impl<A: Apartment + ?Sized> Drop for ApartmentGuard<'_, A> {
  fn drop(&mut self) {
    if self.initialized {
      self.apartment.uninitialize();
    }
  }
}

/// Native top-level window plus the thread's message queue.
pub trait WindowShim {
  type Message;

  /// Create the window described by `spec` and host the runtime's surface in it.
  fn create_window(
    &mut self,
    spec: &WindowSpec,
    runtime: &mut dyn RuntimeAdapter,
  ) -> BootstrapResult<()>;

  /// Post a quit message when the window is closed.
  fn set_quit_on_close(&mut self, quit_on_close: bool);

  /// Block until the next message arrives. `Ok(None)` is the quit message.
  fn next_message(&mut self) -> BootstrapResult<Option<Self::Message>>;

  fn translate_and_dispatch(&mut self, message: &Self::Message);
}

/// Final state of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
  pub exit_code: i32,
  /// Every state the run passed through, in order.
  pub states: Vec<BootstrapState>,
}

struct StateMachine {
  states: Vec<BootstrapState>,
}

impl StateMachine {
  fn new() -> Self {
    Self {
      states: vec![BootstrapState::Starting],
    }
  }

  fn current(&self) -> BootstrapState {
    self.states.last().copied().unwrap_or(BootstrapState::Starting)
  }

  fn advance(&mut self, next: BootstrapState) {
    debug_assert!(next > self.current(), "bootstrap states only move forward");
    log::debug!("[bootstrap] {} -> {}", self.current(), next);
    self.states.push(next);
  }
}

pub struct Bootstrapper<E, A, W, R> {
  env: E,
  apartment: A,
  shim: W,
  runtime: R,
  settings: LaunchSettings,
}

impl<E, A, W, R> Bootstrapper<E, A, W, R>
where
  E: ProcessEnvironment,
  A: Apartment,
  W: WindowShim,
  R: RuntimeAdapter,
{
  pub fn new(env: E, apartment: A, shim: W, runtime: R, settings: LaunchSettings) -> Self {
    Self {
      env,
      apartment,
      shim,
      runtime,
      settings,
    }
  }

  /// Run the process from startup until the message loop ends.
  pub fn run(self) -> Termination {
    let Self {
      mut env,
      apartment,
      mut shim,
      mut runtime,
      settings,
    } = self;
    let mut machine = StateMachine::new();

    let console = prepare_console(&mut env);
    log::debug!("[bootstrap] Console: {:?}", console);
    machine.advance(BootstrapState::ConsoleReady);

    let exit_code = {
      let _apartment = ApartmentGuard::enter(&apartment);
      machine.advance(BootstrapState::RuntimeInitialized);

      let result = launch(&env, &mut shim, &mut runtime, &settings, &mut machine);
      // Window first, then the runtime it hosted, then the apartment
      drop(shim);
      runtime.shutdown();

      match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
          log::error!("[bootstrap] {}", e);
          e.exit_code()
        }
      }
    };

    machine.advance(BootstrapState::Terminated);
    log::info!("[bootstrap] Exiting with status {}", exit_code);
    Termination {
      exit_code,
      states: machine.states,
    }
  }
}

/// Attach to the parent's console, or open one when running under a debugger.
/// Never fails; a process without a console is a normal GUI launch.
pub fn prepare_console<E: ProcessEnvironment + ?Sized>(env: &mut E) -> ConsoleMode {
  if env.attach_parent_console().is_ok() {
    return ConsoleMode::Inherited;
  }
  if !env.is_debugger_present() {
    return ConsoleMode::Detached;
  }
  match env.create_and_attach_console() {
    Ok(()) => ConsoleMode::Allocated,
    Err(e) => {
      log::warn!("[bootstrap] {}", e);
      ConsoleMode::Detached
    }
  }
}

fn launch<E, W, R>(
  env: &E,
  shim: &mut W,
  runtime: &mut R,
  settings: &LaunchSettings,
  machine: &mut StateMachine,
) -> BootstrapResult<()>
where
  E: ProcessEnvironment,
  W: WindowShim,
  R: RuntimeAdapter,
{
  let arguments = normalize_arguments(env.raw_arguments());
  runtime.configure(RuntimeProject::new(&settings.data_dir, arguments));

  shim.create_window(&settings.window, runtime)?;
  machine.advance(BootstrapState::WindowCreated);

  shim.set_quit_on_close(settings.quit_on_close);
  machine.advance(BootstrapState::Running);

  run_message_loop(shim)
}

/// Pump messages until the quit message is retrieved.
pub fn run_message_loop<W: WindowShim + ?Sized>(shim: &mut W) -> BootstrapResult<()> {
  let mut dispatched: u64 = 0;
  while let Some(message) = shim.next_message()? {
    shim.translate_and_dispatch(&message);
    dispatched += 1;
  }
  log::debug!("[bootstrap] Quit received after {} message(s)", dispatched);
  Ok(())
}
