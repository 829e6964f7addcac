use fern::Dispatch;
use log::LevelFilter;

/// One `RUST_LOG` section: either a global level or a `module=level` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirective {
  pub module: Option<String>,
  pub level: LevelFilter,
}

fn parse_level(module: Option<&str>, level: &str) -> Option<LevelFilter> {
  use LevelFilter::*;
  match level {
    "off" => Some(Off),
    "error" => Some(Error),
    "warn" => Some(Warn),
    "info" => Some(Info),
    "debug" => Some(Debug),
    "trace" => Some(Trace),
    val => {
      eprint!("RUST_LOG: ");
      if let Some(module) = module {
        eprint!("module '{module}' ");
      }
      eprintln!("ignored unknown log level: '{val}'");
      None
    }
  }
}

/// Parse a `RUST_LOG` value.
///
/// `RUST_LOG=debug` sets the threshold for everything,
/// `RUST_LOG=info,otzaria_runner_lib::os_utils=trace` raises a single module.
/// Dash characters in crate names become underscores in module paths.
pub fn parse_log_directives(value: &str) -> Vec<LogDirective> {
  value
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .filter_map(|section| match section.split_once('=') {
      Some((module, level)) => parse_level(Some(module), level).map(|level| LogDirective {
        module: Some(module.to_string()),
        level,
      }),
      None => parse_level(None, section).map(|level| LogDirective {
        module: None,
        level,
      }),
    })
    .collect()
}

fn apply(dispatch: Dispatch, directive: LogDirective) -> Dispatch {
  match directive.module {
    Some(module) => dispatch.level_for(module, directive.level),
    None => dispatch.level(directive.level),
  }
}

fn override_log_levels(mut dispatch: Dispatch) -> Dispatch {
  match std::env::var("RUST_LOG") {
    // Not an error if the env var does not exist.
    Err(std::env::VarError::NotPresent) => dispatch,
    Err(std::env::VarError::NotUnicode(val)) => {
      let val = val.to_string_lossy();
      eprintln!("RUST_LOG: ignored invalid unicode value: '{val}'");
      dispatch
    }
    Ok(val) => {
      for directive in parse_log_directives(&val) {
        dispatch = apply(dispatch, directive);
      }
      dispatch
    }
  }
}

pub fn default_level() -> LevelFilter {
  if cfg!(debug_assertions) {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  }
}

/// Install the global logger. Output goes to stderr, which only shows up once a
/// console is attached, and on Windows to the debugger output stream as well.
pub fn init_logging() {
  let mut log_dispatch = Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{}[{}][{}] {}",
        chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(default_level())
    .chain(std::io::stderr());

  #[cfg(windows)]
  {
    log_dispatch = log_dispatch.chain(fern::Output::call(|record| {
      crate::os_utils::windows::console::output_debug_string(&format!("{}\n", record.args()));
    }));
  }

  log_dispatch = override_log_levels(log_dispatch);
  match log_dispatch.apply() {
    Ok(()) => (),
    Err(e) => eprintln!("Initialising logging failed {e:?}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_global_level() {
    assert_eq!(
      parse_log_directives("warn"),
      vec![LogDirective { module: None, level: LevelFilter::Warn }]
    );
  }

  #[test]
  fn test_module_levels() {
    let directives = parse_log_directives("error, otzaria_runner_lib::deep_link=trace");
    assert_eq!(directives.len(), 2);
    assert_eq!(directives[0].level, LevelFilter::Error);
    assert_eq!(
      directives[1],
      LogDirective {
        module: Some("otzaria_runner_lib::deep_link".to_string()),
        level: LevelFilter::Trace,
      }
    );
  }

  #[test]
  fn test_unknown_levels_are_skipped() {
    let directives = parse_log_directives("loud,,app=quiet,info");
    assert_eq!(directives, vec![LogDirective { module: None, level: LevelFilter::Info }]);
  }

  #[test]
  fn test_empty_value() {
    assert!(parse_log_directives("").is_empty());
  }
}
