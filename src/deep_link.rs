use crate::constants::{DEEP_LINK_SCHEME, URL_FLAG_PREFIX};

/// Command line tokens exactly as the OS delivered them, program name excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArguments(Vec<String>);

impl RawArguments {
  /// Capture the arguments of the current process.
  ///
  /// Tokens that are not valid Unicode are converted lossily, the runtime only
  /// understands UTF-8.
  pub fn from_env() -> Self {
    Self(
      std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect(),
    )
  }

  pub fn as_slice(&self) -> &[String] {
    &self.0
  }
}

impl<S: Into<String>> FromIterator<S> for RawArguments {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self(iter.into_iter().map(Into::into).collect())
  }
}

/// Arguments handed to the embedded runtime as its entrypoint arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedArguments {
  args: Vec<String>,
  // Index of the `--url=` token carrying the link that was acted on
  delivered: Option<usize>,
}

impl NormalizedArguments {
  pub fn as_slice(&self) -> &[String] {
    &self.args
  }

  /// Payload of the `--url=` flag the runtime should act on. With a raw token
  /// ahead of an existing flag this is the appended flag, not the earlier one.
  pub fn deep_link(&self) -> Option<&str> {
    self
      .delivered
      .and_then(|index| self.args.get(index))
      .and_then(|arg| arg.strip_prefix(URL_FLAG_PREFIX))
  }
}

impl From<NormalizedArguments> for RawArguments {
  fn from(args: NormalizedArguments) -> Self {
    Self(args.args)
  }
}

/// How a single token takes part in deep-link delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeepLinkToken<'a> {
  /// `--url=<payload>`, already in the form the runtime expects.
  Flag(&'a str),
  /// Any token carrying the `otzaria://` scheme somewhere inside it.
  Raw(&'a str),
}

/// Classify a token. The flag prefix is checked before the scheme, so
/// `--url=otzaria://...` is a `Flag`.
pub fn classify(token: &str) -> Option<DeepLinkToken<'_>> {
  if let Some(payload) = token.strip_prefix(URL_FLAG_PREFIX) {
    Some(DeepLinkToken::Flag(payload))
  } else if token.contains(DEEP_LINK_SCHEME) {
    Some(DeepLinkToken::Raw(token))
  } else {
    None
  }
}

/// Rewrite a raw `otzaria://` invocation into the `--url=` flag.
///
/// Only the first deep-link token is considered. If it is already a flag the
/// arguments pass through untouched; if it is a raw scheme token, the whole token
/// is appended again behind the flag prefix, unless that exact flag is already
/// present. Original tokens are never removed or reordered.
pub fn normalize_arguments(raw: RawArguments) -> NormalizedArguments {
  let mut args = raw.0;

  // Must stay at info or above to reach the debugger output in release builds
  for (index, arg) in args.iter().enumerate() {
    log::info!("[deep_link] Arg {}: {}", index, arg);
  }

  let first = args
    .iter()
    .enumerate()
    .find_map(|(index, arg)| classify(arg).map(|token| (index, token)));

  let delivered = match first {
    Some((index, DeepLinkToken::Flag(payload))) => {
      log::debug!("[deep_link] URL already provided at arg {}: {}", index, payload);
      Some(index)
    }
    Some((index, DeepLinkToken::Raw(token))) => {
      let flag = format!("{}{}", URL_FLAG_PREFIX, token);
      match args.iter().position(|arg| *arg == flag) {
        Some(existing) => {
          log::debug!("[deep_link] URL in arg {} already flagged at arg {}", index, existing);
          Some(existing)
        }
        None => {
          log::info!("[deep_link] Found URL in arg {}: {}", index, token);
          args.push(flag);
          Some(args.len() - 1)
        }
      }
    }
    None => None,
  };

  NormalizedArguments { args, delivered }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  fn normalize(tokens: &[&str]) -> Vec<String> {
    normalize_arguments(tokens.iter().copied().collect())
      .as_slice()
      .to_vec()
  }

  fn count_flags(args: &[String]) -> usize {
    args.iter().filter(|a| a.starts_with(URL_FLAG_PREFIX)).count()
  }

  #[test]
  fn test_empty_arguments() {
    assert!(normalize(&[]).is_empty());
  }

  #[test]
  fn test_plain_arguments_unchanged() {
    let input = ["--verbose", "book.txt", "otzaria:/not-a-link", "url=otzaria"];
    assert_eq!(normalize(&input), input);
  }

  #[test]
  fn test_raw_scheme_appends_flag() {
    assert_eq!(
      normalize(&["otzaria://book/123"]),
      ["otzaria://book/123", "--url=otzaria://book/123"]
    );
  }

  #[test]
  fn test_whole_token_is_forwarded() {
    assert_eq!(
      normalize(&["open=otzaria://book/5?page=2"]),
      ["open=otzaria://book/5?page=2", "--url=open=otzaria://book/5?page=2"]
    );
  }

  #[test]
  fn test_existing_flag_unchanged() {
    assert_eq!(
      normalize(&["--url=otzaria://book/123"]),
      ["--url=otzaria://book/123"]
    );
  }

  #[test]
  fn test_only_first_match_is_normalized() {
    assert_eq!(
      normalize(&["foo", "otzaria://x", "otzaria://y"]),
      ["foo", "otzaria://x", "otzaria://y", "--url=otzaria://x"]
    );
  }

  #[test]
  fn test_earlier_flag_wins_over_later_raw() {
    let input = ["--url=otzaria://a", "otzaria://b"];
    assert_eq!(normalize(&input), input);
  }

  #[test]
  fn test_earlier_raw_wins_over_later_flag() {
    assert_eq!(
      normalize(&["otzaria://a", "--url=otzaria://b"]),
      ["otzaria://a", "--url=otzaria://b", "--url=otzaria://a"]
    );
  }

  #[test]
  fn test_flag_without_scheme_still_counts() {
    let input = ["--url=https://example.com", "otzaria://x"];
    assert_eq!(normalize(&input), input);
  }

  #[test]
  fn test_non_ascii_payload() {
    assert_eq!(
      normalize(&["otzaria://ספר/בראשית"]),
      ["otzaria://ספר/בראשית", "--url=otzaria://ספר/בראשית"]
    );
  }

  #[test]
  fn test_normalizing_twice_adds_no_second_flag() {
    let inputs: [&[&str]; 4] = [
      &["otzaria://book/1"],
      &["a", "b", "otzaria://x", "c"],
      &["--url=otzaria://x"],
      &["plain"],
    ];
    for input in inputs {
      let once = normalize_arguments(input.iter().copied().collect());
      let twice = normalize_arguments(once.clone().into());
      assert_eq!(once, twice);
      assert!(count_flags(twice.as_slice()) <= 1);
    }
  }

  #[test]
  fn test_raw_token_already_flagged_is_not_appended_again() {
    let input = ["otzaria://x", "--url=otzaria://x"];
    assert_eq!(normalize(&input), input);
  }

  #[test]
  fn test_deep_link_payload() {
    let args = normalize_arguments(RawArguments::from_iter(["x", "otzaria://book/9"]));
    assert_eq!(args.deep_link(), Some("otzaria://book/9"));

    let args = normalize_arguments(RawArguments::from_iter(["x"]));
    assert_eq!(args.deep_link(), None);
  }

  #[test]
  fn test_deep_link_is_the_link_acted_on() {
    let args = normalize_arguments(RawArguments::from_iter(["otzaria://a", "--url=otzaria://b"]));
    assert_eq!(args.deep_link(), Some("otzaria://a"));

    let args = normalize_arguments(RawArguments::from_iter(["--url=otzaria://a", "otzaria://b"]));
    assert_eq!(args.deep_link(), Some("otzaria://a"));
  }

  struct CaptureLogger;

  static CAPTURED: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());
  static CAPTURE: CaptureLogger = CaptureLogger;

  impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
      true
    }

    fn log(&self, record: &log::Record) {
      if let Ok(mut captured) = CAPTURED.lock() {
        captured.push((record.level(), record.args().to_string()));
      }
    }

    fn flush(&self) {}
  }

  #[test]
  fn test_argument_trace_survives_release_log_level() {
    if log::set_logger(&CAPTURE).is_ok() {
      log::set_max_level(log::LevelFilter::Trace);
    }
    normalize(&["trace-me-7f3a", "otzaria://trace/7f3a"]);

    let captured = CAPTURED.lock().unwrap();
    let trace: Vec<_> = captured
      .iter()
      .filter(|(_, message)| message.starts_with("[deep_link] Arg") && message.contains("7f3a"))
      .collect();
    assert_eq!(trace.len(), 2);
    assert!(trace.iter().all(|(level, _)| *level <= log::Level::Info));
  }

  #[test]
  fn test_classify() {
    assert_eq!(classify("--url=abc"), Some(DeepLinkToken::Flag("abc")));
    assert_eq!(
      classify("--url=otzaria://a"),
      Some(DeepLinkToken::Flag("otzaria://a"))
    );
    assert_eq!(classify("xotzaria://a"), Some(DeepLinkToken::Raw("xotzaria://a")));
    assert_eq!(classify(" --url=abc"), None);
    assert_eq!(classify("OTZARIA://a"), None);
  }
}
