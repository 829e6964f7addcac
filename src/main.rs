// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
  // A console is attached on demand, see bootstrap::prepare_console
  std::process::exit(otzaria_runner_lib::run())
}
