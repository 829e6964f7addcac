// Platform integrations. The runner only targets Windows; the portable core
// (argument normalization, bootstrap sequencing) lives outside this module.
#[cfg(windows)]
pub mod windows;
