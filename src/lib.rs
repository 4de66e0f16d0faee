// Library root
// -----------
// A small blocking client for a SciCat-style metadata catalog. The binary
// (`main.rs`) wires these modules into a command line and an interactive menu.
//
// Module responsibilities:
// - `api`: the authorized client; logs in once and carries the bearer token.
// - `proposal`: proposal records, loading them locally and registering them.
// - `acquisition`: fetching proposals and submitting one dataset per sample.
// - `transport`: the single-request HTTP seam and its reqwest implementation.
// - `credentials`, `config`, `error`, `logging`: ambient plumbing.
// - `cli`, `ui`: the command line and the interactive menu.
pub mod acquisition;
pub mod api;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod proposal;
pub mod transport;
pub mod ui;
