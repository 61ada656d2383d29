//! Community-scale demand-flexibility and carbon-shifting simulator.

pub mod carbon;
pub mod config;
pub mod io;
pub mod population;
pub mod profile;
/// Curtailment engine, reward computation, and report types.
pub mod sim;
