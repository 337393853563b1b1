//! PropStatsEngine: the prop performance pipeline.
//!
//! Pure, synchronous functions over immutable game records: evaluation
//! against a line, rolling averages, hit rate and margin aggregates, the
//! opponent breakdown and the flat-stake unit simulation. Nothing here
//! performs I/O or holds state, so every function is safe to call from
//! any number of threads at once.

pub mod aggregate;
pub mod evaluate;
pub mod report;
pub mod rolling;
pub mod units;

pub use aggregate::{average_margin, group_by_opponent, hit_rate, opponent_profile};
pub use evaluate::{evaluate, evaluate_at_line, filter_by_matchup};
pub use report::PropReport;
pub use rolling::{predictive_line, rolling_average, RollingWindow};
pub use units::cumulative_units;
