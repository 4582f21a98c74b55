//! Match session: the consumer-thread owner of every per-match component.

mod auto_caster;
mod match_session;
mod report;


pub use auto_caster::AutoCaster;
pub use match_session::MatchSession;
pub use report::{CasterReport, CasterStats, MatchReport};
