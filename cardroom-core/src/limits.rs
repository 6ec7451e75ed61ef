//! Default timeouts (spec §5), all overridable via configuration at the
//! transport layer.

use std::time::Duration;

pub const ROOM_EMPTY_TTL: Duration = Duration::from_secs(300);
pub const RECONNECT_TIMEOUT: Duration = Duration::from_secs(120);
pub const TURN_TIMER_GRACE: Duration = Duration::from_secs(2);

/// The server's default per-turn think time, handed to `startTurn` before
/// the grace period is added. Games without a stricter setting use this.
pub const DEFAULT_TURN_SECONDS: u64 = 30;
