//! The periodic monitor tick.

use super::state::GotoState;
use super::Mount;
use crate::axis::Axis;
use crate::coords::Transform;
use crate::tls::TimeLocationSource;

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Advance every state machine by one tick.
    ///
    /// `now_ms` is a monotonic millisecond clock; the first call only sets
    /// the reference. Never blocks. Order within a tick: clock and site,
    /// position, pulse expiry, PEC, goto staging, scheduled flip, then (with
    /// no goto active) tracking rates, tracking limits and axis rates.
    pub fn monitor(&mut self, now_ms: u64) {
        let dt_ms = match self.last_ms {
            Some(last) => now_ms.saturating_sub(last),
            None => 0,
        };
        let dt = dt_ms as f64 / 1000.0;
        self.last_ms = Some(now_ms);
        self.now_ms = now_ms;

        self.clock.advance_ms(dt_ms);
        self.refresh_clock();
        self.update_position();

        self.poll_pulse_guide();
        self.poll_pec(dt);
        self.poll_goto();
        self.start_scheduled_flip();

        if self.goto_state == GotoState::None {
            self.update_tracking_rates();
            self.check_tracking_limits();
            self.apply_rates();
        }
    }
}
