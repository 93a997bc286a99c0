//! The clocked-graph-to-stepper contract.
//!
//! Hardware's "everything updates on the clock edge" becomes, here, a
//! scheduler that calls [`Step::step`] on every component once per tick. All
//! writes a component makes within one `step` call are only observed by
//! *its own* next call — there is no re-entrant feedback within a tick, which
//! is exactly the double-buffering a synchronous process gives you for free.
//!
//! Cross-rate handoffs (the interpolator's input/output, the FFT's
//! load/retrieve ports) are represented with [`Stream`], a small valid/ready
//! endpoint the producer fills and the consumer drains.

/// A component that advances by exactly one clock tick per call.
///
/// `Input` and `Output` are typically small `Copy` structs bundling the
/// signals a hardware description would wire between sibling modules.
pub trait Step {
    /// Inputs sampled on this tick.
    type Input;
    /// Outputs produced by this tick (latency, if any, is the component's
    /// own concern — see its type-level documentation).
    type Output;

    /// Advance the component by one clock tick.
    fn step(&mut self, input: Self::Input) -> Self::Output;

    /// Reset internal state without reallocating (filter flush, FFT restart,
    /// phase-accumulator clear). Matches the source's notion of a one-cycle
    /// synchronous reset.
    fn reset(&mut self);
}

/// A valid/ready ("strobe/acknowledge") stream endpoint.
///
/// `stb` is asserted by the producer when `data` is valid; `ack` is asserted
/// by the consumer when it accepted `data` on this tick. A transfer happens
/// on a tick exactly when both are set — the same contract as `stb`/`ack` in
/// the Migen/MiSoC `Endpoint` abstraction this is modeled on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stream<T> {
    /// Payload. Only meaningful when `stb` is set.
    pub data: T,
    /// Producer asserts: `data` is valid this tick.
    pub stb: bool,
    /// Consumer asserts: `data` was accepted this tick.
    pub ack: bool,
}

impl<T: Default> Stream<T> {
    /// An idle stream: no data, not strobed, not acknowledged.
    pub fn idle() -> Self {
        Self {
            data: T::default(),
            stb: false,
            ack: false,
        }
    }
}

impl<T> Stream<T> {
    /// A stream carrying `data`, strobed, with `ack` left for the consumer
    /// to fill in.
    pub fn valid(data: T) -> Self {
        Self {
            data,
            stb: true,
            ack: false,
        }
    }

    /// Did a transfer occur on this tick (`stb && ack`)?
    #[inline]
    pub fn fired(&self) -> bool {
        self.stb && self.ack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_fires_only_on_stb_and_ack() {
        let mut s = Stream::valid(42);
        assert!(!s.fired());
        s.ack = true;
        assert!(s.fired());
    }

    #[test]
    fn idle_stream_never_fires() {
        let s: Stream<i32> = Stream::idle();
        assert!(!s.fired());
        assert_eq!(s.data, 0);
    }
}
