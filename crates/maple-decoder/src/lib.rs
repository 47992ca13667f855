//! Bit-recovery decoder ("debittify"): turns a packed sample-pair capture
//! from the proxy into a Maple byte stream.
//!
//! The proxy samples the bus's two open-drain wires at 2 MSPS and packs four
//! consecutive `(pin5, pin1)` sample pairs into one byte (see
//! [`unpack_samples`]). [`decode_samples`] runs the actual edge-triggered
//! state machine over the unpacked pairs; [`debittify`] is the composition
//! of both and is the entry point most callers want.

/// Number of consecutive both-high sample pairs that mark a capture complete.
pub const IDLE_SAMPLES_INDICATING_COMPLETION: u32 = 8;

/// Result of decoding one capture: the recovered bytes, how many input
/// samples were "useful" (consumed toward a completed byte), and whether a
/// sustained idle run was observed at the end of the capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRx {
    /// Bytes recovered from the bus.
    pub bytes: Vec<u8>,
    /// Total samples fed minus samples accumulated since the last byte
    /// boundary; used by the retry controller to advance its skip cursor.
    pub useful_sample_count: usize,
    /// Whether the capture's trailing run of samples ended with
    /// `IDLE_SAMPLES_INDICATING_COMPLETION` consecutive both-high pairs. A
    /// both-high burst followed by more non-idle samples does not count;
    /// only the run still active when the capture ends does.
    pub idle_observed: bool,
}

/// The `(high_bit, low_bit)` positions of each sample pair within a packed
/// byte, in the fixed interleaved order the proxy emits them: sample 3,
/// sample 1, sample 2, sample 4.
const SAMPLE_BIT_POSITIONS: [(u8, u8); 4] = [(5, 4), (3, 2), (7, 6), (1, 0)];

/// Unpack one proxy-packed byte into its four `(pin5, pin1)` sample pairs,
/// in transmission order.
fn unpack_byte(byte: u8) -> [(bool, bool); 4] {
    let bit = |pos: u8| (byte >> pos) & 1 != 0;
    let mut pairs = [(false, false); 4];
    for (i, &(hi, lo)) in SAMPLE_BIT_POSITIONS.iter().enumerate() {
        pairs[i] = (bit(hi), bit(lo));
    }
    pairs
}

/// Unpack a full capture into its `(pin5, pin1)` sample-pair sequence.
#[must_use]
pub fn unpack_samples(raw: &[u8]) -> Vec<(bool, bool)> {
    raw.iter().flat_map(|&byte| unpack_byte(byte)).collect()
}

/// Decoder stage: discarding the both-high prelude, or actively decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Prelude,
    Running,
}

/// Edge-triggered bit-recovery state machine.
///
/// Holds the previous-sample edge registers, the in-progress bit
/// accumulator, and the idle/sample bookkeeping needed to compute
/// `useful_sample_count`. Built fresh per capture via [`State::new`] and
/// driven one sample at a time by [`State::feed`].
struct State {
    stage: Stage,
    old_pin5: bool,
    old_pin1: bool,
    accum: u8,
    bitcount: u8,
    output: Vec<u8>,
    since_last_byte: usize,
    idle_run: u32,
    idle_observed: bool,
    total_samples: usize,
}

impl State {
    fn new() -> Self {
        Self {
            stage: Stage::Prelude,
            old_pin5: false,
            old_pin1: true,
            accum: 0,
            bitcount: 0,
            output: Vec::new(),
            since_last_byte: 0,
            idle_run: 0,
            idle_observed: false,
            total_samples: 0,
        }
    }

    /// Shift `bit` into the accumulator MSB-first. Returns `true` if this
    /// shift completed a byte.
    fn push_bit(&mut self, bit: bool) -> bool {
        self.accum = (self.accum << 1) | u8::from(bit);
        self.bitcount += 1;
        if self.bitcount == 8 {
            self.output.push(self.accum);
            self.accum = 0;
            self.bitcount = 0;
            true
        } else {
            false
        }
    }

    fn feed(&mut self, pin5: bool, pin1: bool) {
        self.total_samples += 1;

        if self.stage == Stage::Prelude {
            if pin5 && pin1 {
                // Still idle: discard, don't touch edge registers or counters.
                return;
            }
            self.stage = Stage::Running;
        }

        let p1_fell = self.old_pin1 && !pin1;
        let p5_fell = self.old_pin5 && !pin5;

        let mut byte_completed = false;
        if p1_fell {
            byte_completed |= self.push_bit(pin5);
        }
        if p5_fell {
            byte_completed |= self.push_bit(pin1);
        }

        self.old_pin5 = pin5;
        self.old_pin1 = pin1;

        if byte_completed {
            self.since_last_byte = 0;
        } else {
            self.since_last_byte += 1;
        }

        if pin5 && pin1 {
            self.idle_run += 1;
            if self.idle_run >= IDLE_SAMPLES_INDICATING_COMPLETION {
                self.idle_observed = true;
            }
        } else {
            self.idle_run = 0;
            self.idle_observed = false;
        }
    }

    fn finish(mut self) -> DecodedRx {
        if self.idle_observed && !self.output.is_empty() {
            self.output.pop();
        }
        DecodedRx {
            bytes: self.output,
            useful_sample_count: self.total_samples.saturating_sub(self.since_last_byte),
            idle_observed: self.idle_observed,
        }
    }
}

/// Run the bit-recovery state machine over an already-unpacked sample-pair
/// sequence.
#[must_use]
pub fn decode_samples(samples: &[(bool, bool)]) -> DecodedRx {
    let mut state = State::new();
    for &(pin5, pin1) in samples {
        state.feed(pin5, pin1);
    }
    state.finish()
}

/// Decode a raw, proxy-packed sample-pair capture into bytes.
///
/// Composition of [`unpack_samples`] and [`decode_samples`]; the entry point
/// used by the retry controller and by offline capture replay.
#[must_use]
pub fn debittify(raw: &[u8]) -> DecodedRx {
    decode_samples(&unpack_samples(raw))
}
