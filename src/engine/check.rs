//! Last line of defence before samples reach the DAC.
//!
//! Compiled into the scheduler for debug builds and with the `check-buffer`
//! feature. A block containing NaN, infinity or anything beyond ±2 is
//! silenced outright; milder overs are hard-clipped to ±1.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCheck {
    Clean,
    Clamped,
    Zeroed,
}

const POISON_LIMIT: f32 = 2.0;

pub fn check_buffer(buffer: &mut [f32]) -> BlockCheck {
    if buffer.iter().any(|x| !x.is_finite() || x.abs() > POISON_LIMIT) {
        buffer.fill(0.0);
        return BlockCheck::Zeroed;
    }

    let mut result = BlockCheck::Clean;
    for x in buffer.iter_mut().filter(|x| x.abs() > 1.0) {
        *x = x.signum();
        result = BlockCheck::Clamped;
    }
    result
}
