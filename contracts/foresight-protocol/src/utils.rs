use crate::errors::Error;

/// Basis-point denominator: 10_000 bps == 100%.
pub const BPS_DENOMINATOR: i128 = 10_000;

// ===== TIME UTILITIES =====

pub struct TimeUtils;

impl TimeUtils {
    pub fn days_to_seconds(days: u32) -> u64 {
        days as u64 * 24 * 60 * 60
    }

    pub fn hours_to_seconds(hours: u32) -> u64 {
        hours as u64 * 60 * 60
    }

    /// Check if a timestamp is strictly after `current_time`
    pub fn is_future_timestamp(current_time: u64, future_time: u64) -> bool {
        future_time > current_time
    }

    /// Deadlines are inclusive: at `deadline` the window is already over.
    pub fn is_deadline_passed(current_time: u64, deadline: u64) -> bool {
        current_time >= deadline
    }

    pub fn add_window(current_time: u64, window: u64) -> Result<u64, Error> {
        current_time
            .checked_add(window)
            .ok_or(Error::ArithmeticOverflow)
    }
}

// ===== NUMERIC UTILITIES =====

/// Checked fixed-point arithmetic over token base units.
pub struct NumericUtils;

impl NumericUtils {
    pub fn checked_add(a: i128, b: i128) -> Result<i128, Error> {
        a.checked_add(b).ok_or(Error::ArithmeticOverflow)
    }

    pub fn checked_sub(a: i128, b: i128) -> Result<i128, Error> {
        a.checked_sub(b).ok_or(Error::ArithmeticOverflow)
    }

    /// `a * b / c`, truncated toward zero.
    pub fn mul_div(a: i128, b: i128, c: i128) -> Result<i128, Error> {
        if c == 0 {
            return Err(Error::ArithmeticOverflow);
        }
        a.checked_mul(b)
            .ok_or(Error::ArithmeticOverflow)?
            .checked_div(c)
            .ok_or(Error::ArithmeticOverflow)
    }

    pub fn apply_bps(amount: i128, bps: u32) -> Result<i128, Error> {
        Self::mul_div(amount, bps as i128, BPS_DENOMINATOR)
    }
}
