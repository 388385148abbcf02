use crate::error::DurationParseError;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a Go-style duration string (`300ms`, `1.5h`, `2h45m`).
///
/// A duration is a sequence of decimal numbers, each with an optional
/// fraction and a mandatory unit suffix. Valid units are `ns`, `us` (or `µs`),
/// `ms`, `s`, `m` and `h`. A bare `0` needs no unit. Negative values are
/// rejected since they have no meaning as a timeout.
pub fn parse_go_duration(input: &str) -> Result<Duration, DurationParseError> {
    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after_int) = rest.split_at(int_len);
        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(tail) => tail.split_at(tail.bytes().take_while(u8::is_ascii_digit).count()),
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationParseError::InvalidNumber {
                input: input.to_string(),
            });
        }

        let unit_len = after_number
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_number.len());
        let (unit, tail) = after_number.split_at(unit_len);
        let scale = unit_scale(input, unit)?;

        let overflow = || DurationParseError::Overflow {
            input: input.to_string(),
        };
        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
        if !frac_part.is_empty() {
            // Digits beyond nanosecond precision of an hour cannot matter.
            let digits = &frac_part[..frac_part.len().min(18)];
            let frac: u128 = digits.parse().map_err(|_| DurationParseError::InvalidNumber {
                input: input.to_string(),
            })?;
            let denom = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(frac * scale / denom)
                .ok_or_else(overflow)?;
        }
        total = total.checked_add(nanos).ok_or_else(overflow)?;
        rest = tail;
    }

    if negative && total > 0 {
        return Err(DurationParseError::Negative {
            input: input.to_string(),
        });
    }
    let nanos = u64::try_from(total).map_err(|_| DurationParseError::Overflow {
        input: input.to_string(),
    })?;
    Ok(Duration::from_nanos(nanos))
}

fn unit_scale(input: &str, unit: &str) -> Result<u128, DurationParseError> {
    match unit {
        "" => Err(DurationParseError::MissingUnit {
            input: input.to_string(),
        }),
        "ns" => Ok(1),
        // U+00B5 micro sign and U+03BC Greek small letter mu
        "us" | "\u{b5}s" | "\u{3bc}s" => Ok(NANOS_PER_MICRO),
        "ms" => Ok(NANOS_PER_MILLI),
        "s" => Ok(NANOS_PER_SEC),
        "m" => Ok(60 * NANOS_PER_SEC),
        "h" => Ok(3600 * NANOS_PER_SEC),
        other => Err(DurationParseError::UnknownUnit {
            input: input.to_string(),
            unit: other.to_string(),
        }),
    }
}
