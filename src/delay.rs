use std::time::Duration;

/// Conversion into an inter-call delay.
///
/// Accepted forms: a number of milliseconds, a [`Duration`], or a string
/// with an integer magnitude and a `ms`, `s` or `m` suffix ("500ms", "2s",
/// "1m"). Strings that do not match produce `None`, which
/// [`crate::Repeater::every`] treats as "leave the current delay alone".
pub trait IntoDelay {
    fn into_delay(self) -> Option<Duration>;
}

impl IntoDelay for u64 {
    fn into_delay(self) -> Option<Duration> {
        Some(Duration::from_millis(self))
    }
}

impl IntoDelay for Duration {
    fn into_delay(self) -> Option<Duration> {
        Some(self)
    }
}

impl IntoDelay for &str {
    fn into_delay(self) -> Option<Duration> {
        parse_duration(self)
    }
}

impl IntoDelay for String {
    fn into_delay(self) -> Option<Duration> {
        parse_duration(&self)
    }
}

fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    // "ms" has to be peeled off before "s".
    let (magnitude, millis_per_unit) = if let Some(m) = input.strip_suffix("ms") {
        (m, 1)
    } else if let Some(m) = input.strip_suffix('s') {
        (m, 1_000)
    } else if let Some(m) = input.strip_suffix('m') {
        (m, 60_000)
    } else {
        return None;
    };

    let magnitude: u64 = magnitude.trim().parse().ok()?;
    let millis = magnitude.checked_mul(millis_per_unit)?;
    Some(Duration::from_millis(millis))
}
