/// Termination condition for [`crate::Repeater::until`].
///
/// Checked after each action invocation with the running call count, so the
/// action always runs at least once. Implemented for `FnMut(u64) -> bool`
/// closures and for plain `bool`; a `bool` is a constant condition, meaning
/// `true` stops after the first call and `false` never stops.
pub trait StopCondition {
    fn is_met(&mut self, calls: u64) -> bool;
}

impl<F> StopCondition for F
where
    F: FnMut(u64) -> bool,
{
    fn is_met(&mut self, calls: u64) -> bool {
        (self)(calls)
    }
}

impl StopCondition for bool {
    fn is_met(&mut self, _calls: u64) -> bool {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sees_the_call_count() {
        let mut seen = Vec::new();
        let mut condition = |calls: u64| {
            seen.push(calls);
            calls >= 3
        };
        assert!(!condition.is_met(1));
        assert!(!condition.is_met(2));
        assert!(condition.is_met(3));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn bool_is_a_constant_condition() {
        assert!(true.is_met(1));
        assert!(true.is_met(99));
        assert!(!false.is_met(1));
    }
}
