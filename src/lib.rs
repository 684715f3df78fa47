mod condition;
mod delay;
mod repeater;
mod state;

pub use condition::StopCondition;
pub use delay::IntoDelay;
pub use repeater::{ActionError, ActionFailed, Repeater};
pub use state::Status;

use std::future::Future;

/// Wrap an action into a [`Repeater`].
///
/// The action receives the 1-based index of the current call.
pub fn repeat<F, Fut>(action: F) -> Repeater<F>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<(), ActionError>>,
{
    Repeater::new(action)
}
