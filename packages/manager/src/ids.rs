//! Monotonic incidence id generation.

use incidence_map_incidence_models::IncidenceId;

/// Issues timestamp-derived ids that never repeat within a session.
///
/// Each id comes from a millisecond value strictly greater than the
/// previous one. If that value is already taken (e.g. by a hydrated
/// record), the generator moves forward one millisecond at a time.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: Option<i64>,
}

impl IdGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_millis: None }
    }

    pub fn next_id(&mut self, now_millis: i64, taken: impl Fn(&IncidenceId) -> bool) -> IncidenceId {
        let mut millis = self
            .last_millis
            .map_or(now_millis, |last| now_millis.max(last + 1));

        loop {
            let id = IncidenceId::from_millis(millis);
            if !taken(&id) {
                self.last_millis = Some(millis);
                return id;
            }
            log::trace!("Id {id} already taken");
            millis += 1;
        }
    }
}
