//! Bookkeeping for one on-demand hint per displayed question.

/// Identifies the question a hint request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintTicket {
    epoch: u64,
    question_id: u32,
}

impl HintTicket {
    pub fn question_id(&self) -> u32 {
        self.question_id
    }
}

/// Tracks the cached hint and the in-flight request for the current question.
///
/// Every change of the displayed question bumps the epoch, so a response
/// for an earlier question (even one with the same id in another topic)
/// no longer matches and is dropped.
#[derive(Debug, Default)]
pub struct HintCoordinator {
    epoch: u64,
    hint: Option<String>,
    in_flight: Option<HintTicket>,
}

impl HintCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a request for `question_id`, unless a hint is already cached or
    /// one is on its way.
    pub fn request(&mut self, question_id: u32) -> Option<HintTicket> {
        if self.hint.is_some() || self.in_flight.is_some() {
            return None;
        }
        let ticket = HintTicket {
            epoch: self.epoch,
            question_id,
        };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Apply a settled response. Returns whether it was still current.
    pub fn complete(&mut self, ticket: HintTicket, text: String) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::debug!(
                "dropping stale hint for question {}",
                ticket.question_id
            );
            return false;
        }
        self.in_flight = None;
        self.hint = Some(text);
        true
    }

    /// Forget the hint and any pending request; the displayed question changed.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.hint = None;
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_then_complete() {
        let mut hints = HintCoordinator::new();
        let ticket = hints.request(7).unwrap();

        assert!(hints.is_loading());
        assert_eq!(ticket.question_id(), 7);
        assert!(hints.complete(ticket, "Think about slopes.".to_string()));
        assert_eq!(hints.hint(), Some("Think about slopes."));
        assert!(!hints.is_loading());
    }

    #[test]
    fn test_no_duplicate_requests() {
        let mut hints = HintCoordinator::new();
        let ticket = hints.request(1).unwrap();
        assert_eq!(hints.request(1), None);

        hints.complete(ticket, "hint".to_string());
        assert_eq!(hints.request(1), None);
    }

    #[test]
    fn test_response_after_reset_is_dropped() {
        let mut hints = HintCoordinator::new();
        let ticket = hints.request(1).unwrap();

        hints.reset();
        assert!(!hints.complete(ticket, "late".to_string()));
        assert_eq!(hints.hint(), None);
        assert!(!hints.is_loading());
    }

    #[test]
    fn test_returning_to_the_same_question_does_not_revive_old_request() {
        let mut hints = HintCoordinator::new();
        let first = hints.request(1).unwrap();

        hints.reset();
        hints.reset();
        let second = hints.request(1).unwrap();

        assert!(!hints.complete(first, "old".to_string()));
        assert!(hints.is_loading());
        assert!(hints.complete(second, "new".to_string()));
        assert_eq!(hints.hint(), Some("new"));
    }
}
