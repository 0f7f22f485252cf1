//! Accepted-state guard against redundant re-renders.

use crate::model::notification::NotificationList;

/// Returns whether `incoming` differs from `previous`.
///
/// Lists are equal only with the same length and the same string at every
/// index; no trimming or case folding is applied.
pub fn notifications_changed(previous: &NotificationList, incoming: &NotificationList) -> bool {
    if previous.len() != incoming.len() {
        return true;
    }
    previous
        .iter()
        .zip(incoming.iter())
        .any(|(before, after)| before != after)
}

/// Holds the last accepted list and compares new deliveries against it.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    accepted: Option<NotificationList>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a previously persisted list.
    pub fn seeded(list: NotificationList) -> Self {
        Self {
            accepted: Some(list),
        }
    }

    /// Nothing accepted yet counts as changed.
    pub fn has_changed(&self, incoming: &NotificationList) -> bool {
        match &self.accepted {
            Some(previous) => notifications_changed(previous, incoming),
            None => true,
        }
    }

    /// Replaces the accepted list.
    pub fn accept(&mut self, list: NotificationList) {
        self.accepted = Some(list);
    }

    pub fn accepted(&self) -> Option<&NotificationList> {
        self.accepted.as_ref()
    }

    pub fn reset(&mut self) {
        self.accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{notifications_changed, ChangeDetector};
    use crate::model::notification::NotificationList;

    fn list(items: &[&str]) -> NotificationList {
        NotificationList::from(items)
    }

    #[test]
    fn identical_lists_are_unchanged() {
        assert!(!notifications_changed(&list(&["a", "b"]), &list(&["a", "b"])));
        assert!(!notifications_changed(&list(&[]), &list(&[])));
    }

    #[test]
    fn length_mismatch_is_changed() {
        assert!(notifications_changed(&list(&["a", "b"]), &list(&["a"])));
        assert!(notifications_changed(&list(&[]), &list(&["a"])));
    }

    #[test]
    fn order_matters() {
        assert!(notifications_changed(&list(&["a", "b"]), &list(&["b", "a"])));
    }

    #[test]
    fn comparison_is_exact() {
        assert!(notifications_changed(&list(&["a"]), &list(&["A"])));
        assert!(notifications_changed(&list(&["a"]), &list(&["a "])));
    }

    #[test]
    fn detector_tracks_accepted_list() {
        let mut detector = ChangeDetector::new();
        assert!(detector.has_changed(&list(&[])));

        detector.accept(list(&["x"]));
        assert!(!detector.has_changed(&list(&["x"])));
        assert!(detector.has_changed(&list(&["x", "y"])));

        detector.reset();
        assert!(detector.accepted().is_none());
        assert!(detector.has_changed(&list(&["x"])));
    }

    #[test]
    fn seeded_detector_suppresses_duplicate_of_persisted_list() {
        let detector = ChangeDetector::seeded(list(&["saved"]));
        assert!(!detector.has_changed(&list(&["saved"])));
    }
}
