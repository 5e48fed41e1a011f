use rustc_hash::FxHashSet;

/// Completion state across the case file screens.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    pub leads_complete: bool,
    completed_evidence: FxHashSet<String>,
    completed_witnesses: FxHashSet<String>,
}

impl ProgressTracker {
    /// Returns `false` if the id was already recorded.
    pub fn complete_evidence(&mut self, id: &str) -> bool {
        self.completed_evidence.insert(id.to_string())
    }

    pub fn complete_witness(&mut self, id: &str) -> bool {
        self.completed_witnesses.insert(id.to_string())
    }

    pub fn evidence_done(&self, id: &str) -> bool {
        self.completed_evidence.contains(id)
    }

    pub fn witness_done(&self, id: &str) -> bool {
        self.completed_witnesses.contains(id)
    }

    pub fn evidence_count(&self) -> usize {
        self.completed_evidence.len()
    }

    pub fn witness_count(&self) -> usize {
        self.completed_witnesses.len()
    }

    pub fn all_evidence_done(&self, total: usize) -> bool {
        self.completed_evidence.len() == total
    }

    pub fn all_witnesses_done(&self, total: usize) -> bool {
        self.completed_witnesses.len() == total
    }

    /// Gate for the identify action.
    pub fn can_identify(&self, total_evidence: usize, total_witnesses: usize) -> bool {
        self.leads_complete
            && self.all_evidence_done(total_evidence)
            && self.all_witnesses_done(total_witnesses)
    }

    #[cfg(test)]
    pub(crate) fn forget_witness(&mut self, id: &str) {
        self.completed_witnesses.remove(id);
    }
}

/// Ordered, duplicate-free list of collected leads.
#[derive(Debug, Clone, Default)]
pub struct CollectedLeads {
    items: Vec<String>,
}

impl CollectedLeads {
    /// Appends `lead` unless present. Returns the new entry's index.
    pub fn push_unique(&mut self, lead: &str) -> Option<usize> {
        if self.contains(lead) {
            return None;
        }
        self.items.push(lead.to_string());
        Some(self.items.len() - 1)
    }

    /// Replaces `old` in place, keeping its position.
    pub fn rename(&mut self, old: &str, new: &str) -> Option<usize> {
        let index = self.items.iter().position(|l| l == old)?;
        self.items[index] = new.to_string();
        Some(index)
    }

    pub fn contains(&self, lead: &str) -> bool {
        self.items.iter().any(|l| l == lead)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_needs_all_three() {
        let mut progress = ProgressTracker::default();
        assert!(!progress.can_identify(1, 1));

        progress.leads_complete = true;
        progress.complete_evidence("manuscript");
        assert!(!progress.can_identify(1, 1));

        progress.complete_witness("cait");
        assert!(progress.can_identify(1, 1));

        progress.forget_witness("cait");
        assert!(!progress.can_identify(1, 1));
        progress.complete_witness("cait");
        progress.leads_complete = false;
        assert!(!progress.can_identify(1, 1));
    }

    #[test]
    fn done_means_exactly_the_total() {
        let mut progress = ProgressTracker::default();
        progress.complete_evidence("candle");
        progress.complete_evidence("dice");
        assert!(progress.all_evidence_done(2));
        assert!(!progress.all_evidence_done(1));
        assert!(!progress.all_evidence_done(3));
    }

    #[test]
    fn completion_sets_never_duplicate() {
        let mut progress = ProgressTracker::default();
        assert!(progress.complete_evidence("dice"));
        assert!(!progress.complete_evidence("dice"));
        assert_eq!(progress.evidence_count(), 1);
    }

    #[test]
    fn leads_rename_in_place() {
        let mut leads = CollectedLeads::default();
        assert_eq!(leads.push_unique("Woman. 20s."), Some(0));
        assert_eq!(leads.push_unique("Has hair."), Some(1));
        assert_eq!(leads.push_unique("Woman. 20s."), None);

        assert_eq!(leads.rename("Woman. 20s.", "Woman. 29."), Some(0));
        assert_eq!(leads.as_slice(), ["Woman. 29.", "Has hair."]);
        assert_eq!(leads.rename("missing", "x"), None);
    }
}
