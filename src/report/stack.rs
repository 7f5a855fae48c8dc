use super::types::{ReportError, ReportResult};

/// LIFO of open report nodes.
///
/// Besides the stack itself, tracks the item most recently pushed *or*
/// popped. After an activity finishes the popped node stays the most
/// recently touched one, so artifacts captured right after a finish land on
/// the activity that just closed rather than on its parent.
#[derive(Debug, Clone)]
pub struct ActivityStack<T> {
    items: Vec<T>,
    most_recent: Option<T>,
}

impl<T: Clone> ActivityStack<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            most_recent: None,
        }
    }

    pub fn push(&mut self, item: T) {
        self.most_recent = Some(item.clone());
        self.items.push(item);
    }

    pub fn pop(&mut self) -> ReportResult<T> {
        let item = self.items.pop().ok_or(ReportError::EmptyStack)?;
        self.most_recent = Some(item.clone());
        Ok(item)
    }

    pub fn top(&self) -> ReportResult<&T> {
        self.items.last().ok_or(ReportError::EmptyStack)
    }

    pub fn most_recently_touched(&self) -> Option<&T> {
        self.most_recent.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> Default for ActivityStack<T> {
    fn default() -> Self {
        Self::new()
    }
}
