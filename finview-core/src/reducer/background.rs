use std::fmt;

/// Ordered set of markers for work currently in flight.
///
/// Each marker keeps a holder count: overlapping tasks may hold the same
/// marker and it stays present until the last of them lets go. Iteration
/// follows first-insertion order.
#[derive(Clone, PartialEq, Eq)]
pub struct BackgroundStates<B> {
    entries: Vec<(B, usize)>,
}

impl<B> Default for BackgroundStates<B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<B: fmt::Debug + PartialEq> fmt::Debug for BackgroundStates<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<B: PartialEq> BackgroundStates<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, marker: &B) -> bool {
        self.entries.iter().any(|(held, _)| held == marker)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &B> {
        self.entries.iter().map(|(marker, _)| marker)
    }

    /// Take a hold on `marker`. Returns `true` when it became present.
    pub fn acquire(&mut self, marker: B) -> bool {
        match self.entries.iter_mut().find(|(held, _)| *held == marker) {
            Some((_, holders)) => {
                *holders += 1;
                false
            }
            None => {
                self.entries.push((marker, 1));
                true
            }
        }
    }

    /// Drop one hold on `marker`. Returns `true` when it became absent.
    pub fn release(&mut self, marker: &B) -> bool {
        let Some(index) =
            self.entries.iter().position(|(held, _)| held == marker)
        else {
            return false;
        };

        let holders = &mut self.entries[index].1;
        *holders -= 1;
        if *holders == 0 {
            self.entries.remove(index);
            true
        } else {
            false
        }
    }
}
