use chrono::{DateTime, Utc};

use crate::item::BaseItem;

/// A live TV channel together with the programs airing on it inside the
/// requested guide window, ordered by start date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelProgram {
    pub channel: BaseItem,
    pub programs: Vec<BaseItem>,
}

impl ChannelProgram {
    pub fn new(channel: BaseItem, programs: Vec<BaseItem>) -> Self {
        Self { channel, programs }
    }

    /// The program airing at `now`, if any.
    pub fn current_program(&self, now: DateTime<Utc>) -> Option<&BaseItem> {
        self.programs.iter().find(|program| program.is_airing_at(now))
    }

    /// Programs that start after `now`.
    pub fn upcoming_programs(
        &self,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &BaseItem> {
        self.programs
            .iter()
            .filter(move |program| program.start_date.is_some_and(|s| s > now))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn program(start: DateTime<Utc>, minutes: i64) -> BaseItem {
        BaseItem {
            start_date: Some(start),
            end_date: Some(start + Duration::minutes(minutes)),
            ..BaseItem::default()
        }
    }

    #[test]
    fn finds_current_and_upcoming_programs() {
        let now = Utc::now();
        let channel = ChannelProgram::new(
            BaseItem::default(),
            vec![
                program(now - Duration::minutes(30), 60),
                program(now + Duration::minutes(30), 30),
            ],
        );

        assert_eq!(
            channel.current_program(now),
            Some(&channel.programs[0])
        );
        assert_eq!(channel.upcoming_programs(now).count(), 1);
    }
}
