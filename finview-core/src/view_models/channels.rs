use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use finview_config::GuideConfig;
use finview_model::prelude::*;
use tracing::debug;

use crate::error::{CoreError, TaskResult};
use crate::paging::{PageFetcher, PageRequest, PagingLibraryViewModel};
use crate::session::UserSession;

/// Live TV channels joined with the programs airing in the guide window.
pub type ChannelsViewModel = PagingLibraryViewModel<ChannelsFetcher>;

/// Fetches a page of channels, then the programs of exactly those channels
/// within `[now - lookback, now + lookahead]`.
#[derive(Debug, Clone)]
pub struct ChannelsFetcher {
    session: UserSession,
    page_size: u32,
    lookback: Duration,
    lookahead: Duration,
}

impl ChannelsFetcher {
    pub fn new(session: UserSession, page_size: u32, guide: &GuideConfig) -> Self {
        Self {
            session,
            page_size,
            lookback: to_chrono(guide.lookback),
            lookahead: to_chrono(guide.lookahead),
        }
    }

    pub fn view_model(self) -> Result<ChannelsViewModel, CoreError> {
        PagingLibraryViewModel::new(self)
    }

    async fn programs(
        &self,
        channels: &[BaseItem],
        now: DateTime<Utc>,
    ) -> TaskResult<Vec<BaseItem>> {
        let channel_ids: Vec<ItemId> =
            channels.iter().filter_map(|channel| channel.id).collect();
        if channel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = ProgramsQuery {
            channel_ids,
            user_id: Some(self.session.user_id()),
            min_end_date: Some(now - self.lookback),
            max_start_date: Some(now + self.lookahead),
            sort_by: vec![ItemSortBy::StartDate],
        };
        let page = self.session.api().live_tv_programs(&query).await?;
        Ok(page.items)
    }
}

fn to_chrono(duration: std::time::Duration) -> Duration {
    Duration::from_std(duration).unwrap_or_else(|_| Duration::days(365))
}

/// Attach `programs` to their channels. Every channel is kept, including
/// those with no program in the window. Programs are ordered by start date
/// and channels by name.
pub fn join_programs(
    channels: Vec<BaseItem>,
    programs: Vec<BaseItem>,
) -> Vec<ChannelProgram> {
    let mut by_channel: HashMap<ItemId, Vec<BaseItem>> = HashMap::new();
    for program in programs {
        if let Some(channel_id) = program.channel_id {
            by_channel.entry(channel_id).or_default().push(program);
        }
    }

    let mut joined: Vec<ChannelProgram> = channels
        .into_iter()
        .map(|channel| {
            let mut programs = channel
                .id
                .and_then(|id| by_channel.remove(&id))
                .unwrap_or_default();
            programs.sort_by_key(|program| program.start_date);
            ChannelProgram::new(channel, programs)
        })
        .collect();

    joined.sort_by(|a, b| a.channel.name.cmp(&b.channel.name));
    joined
}

#[async_trait]
impl PageFetcher for ChannelsFetcher {
    type Item = ChannelProgram;

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn fetch_page(
        &self,
        request: PageRequest,
    ) -> TaskResult<Vec<ChannelProgram>> {
        let query = ChannelsQuery {
            user_id: Some(self.session.user_id()),
            start_index: request.start_index,
            limit: Some(request.limit),
            sort_by: vec![ItemSortBy::SortName],
            fields: ItemFields::MINIMUM.to_vec(),
        };
        let channels = self.session.api().live_tv_channels(&query).await?.items;

        let programs = self.programs(&channels, Utc::now()).await?;
        debug!(
            channels = channels.len(),
            programs = programs.len(),
            "joined guide page"
        );
        Ok(join_programs(channels, programs))
    }
}
