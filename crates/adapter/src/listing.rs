//! 文章列表控制器：在一个任务里串起筛选、防抖、翻页与过期响应丢弃，
//! 通过 watch 通道对外发布当前视图。
use domain::{
    ArticleRows, Completion, Debouncer, FilterChange, FilterState, ListingState, ListingView,
    RequestTicket, StoreError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::traits::ArticleSearch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingCommand {
    SetFilters(FilterState),
    GoToPage(i64),
    Refresh,
    DismissNotice,
}

#[derive(Debug, Clone, Copy)]
pub struct ListingSettings {
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: 9,
            search_debounce: Duration::from_millis(300),
        }
    }
}

pub struct ListingHandle {
    commands: mpsc::Sender<ListingCommand>,
    view: watch::Receiver<ListingView>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ListingHandle {
    pub async fn send(&self, cmd: ListingCommand) -> anyhow::Result<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| anyhow::anyhow!("listing controller has stopped"))
    }

    pub fn view(&self) -> watch::Receiver<ListingView> {
        self.view.clone()
    }

    pub fn current(&self) -> ListingView {
        self.view.borrow().clone()
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("Listing controller panicked: {:?}", e);
        }
    }
}

/// 启动控制器并立即加载第一页
pub fn spawn_listing<S>(store: Arc<S>, settings: ListingSettings) -> ListingHandle
where
    S: ArticleSearch + ?Sized + 'static,
{
    let state = ListingState::new(settings.page_size);
    let (tx_view, rx_view) = watch::channel(state.view());
    let (tx_cmd, rx_cmd) = mpsc::channel(32);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run(
        store,
        state,
        settings.search_debounce,
        rx_cmd,
        tx_view,
        cancel.clone(),
    ));

    ListingHandle {
        commands: tx_cmd,
        view: rx_view,
        cancel,
        task,
    }
}

type Fetch = (RequestTicket, Result<ArticleRows, StoreError>);

async fn run<S>(
    store: Arc<S>,
    mut state: ListingState,
    quiet: Duration,
    mut rx_cmd: mpsc::Receiver<ListingCommand>,
    tx_view: watch::Sender<ListingView>,
    cancel: CancellationToken,
) where
    S: ArticleSearch + ?Sized + 'static,
{
    let mut search: Debouncer<(), Instant> = Debouncer::new(quiet);
    let mut in_flight: JoinSet<Fetch> = JoinSet::new();

    dispatch(&store, &mut state, &mut in_flight);
    tx_view.send_replace(state.view());

    loop {
        let deadline = search.deadline();
        // 没有待发搜索时该分支被禁用，这里的时间点不会被用到
        let wake = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            _ = cancel.cancelled() => break,

            cmd = rx_cmd.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    ListingCommand::SetFilters(next) => match state.set_filters(next) {
                        FilterChange::Unchanged => {}
                        FilterChange::Debounced => search.schedule((), Instant::now()),
                        FilterChange::Immediate => {
                            search.cancel();
                            dispatch(&store, &mut state, &mut in_flight);
                        }
                    },
                    ListingCommand::GoToPage(page) => {
                        if state.set_page(page) {
                            search.cancel();
                            dispatch(&store, &mut state, &mut in_flight);
                        }
                    }
                    ListingCommand::Refresh => {
                        search.cancel();
                        dispatch(&store, &mut state, &mut in_flight);
                    }
                    ListingCommand::DismissNotice => state.dismiss_notice(),
                }
            }

            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                match joined {
                    Ok((ticket, result)) => match state.complete(ticket, result) {
                        Completion::Applied => {}
                        Completion::Failed => warn!("Article listing request {} failed", ticket.value()),
                        Completion::Stale => debug!("Discarded stale listing response {}", ticket.value()),
                    },
                    Err(e) => error!("Listing fetch task aborted: {:?}", e),
                }
            }

            _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                if search.fire(Instant::now()).is_some() {
                    dispatch(&store, &mut state, &mut in_flight);
                }
            }
        }

        tx_view.send_replace(state.view());
    }

    in_flight.abort_all();
    info!("Listing controller stopped");
}

fn dispatch<S>(store: &Arc<S>, state: &mut ListingState, in_flight: &mut JoinSet<Fetch>)
where
    S: ArticleSearch + ?Sized + 'static,
{
    let (ticket, query) = state.begin_request();
    let store = Arc::clone(store);
    in_flight.spawn(async move {
        let result = store.query_articles(&query).await;
        (ticket, result)
    });
}
