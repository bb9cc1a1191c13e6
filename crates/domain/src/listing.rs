use serde::Serialize;

use crate::error::StoreError;
use crate::models::Article;
use crate::query::{ArticlePage, ArticleQuery, ArticleRows, FilterState};
use crate::sequence::{RequestSequencer, RequestTicket};

const LOAD_FAILED_NOTICE: &str = "Could not load articles. Please try again.";

/// 筛选条件变化后应如何触发下一次查询
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Unchanged,
    /// 只有搜索词变了：等输入静默后再查
    Debounced,
    /// 分类、日期、排序是离散选择，立即查询
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// 不是最新请求的响应，已丢弃
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub filters: FilterState,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<Article>,
    pub total_pages: u32,
    pub loading: bool,
    pub notice: Option<String>,
}

/// 文章列表的界面状态。列表只会被整体替换，不做增量修改。
#[derive(Debug)]
pub struct ListingState {
    filters: FilterState,
    page: u32,
    page_size: u32,
    sequencer: RequestSequencer,
    items: Vec<Article>,
    total_pages: u32,
    loading: bool,
    notice: Option<String>,
}

impl ListingState {
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: FilterState::default(),
            page: 1,
            page_size: page_size.max(1),
            sequencer: RequestSequencer::new(),
            items: Vec::new(),
            total_pages: 1,
            loading: false,
            notice: None,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// 任何筛选条件变化都会把页码重置为 1。
    /// 搜索词按去掉首尾空白后比较，只改空白不算变化。
    pub fn set_filters(&mut self, next: FilterState) -> FilterChange {
        let search_changed = next.search_term.trim() != self.filters.search_term.trim();
        let others_changed = next.categories != self.filters.categories
            || next.date_from != self.filters.date_from
            || next.date_to != self.filters.date_to
            || next.sort != self.filters.sort;

        self.filters = next;
        if !search_changed && !others_changed {
            return FilterChange::Unchanged;
        }
        self.page = 1;

        if others_changed {
            FilterChange::Immediate
        } else {
            FilterChange::Debounced
        }
    }

    /// 翻页不影响筛选条件
    pub fn set_page(&mut self, page: i64) -> bool {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        let changed = page != self.page;
        self.page = page;
        changed
    }

    pub fn begin_request(&mut self) -> (RequestTicket, ArticleQuery) {
        self.loading = true;
        let ticket = self.sequencer.issue();
        let query = ArticleQuery::plan(&self.filters, i64::from(self.page), self.page_size);
        (ticket, query)
    }

    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<ArticleRows, StoreError>,
    ) -> Completion {
        if !self.sequencer.is_current(ticket) {
            return Completion::Stale;
        }

        self.loading = false;
        match result {
            Ok(rows) => {
                let page = ArticlePage::interpret(rows, self.page_size);
                self.items = page.items;
                self.total_pages = page.total_pages;
                self.notice = None;
                Completion::Applied
            }
            Err(_) => {
                // 保留已加载的列表，只提示
                self.notice = Some(LOAD_FAILED_NOTICE.to_string());
                Completion::Failed
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn view(&self) -> ListingView {
        ListingView {
            filters: self.filters.clone(),
            page: self.page,
            page_size: self.page_size,
            items: self.items.clone(),
            total_pages: self.total_pages,
            loading: self.loading,
            notice: self.notice.clone(),
        }
    }
}
