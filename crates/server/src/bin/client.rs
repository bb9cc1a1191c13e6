//! 命令行客户端。
//!
//! - 默认：对运行中的服务做一次冒烟检查
//! - `browse`：交互式浏览文章列表，筛选、防抖与翻页交给列表控制器
#[allow(dead_code)]
#[path = "../config.rs"]
mod config;

use adapter::{spawn_listing, ArticleSearch, ListingCommand};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use dotenvy::dotenv;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use config::Settings;
use domain::query::Predicate;
use domain::{
    Article, ArticlePage, ArticleQuery, ArticleRows, CommentNode, FilterState, ListingView,
    SortKey, StoreError,
};

const BASE_URL: &str = "http://127.0.0.1:3000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const HELP: &str = "\
Type a search term, or one of:
  /cat rust,react    filter by categories (empty clears)
  /sort most_liked   newest | oldest | most_liked | most_viewed
  /from 2024-06-01   published on or after (empty clears)
  /to 2024-06-30     published on or before (empty clears)
  /page 2            go to page
  /clear             reset all filters
  /refresh           reload the current page
  /dismiss           hide the error notice
  /quit";

#[derive(Serialize)]
struct CreateCommentRequest {
    author_name: String,
    email: String,
    content: String,
    parent_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let base = std::env::var("SHIKILINK_CLIENT_BASE_URL").unwrap_or_else(|_| BASE_URL.to_string());
    match std::env::args().nth(1).as_deref() {
        Some("browse") => browse(base).await,
        _ => smoke(base).await,
    }
}

async fn smoke(base: String) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    println!("Starting ShikiLink smoke client against {}...", base);

    println!("\n[1/4] Listing first page...");
    let page: ArticlePage = client
        .get(format!("{}/api/articles?page=1", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!(
        "   -> {} article(s), {} page(s)",
        page.items.len(),
        page.total_pages
    );

    let Some(first) = page.items.first() else {
        println!("   -> No published articles, nothing else to check.");
        return Ok(());
    };

    println!("\n[2/4] Opening '{}'...", first.title);
    let article: Article = client
        .get(format!("{}/api/articles/{}", base, first.id))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!(
        "   -> views: {}, likes: {}",
        article.view_count, article.like_count
    );

    println!("\n[3/4] Fetching comment thread...");
    let thread: Vec<CommentNode> = client
        .get(format!("{}/api/articles/{}/comments", base, article.id))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    for node in &thread {
        print_node(node, 1);
    }
    if thread.is_empty() {
        println!("   -> (no approved comments)");
    }

    println!("\n[4/4] Submitting comment...");
    let payload = CreateCommentRequest {
        author_name: "Ferris".to_string(),
        email: "ferris@example.com".to_string(),
        content: "This is a message from the ShikiLink smoke client!".to_string(),
        parent_id: thread.first().map(|n| n.comment.id.clone()),
    };
    let resp = client
        .post(format!("{}/api/articles/{}/comments", base, article.id))
        .json(&payload)
        .send()
        .await?;

    if resp.status().is_success() {
        let body: Value = resp.json().await?;
        println!("   -> ✅ Accepted, status: {}", body["status"]);
    } else {
        println!("   -> ❌ Failed to send: {:?}", resp.text().await?);
    }

    Ok(())
}

fn print_node(node: &CommentNode, depth: usize) {
    println!(
        "{}- [{}] {}: {}",
        "   ".repeat(depth),
        node.comment.created_at,
        node.comment.author_name,
        node.comment.content
    );
    for reply in &node.replies {
        print_node(reply, depth + 1);
    }
}

/// 通过公开 HTTP 接口执行列表查询
struct HttpArticleStore {
    client: reqwest::Client,
    base: String,
}

impl HttpArticleStore {
    fn new(base: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ArticleSearch for HttpArticleStore {
    async fn query_articles(&self, query: &ArticleQuery) -> Result<ArticleRows, StoreError> {
        let page: ArticlePage = self
            .client
            .get(format!("{}/api/articles", self.base))
            .query(&query_params(query))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(into_store_error)?
            .json()
            .await
            .map_err(into_store_error)?;

        Ok(ArticleRows {
            items: page.items,
            total_count: page.total_count,
        })
    }
}

fn into_store_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Backend(e.to_string())
    }
}

// 查询 -> /api/articles 的查询参数
fn query_params(query: &ArticleQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    for predicate in &query.filter {
        match predicate {
            // 服务端只返回已发布的文章
            Predicate::Status(_) => {}
            Predicate::TextMatch(term) => params.push(("q", term.clone())),
            Predicate::TagsAny(tags) => params.push(("categories", tags.join(","))),
            Predicate::PublishedFrom(at) => params.push(("from", at.date().to_string())),
            Predicate::PublishedUntil(at) => params.push(("to", at.date().to_string())),
        }
    }
    if let Ok(sort) = SortKey::try_from(query.order) {
        params.push(("sort", sort.as_str().to_string()));
    }

    let limit = query.limit.max(1);
    params.push(("page", (query.offset / limit + 1).to_string()));
    params.push(("page_size", limit.to_string()));
    params
}

#[derive(Debug, PartialEq)]
enum Input {
    Send(ListingCommand),
    Quit,
}

/// 普通输入即搜索词，`/` 开头的是命令。`filters` 保存当前的筛选条件。
fn parse_input(line: &str, filters: &mut FilterState) -> Result<Input, String> {
    let line = line.trim_end();
    let Some(rest) = line.strip_prefix('/') else {
        filters.search_term = line.to_string();
        return Ok(Input::Send(ListingCommand::SetFilters(filters.clone())));
    };

    let (name, arg) = match rest.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "quit" | "q" => return Ok(Input::Quit),
        "refresh" => return Ok(Input::Send(ListingCommand::Refresh)),
        "dismiss" => return Ok(Input::Send(ListingCommand::DismissNotice)),
        "page" => {
            let page = arg
                .parse()
                .map_err(|_| format!("invalid page: {:?}", arg))?;
            return Ok(Input::Send(ListingCommand::GoToPage(page)));
        }
        "cat" => {
            filters.categories = arg
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
        }
        "sort" => filters.sort = arg.parse()?,
        "from" => filters.date_from = parse_date(arg)?,
        "to" => filters.date_to = parse_date(arg)?,
        "clear" => *filters = FilterState::default(),
        other => return Err(format!("unknown command: /{}", other)),
    }
    Ok(Input::Send(ListingCommand::SetFilters(filters.clone())))
}

fn parse_date(arg: &str) -> Result<Option<NaiveDate>, String> {
    if arg.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| format!("invalid date {:?}: {}", arg, e))
}

async fn browse(base: String) -> anyhow::Result<()> {
    let settings = Settings::new().context("Failed to load configuration")?;
    let store = Arc::new(HttpArticleStore::new(&base)?);
    let handle = spawn_listing(store, settings.listing.to_adapter());
    println!("Browsing articles on {}\n{}", base, HELP);

    let mut view = handle.view();
    let mut shown: Option<ListingView> = None;
    let mut filters = FilterState::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                // 控制器每处理一条消息都会发布视图，内容没变就不重画
                if shown.as_ref() != Some(&current) {
                    render(&current);
                    shown = Some(current);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line, &mut filters) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Send(cmd)) => handle.send(cmd).await?,
                    Err(msg) => println!("   -> {}", msg),
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn render(view: &ListingView) {
    if view.loading {
        println!("   ... loading page {}", view.page);
        return;
    }
    println!("\n== page {}/{} ==", view.page, view.total_pages);
    for article in &view.items {
        println!(
            "   - {} (views: {}, likes: {})",
            article.title, article.view_count, article.like_count
        );
    }
    if view.items.is_empty() {
        println!("   (no articles)");
    }
    if let Some(notice) = &view.notice {
        println!("   !! {} (/dismiss to hide)", notice);
    }
}
