use crate::{models::SqlArticle, Db};
use chrono::NaiveDateTime;
use domain::query::{fold_case, Direction, Predicate};
use domain::{Article, ArticleQuery, ArticleRows, ArticleStats, ArticleStatus, PublicStats};
use sqlx::{QueryBuilder, Sqlite};

const ARTICLE_COLUMNS: &str = "a.id, a.title, a.content, a.excerpt, a.status, a.category_tags, \
     a.created_at, a.updated_at, a.published_at, a.view_count, a.like_count";

// 谓词翻译为 WHERE 子句，全部以 AND 连接
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &[Predicate]) {
    qb.push(" WHERE 1 = 1");
    for predicate in filter {
        qb.push(" AND ");
        match predicate {
            Predicate::Status(status) => {
                qb.push("a.status = ").push_bind(status.as_str());
            }
            Predicate::TextMatch(term) => {
                // 与折叠列比较；instr 不把 % 和 _ 当作通配符
                let needle = fold_case(term);
                qb.push("(instr(a.search_title, ")
                    .push_bind(needle.clone())
                    .push(") > 0 OR instr(a.search_content, ")
                    .push_bind(needle)
                    .push(") > 0)");
            }
            Predicate::TagsAny(tags) if tags.is_empty() => {
                qb.push("1 = 0");
            }
            Predicate::TagsAny(tags) => {
                qb.push("EXISTS (SELECT 1 FROM json_each(a.category_tags) WHERE json_each.value IN (");
                let mut values = qb.separated(", ");
                for tag in tags {
                    values.push_bind(tag.clone());
                }
                qb.push("))");
            }
            Predicate::PublishedFrom(start) => {
                qb.push("a.published_at >= ").push_bind(*start);
            }
            Predicate::PublishedUntil(end) => {
                qb.push("a.published_at <= ").push_bind(*end);
            }
        }
    }
}

fn into_articles(rows: Vec<SqlArticle>) -> anyhow::Result<Vec<Article>> {
    rows.into_iter().map(Article::try_from).collect()
}

impl Db {
    /// 执行一次列表查询，同时返回满足条件的总数
    pub async fn query_articles(&self, query: &ArticleQuery) -> anyhow::Result<ArticleRows> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(ARTICLE_COLUMNS).push(" FROM articles a");
        push_filter(&mut qb, &query.filter);

        let direction = match query.order.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        qb.push(format!(
            " ORDER BY a.{} {}",
            query.order.field.column(),
            direction
        ));
        qb.push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset));

        let rows = qb
            .build_query_as::<SqlArticle>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM articles a");
        push_filter(&mut count_qb, &query.filter);
        let total_count = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(ArticleRows {
            items: into_articles(rows)?,
            total_count,
        })
    }

    pub async fn get_article(&self, id: &str) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query_as::<_, SqlArticle>(&format!(
            "SELECT {} FROM articles a WHERE a.id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Article::try_from).transpose()
    }

    /// 草稿视为不存在
    pub async fn get_published_article(&self, id: &str) -> anyhow::Result<Option<Article>> {
        Ok(self
            .get_article(id)
            .await?
            .filter(|a| a.status == ArticleStatus::Published))
    }

    pub async fn list_all_articles(&self) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, SqlArticle>(&format!(
            "SELECT {} FROM articles a ORDER BY a.created_at DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        into_articles(rows)
    }

    pub async fn insert_article(&self, a: &Article) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles (
                id, title, content, excerpt, status, category_tags,
                created_at, updated_at, published_at, view_count, like_count,
                search_title, search_content
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&a.id)
        .bind(&a.title)
        .bind(&a.content)
        .bind(&a.excerpt)
        .bind(a.status.as_str())
        .bind(serde_json::to_string(&a.category_tags)?)
        .bind(a.created_at)
        .bind(a.updated_at)
        .bind(a.published_at)
        .bind(a.view_count)
        .bind(a.like_count)
        .bind(fold_case(&a.title))
        .bind(fold_case(&a.content))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 返回 false 表示文章不存在
    /// 公开读写（评论线程、点赞）只面向已发布的文章
    pub async fn is_published(&self, id: &str) -> anyhow::Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM articles WHERE id = ? AND status = 'published'")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    pub async fn update_article_status(
        &self,
        id: &str,
        status: ArticleStatus,
        published_at: Option<NaiveDateTime>,
        updated_at: NaiveDateTime,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE articles SET status = ?, published_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(published_at)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 评论与点赞随文章级联删除
    pub async fn delete_article(&self, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 原子自增，不做先读后写
    pub async fn increment_view_count(&self, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn article_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> anyhow::Result<ArticleStats> {
        let (total_articles, published_articles, published_this_month, total_views, total_likes) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'published' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'published'
                                       AND published_at >= ?
                                       AND published_at < ? THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(view_count), 0),
                    COALESCE(SUM(like_count), 0)
                FROM articles
                "#,
            )
            .bind(month_start)
            .bind(next_month_start)
            .fetch_one(&self.pool)
            .await?;

        Ok(ArticleStats {
            total_articles,
            published_articles,
            published_this_month,
            total_views,
            total_likes,
        })
    }

    /// 公开统计：草稿不计入任何一项
    pub async fn public_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> anyhow::Result<PublicStats> {
        let (total_articles, total_views, published_this_month) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(view_count), 0),
                    COALESCE(SUM(CASE WHEN published_at >= ?
                                       AND published_at < ? THEN 1 ELSE 0 END), 0)
                FROM articles
                WHERE status = 'published'
                "#,
            )
            .bind(month_start)
            .bind(next_month_start)
            .fetch_one(&self.pool)
            .await?;

        Ok(PublicStats {
            total_articles,
            total_views,
            published_this_month,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{article, memory_db, ts};
    use chrono::NaiveDate;
    use domain::{ArticleQuery, ArticleStatus, FilterState, SortKey};

    #[tokio::test]
    async fn listing_hides_drafts_and_counts_matches() {
        let db = memory_db().await;
        db.insert_article(&article("p1", Some(ts(2024, 6, 1, 9, 0, 0))))
            .await
            .unwrap();
        db.insert_article(&article("p2", Some(ts(2024, 6, 2, 9, 0, 0))))
            .await
            .unwrap();
        db.insert_article(&article("d1", None)).await.unwrap();

        let q = ArticleQuery::plan(&FilterState::default(), 1, 9);
        let rows = db.query_articles(&q).await.unwrap();

        assert_eq!(rows.total_count, 2);
        let ids: Vec<_> = rows.items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[tokio::test]
    async fn pagination_windows_the_result_but_not_the_count() {
        let db = memory_db().await;
        for day in 1..=10 {
            db.insert_article(&article(&format!("a{:02}", day), Some(ts(2024, 6, day, 9, 0, 0))))
                .await
                .unwrap();
        }

        let q = ArticleQuery::plan(&FilterState::default(), 2, 9);
        let rows = db.query_articles(&q).await.unwrap();
        assert_eq!(rows.total_count, 10);
        assert_eq!(rows.items.len(), 1);
        assert_eq!(rows.items[0].id, "a01");
    }

    #[tokio::test]
    async fn search_category_and_sort_combine() {
        let db = memory_db().await;

        let mut ts_react = article("ts-react", Some(ts(2024, 6, 1, 9, 0, 0)));
        ts_react.title = "TypeScript with React".into();
        ts_react.category_tags = vec!["react".into()];
        ts_react.like_count = 3;

        let mut ts_popular = article("ts-popular", Some(ts(2024, 6, 2, 9, 0, 0)));
        ts_popular.content = "all about typescript generics".into();
        ts_popular.category_tags = vec!["frontend".into(), "react".into()];
        ts_popular.like_count = 10;

        let mut ts_vue = article("ts-vue", Some(ts(2024, 6, 3, 9, 0, 0)));
        ts_vue.title = "TypeScript with Vue".into();
        ts_vue.category_tags = vec!["vue".into()];

        let mut rust_react = article("rust-react", Some(ts(2024, 6, 4, 9, 0, 0)));
        rust_react.category_tags = vec!["react".into()];

        for a in [&ts_react, &ts_popular, &ts_vue, &rust_react] {
            db.insert_article(a).await.unwrap();
        }

        let filters = FilterState {
            search_term: "typescript".into(),
            categories: vec!["react".into()],
            sort: SortKey::MostLiked,
            ..Default::default()
        };
        let rows = db
            .query_articles(&ArticleQuery::plan(&filters, 1, 9))
            .await
            .unwrap();

        let ids: Vec<_> = rows.items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["ts-popular", "ts-react"]);
        assert_eq!(rows.total_count, 2);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let db = memory_db().await;
        let mut a = article("pct", Some(ts(2024, 6, 1, 9, 0, 0)));
        a.title = "100% Rust".into();
        db.insert_article(&a).await.unwrap();
        db.insert_article(&article("other", Some(ts(2024, 6, 2, 9, 0, 0))))
            .await
            .unwrap();

        let filters = FilterState {
            search_term: "%".into(),
            ..Default::default()
        };
        let rows = db
            .query_articles(&ArticleQuery::plan(&filters, 1, 9))
            .await
            .unwrap();
        assert_eq!(rows.total_count, 1);
        assert_eq!(rows.items[0].id, "pct");
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let db = memory_db().await;
        let mut cafe = article("cafe", Some(ts(2024, 6, 1, 9, 0, 0)));
        cafe.title = "Café tour".into();
        let mut greek = article("greek", Some(ts(2024, 6, 2, 9, 0, 0)));
        greek.content = "Notes from ΑΘΗΝΑ".into();
        for a in [&cafe, &greek] {
            db.insert_article(a).await.unwrap();
        }

        for (term, expected) in [("CAFÉ", "cafe"), ("αθηνα", "greek")] {
            let filters = FilterState {
                search_term: term.into(),
                ..Default::default()
            };
            let query = ArticleQuery::plan(&filters, 1, 9);
            let rows = db.query_articles(&query).await.unwrap();
            assert_eq!(rows.total_count, 1, "search {:?}", term);
            assert_eq!(rows.items[0].id, expected);
            // SQL 与内存匹配结果一致
            assert!(query.matches(&rows.items[0]));
        }
    }

    #[tokio::test]
    async fn date_range_end_covers_the_whole_day() {
        let db = memory_db().await;
        db.insert_article(&article("in", Some(ts(2024, 6, 30, 23, 59, 0))))
            .await
            .unwrap();
        db.insert_article(&article("out", Some(ts(2024, 7, 1, 0, 0, 1))))
            .await
            .unwrap();
        db.insert_article(&article("early", Some(ts(2024, 5, 31, 23, 59, 59))))
            .await
            .unwrap();

        let filters = FilterState {
            date_from: NaiveDate::from_ymd_opt(2024, 6, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 6, 30),
            ..Default::default()
        };
        let rows = db
            .query_articles(&ArticleQuery::plan(&filters, 1, 9))
            .await
            .unwrap();

        let ids: Vec<_> = rows.items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["in"]);
    }

    #[tokio::test]
    async fn status_update_and_view_increment() {
        let db = memory_db().await;
        db.insert_article(&article("a", None)).await.unwrap();
        assert!(db.get_published_article("a").await.unwrap().is_none());

        let when = ts(2024, 6, 1, 9, 0, 0);
        assert!(db
            .update_article_status("a", ArticleStatus::Published, Some(when), when)
            .await
            .unwrap());
        assert!(db.increment_view_count("a").await.unwrap());
        assert!(db.increment_view_count("a").await.unwrap());

        let a = db.get_published_article("a").await.unwrap().unwrap();
        assert_eq!(a.published_at, Some(when));
        assert_eq!(a.view_count, 2);

        assert!(!db.increment_view_count("missing").await.unwrap());
        assert!(!db
            .update_article_status("missing", ArticleStatus::Draft, None, when)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn stats_aggregate_over_all_articles() {
        let db = memory_db().await;
        let mut a = article("june", Some(ts(2024, 6, 10, 9, 0, 0)));
        a.view_count = 5;
        a.like_count = 2;
        let mut b = article("may", Some(ts(2024, 5, 10, 9, 0, 0)));
        b.view_count = 1;
        db.insert_article(&a).await.unwrap();
        db.insert_article(&b).await.unwrap();
        db.insert_article(&article("draft", None)).await.unwrap();

        let stats = db
            .article_stats(ts(2024, 6, 1, 0, 0, 0), ts(2024, 7, 1, 0, 0, 0))
            .await
            .unwrap();
        assert_eq!(stats.total_articles, 3);
        assert_eq!(stats.published_articles, 2);
        assert_eq!(stats.published_this_month, 1);
        assert_eq!(stats.total_views, 6);
        assert_eq!(stats.total_likes, 2);
    }

    #[tokio::test]
    async fn public_stats_ignore_drafts() {
        let db = memory_db().await;
        let mut live = article("live", Some(ts(2024, 6, 10, 9, 0, 0)));
        live.view_count = 4;
        // 曾在本月发布后又撤回的草稿
        let mut pulled = article("pulled", Some(ts(2024, 6, 12, 9, 0, 0)));
        pulled.status = ArticleStatus::Draft;
        pulled.view_count = 100;
        db.insert_article(&live).await.unwrap();
        db.insert_article(&pulled).await.unwrap();
        db.insert_article(&article("draft", None)).await.unwrap();

        let stats = db
            .public_stats(ts(2024, 6, 1, 0, 0, 0), ts(2024, 7, 1, 0, 0, 0))
            .await
            .unwrap();
        assert_eq!(stats.total_articles, 1);
        assert_eq!(stats.total_views, 4);
        assert_eq!(stats.published_this_month, 1);
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let db = memory_db().await;
        db.insert_article(&article("a", None)).await.unwrap();
        assert!(db.delete_article("a").await.unwrap());
        assert!(!db.delete_article("a").await.unwrap());
        assert!(db.list_all_articles().await.unwrap().is_empty());
    }
}
