use std::time::Duration;

use async_trait::async_trait;
use diesel::{
    dsl::count_star,
    pg::Pg,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_async::{
    AsyncPgConnection, RunQueryDsl,
    pooled_connection::{AsyncDieselConnectionManager, deadpool::Pool},
};
use uuid::Uuid;

use crate::{
    categories::models::{Category, CategoryDraft, CategoryRow, NewCategory},
    posts::models::{NewPost, Post, PostComment, PostDraft, PostRow, ReplacePost},
    schema::{categories, posts},
};

use super::{PostPage, PostQuery, Store, StoreError};

pub type DieselPool = Pool<AsyncPgConnection>;

pub struct PgStore {
    pool: DieselPool,
}

impl PgStore {
    pub fn connect(database_url: &str) -> eyre::Result<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .max_size(10)
            .wait_timeout(Some(Duration::from_secs(10)))
            .create_timeout(Some(Duration::from_secs(10)))
            .runtime(deadpool_runtime::Runtime::Tokio1)
            .build()?;

        Ok(PgStore { pool })
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Escapes LIKE wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn filtered_posts(search: Option<&str>) -> posts::BoxedQuery<'static, Pg> {
    let mut query = posts::table.into_boxed();
    if let Some(term) = search {
        let pattern = like_pattern(term);
        query = query.filter(
            posts::title
                .ilike(pattern.clone())
                .or(posts::content.ilike(pattern)),
        );
    }
    query
}

/// The unique index on `slug` is the last line of defense against two
/// concurrent writes passing the slug pre-check.
fn slug_conflict(slug: &str) -> impl FnOnce(DieselError) -> StoreError + '_ {
    move |e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreError::DuplicateSlug(slug.to_string())
        }
        e => StoreError::Database(e),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, StoreError> {
        let mut conn = self.pool.get().await?;
        let search = query.search.as_deref();

        let total: i64 = filtered_posts(search)
            .select(count_star())
            .get_result(&mut conn)
            .await?;

        let mut rows_query = filtered_posts(search)
            .order(posts::created_at.desc())
            .select(PostRow::as_select());
        if let Some(window) = query.window {
            rows_query = rows_query.offset(window.offset).limit(window.limit);
        }

        let rows: Vec<PostRow> = rows_query.load(&mut conn).await?;
        let posts = rows
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PostPage { posts, total })
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = posts::table
            .find(id)
            .select(PostRow::as_select())
            .first::<PostRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Post::try_from).transpose()?)
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;

        let mut query = posts::table
            .filter(posts::slug.eq(slug))
            .select(posts::id)
            .into_boxed();
        if let Some(id) = except {
            query = query.filter(posts::id.ne(id));
        }

        let found = query.first::<Uuid>(&mut conn).await.optional()?;
        Ok(found.is_some())
    }

    async fn insert_post(&self, draft: PostDraft) -> Result<Post, StoreError> {
        let mut conn = self.pool.get().await?;
        let slug = draft.slug.clone();
        let new_post = NewPost::from_draft(Uuid::new_v4(), draft, now())?;

        let row = diesel::insert_into(posts::table)
            .values(&new_post)
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(&mut conn)
            .await
            .map_err(slug_conflict(&slug))?;

        Ok(Post::try_from(row)?)
    }

    async fn replace_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, StoreError> {
        let mut conn = self.pool.get().await?;
        let slug = draft.slug.clone();
        let changes = ReplacePost::from_draft(draft, now())?;

        let row = diesel::update(posts::table.find(id))
            .set(&changes)
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(&mut conn)
            .await
            .optional()
            .map_err(slug_conflict(&slug))?;

        Ok(row.map(Post::try_from).transpose()?)
    }

    async fn delete_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = diesel::delete(posts::table.find(id))
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Post::try_from).transpose()?)
    }

    async fn push_comment(
        &self,
        id: Uuid,
        comment: PostComment,
    ) -> Result<Option<PostComment>, StoreError> {
        let mut conn = self.pool.get().await?;
        let appended = serde_json::to_value([&comment])?;

        // `comments || '[...]'` appends in place, no read-modify-write
        let updated = diesel::update(posts::table.find(id))
            .set(posts::comments.eq(PgJsonbExpressionMethods::concat(
                posts::comments,
                appended,
            )))
            .execute(&mut conn)
            .await?;

        Ok((updated > 0).then_some(comment))
    }

    async fn insert_category(&self, draft: CategoryDraft) -> Result<Category, StoreError> {
        let mut conn = self.pool.get().await?;
        let new_category = NewCategory::from(draft.into_category(Uuid::new_v4(), now()));

        let row = diesel::insert_into(categories::table)
            .values(&new_category)
            .returning(CategoryRow::as_returning())
            .get_result::<CategoryRow>(&mut conn)
            .await?;

        Ok(Category::from(row))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows = categories::table
            .order(categories::created_at.asc())
            .select(CategoryRow::as_select())
            .load::<CategoryRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;

        diesel::delete(categories::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}
