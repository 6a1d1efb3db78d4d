//! PostgreSQL post repository.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, Condition, DbConn, DbErr, EntityTrait, Order, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use quill_core::domain::{Post, PostFilter, SortField, SortOrder};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn query_error(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(err) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

fn write_error(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Post already exists".to_string())
    } else {
        query_error(e)
    }
}

fn sort_column(field: SortField) -> post::Column {
    match field {
        SortField::CreatedAt => post::Column::CreatedAt,
        SortField::UpdatedAt => post::Column::UpdatedAt,
        SortField::Title => post::Column::Title,
        SortField::Author => post::Column::Author,
    }
}

/// Escape LIKE wildcards so user input is matched literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `lower(title) LIKE p OR lower(content) LIKE p OR lower(author) LIKE p`
fn search_condition(text: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
    [
        post::Column::Title,
        post::Column::Content,
        post::Column::Author,
    ]
    .into_iter()
    .fold(Condition::any(), |condition, column| {
        condition.add(
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = entity.into();
        let model = active_model.insert(&self.db).await.map_err(write_error)?;
        tracing::debug!(post_id = %model.id, "Post inserted");

        Ok(model.into())
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = entity.into();
        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            other => write_error(other),
        })?;
        tracing::debug!(post_id = %model.id, "Post updated");

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(text) = filter.search_text() {
            select = select.filter(search_condition(text));
        }

        let order = match filter.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let column = sort_column(filter.sort);
        if matches!(filter.sort, SortField::Title | SortField::Author) {
            let folded = SimpleExpr::from(Func::lower(Expr::col(column)));
            select = select.order_by(folded, order.clone());
        }

        let result = select
            .order_by(column, order)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
