//! Generic document-store repository.
//!
//! Plain filter/sort/skip/limit queries run as a `find` plus a
//! `count_documents`. Anything with a search or a lookup goes through an
//! aggregation pipeline, counted with a separately built count pipeline.

use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Collection, Database};

use common::{AppError, AppResult, OptionExt};

use super::query::{
    undeclared_field, with_limit, with_skip, DocumentEntity, DocumentOption, QueryConfig, QueryPlan,
};
use crate::pagination::{coerce, offset, PaginatedResult};

/// CRUD and pagination over the collection of `T`.
pub struct DocumentRepository<T: DocumentEntity> {
    collection: Collection<T>,
}

impl<T: DocumentEntity> Clone for DocumentRepository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
        }
    }
}

impl<T: DocumentEntity> DocumentRepository<T> {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<T>(T::COLLECTION),
        }
    }

    pub fn from_collection(collection: Collection<T>) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert one record and return its generated `_id`.
    pub async fn create(&self, entity: &T) -> AppResult<Bson> {
        Ok(self.collection.insert_one(entity).await?.inserted_id)
    }

    /// Insert all records in one round trip. Returns the number inserted.
    pub async fn create_bulk(&self, entities: &[T]) -> AppResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }
        Ok(self
            .collection
            .insert_many(entities)
            .await?
            .inserted_ids
            .len())
    }

    /// `$set` `fields` on the first match. Returns the matched count.
    pub async fn update_one(&self, filter: Document, fields: Document) -> AppResult<u64> {
        guard_filter::<T>(&filter)?;
        guard_fields::<T>(&fields)?;
        let result = self
            .collection
            .update_one(filter, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count)
    }

    /// `$set` `fields` on every match. Returns the matched count.
    pub async fn update_many(&self, filter: Document, fields: Document) -> AppResult<u64> {
        guard_filter::<T>(&filter)?;
        guard_fields::<T>(&fields)?;
        let result = self
            .collection
            .update_many(filter, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count)
    }

    pub async fn delete_one(&self, filter: Document) -> AppResult<u64> {
        guard_filter::<T>(&filter)?;
        Ok(self.collection.delete_one(filter).await?.deleted_count)
    }

    pub async fn delete_many(&self, filter: Document) -> AppResult<u64> {
        guard_filter::<T>(&filter)?;
        Ok(self.collection.delete_many(filter).await?.deleted_count)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn find_one(&self, filter: Document) -> AppResult<T> {
        guard_declared::<T>(&filter)?;
        self.collection.find_one(filter).await?.ok_or_not_found()
    }

    pub async fn count(&self, filter: Document) -> AppResult<u64> {
        guard_declared::<T>(&filter)?;
        Ok(self.collection.count_documents(filter).await?)
    }

    /// How [`find_many`](Self::find_many) would run `options`.
    pub fn plan(&self, options: &[DocumentOption<T>]) -> QueryPlan {
        QueryConfig::compose(options).plan()
    }

    /// Matching records plus the total ignoring skip and limit.
    pub async fn find_many(&self, options: &[DocumentOption<T>]) -> AppResult<(Vec<T>, u64)> {
        match self.plan(options) {
            QueryPlan::Find(config) => self.find(&config).await,
            QueryPlan::Aggregate { pipeline, count } => self.aggregate(pipeline, count).await,
        }
    }

    /// One page of matches. Non-positive `page`/`page_size` become 1 and 10.
    pub async fn find_with_pagination(
        &self,
        page: i64,
        page_size: i64,
        options: &[DocumentOption<T>],
    ) -> AppResult<PaginatedResult<T>> {
        let (page, size) = coerce(page, page_size);

        let mut options = options.to_vec();
        options.push(with_skip(offset(page, size)));
        options.push(with_limit(size as i64));

        let (data, total) = self.find_many(&options).await?;
        Ok(PaginatedResult::new(data, total, page as i64, size as i64))
    }

    async fn find(&self, config: &QueryConfig) -> AppResult<(Vec<T>, u64)> {
        let mut find = self.collection.find(config.filter.clone());
        if let Some(sort) = &config.sort {
            find = find.sort(sort.clone());
        }
        if config.skip > 0 {
            find = find.skip(config.skip);
        }
        if config.limit > 0 {
            find = find.limit(config.limit);
        }
        let records: Vec<T> = find.await?.try_collect().await?;

        let total = self
            .collection
            .count_documents(config.filter.clone())
            .await?;
        Ok((records, total))
    }

    async fn aggregate(
        &self,
        pipeline: Vec<Document>,
        count: Vec<Document>,
    ) -> AppResult<(Vec<T>, u64)> {
        let documents: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;
        let records = documents
            .into_iter()
            .map(bson::from_document::<T>)
            .collect::<Result<Vec<_>, _>>()?;

        let mut counted = self.collection.aggregate(count).await?;
        let total = match counted.try_next().await? {
            Some(row) => count_total(&row),
            None => 0,
        };

        tracing::debug!(
            collection = T::COLLECTION,
            returned = records.len(),
            total,
            "aggregation pipeline executed"
        );
        Ok((records, total))
    }
}

/// `$count` yields Int32 or Int64 depending on magnitude.
fn count_total(row: &Document) -> u64 {
    match row.get("total") {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        _ => 0,
    }
}

fn guard_filter<T: DocumentEntity>(filter: &Document) -> AppResult<()> {
    if filter.is_empty() {
        return Err(AppError::guard("refusing to write without a filter"));
    }
    guard_declared::<T>(filter)
}

fn guard_declared<T: DocumentEntity>(filter: &Document) -> AppResult<()> {
    match undeclared_field::<T>(filter) {
        Some(field) => Err(AppError::guard(format!(
            "`{}` is not a field of {}",
            field,
            T::COLLECTION
        ))),
        None => Ok(()),
    }
}

fn guard_fields<T: DocumentEntity>(fields: &Document) -> AppResult<()> {
    if fields.is_empty() {
        return Err(AppError::guard("no fields to update"));
    }
    let unknown = fields.keys().find(|key| {
        let root = key.split('.').next().unwrap_or_default();
        !T::has_field(root)
    });
    match unknown {
        Some(key) => Err(AppError::guard(format!(
            "`{}` is not a field of {}",
            key,
            T::COLLECTION
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::query::{lookup, with_lookup};
    use mongodb::Client;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Visit {
        patient: String,
        total: i64,
    }

    impl DocumentEntity for Visit {
        const COLLECTION: &'static str = "visits";
        const FIELDS: &'static [&'static str] = &["patient", "total"];
    }

    // The client connects lazily, so guarded calls never touch the network.
    async fn repository() -> DocumentRepository<Visit> {
        let client = Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .unwrap();
        DocumentRepository::new(&client.database("guard_test"))
    }

    #[test]
    fn test_count_total_accepts_both_widths() {
        assert_eq!(count_total(&doc! { "total": 7_i32 }), 7);
        assert_eq!(count_total(&doc! { "total": 9_000_000_000_i64 }), 9_000_000_000);
        assert_eq!(count_total(&doc! { "total": -1_i32 }), 0);
        assert_eq!(count_total(&doc! {}), 0);
    }

    #[test]
    fn test_guard_fields() {
        assert!(guard_fields::<Visit>(&doc! { "patient": "x" }).is_ok());
        assert!(guard_fields::<Visit>(&doc! { "total.amount": 1 }).is_ok());
        assert!(matches!(
            guard_fields::<Visit>(&doc! {}),
            Err(AppError::Guard(_))
        ));
        assert!(matches!(
            guard_fields::<Visit>(&doc! { "role": "admin" }),
            Err(AppError::Guard(_))
        ));
    }

    #[tokio::test]
    async fn test_mutations_refuse_empty_filter() {
        let repo = repository().await;

        let update = repo.update_one(doc! {}, doc! { "patient": "x" }).await;
        assert!(matches!(update, Err(AppError::Guard(_))));

        let update = repo.update_many(doc! {}, doc! { "patient": "x" }).await;
        assert!(matches!(update, Err(AppError::Guard(_))));

        assert!(matches!(repo.delete_one(doc! {}).await, Err(AppError::Guard(_))));
        assert!(matches!(repo.delete_many(doc! {}).await, Err(AppError::Guard(_))));
    }

    #[tokio::test]
    async fn test_update_refuses_undeclared_field() {
        let repo = repository().await;
        let result = repo
            .update_many(doc! { "patient": "x" }, doc! { "password": "hunter2" })
            .await;
        assert!(matches!(result, Err(AppError::Guard(_))));
    }

    #[tokio::test]
    async fn test_filters_naming_undeclared_fields_are_refused() {
        let repo = repository().await;

        let update = repo
            .update_many(doc! { "role": "admin" }, doc! { "patient": "x" })
            .await;
        assert!(matches!(update, Err(AppError::Guard(_))));

        let delete = repo
            .delete_one(doc! { "$or": [ { "patient": "x" }, { "secret": 1 } ] })
            .await;
        assert!(matches!(delete, Err(AppError::Guard(_))));

        assert!(matches!(
            repo.find_one(doc! { "owner": "x" }).await,
            Err(AppError::Guard(_))
        ));
        assert!(matches!(
            repo.count(doc! { "owner": "x" }).await,
            Err(AppError::Guard(_))
        ));
    }

    #[tokio::test]
    async fn test_find_many_routes_lookups_through_count_pipeline() {
        let repo = repository().await;
        let options = [
            with_lookup::<Visit>(lookup("branches", "branch_id", "id", "branch")),
            with_skip(20),
            with_limit(10),
        ];

        let QueryPlan::Aggregate { pipeline, count } = repo.plan(&options) else {
            panic!("lookup should use the aggregation pipeline");
        };
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            count,
            vec![
                lookup("branches", "branch_id", "id", "branch"),
                doc! { "$count": "total" },
            ]
        );

        let plain = [with_limit::<Visit>(10)];
        assert!(matches!(repo.plan(&plain), QueryPlan::Find(_)));
    }

    #[tokio::test]
    async fn test_empty_bulk_insert_is_noop() {
        let repo = repository().await;
        assert_eq!(repo.create_bulk(&[]).await.unwrap(), 0);
    }
}
