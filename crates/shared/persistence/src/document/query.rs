//! Query options and aggregation-pipeline assembly for the document store.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use mongodb::bson::{doc, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

use common::{AppError, AppResult};

/// A record stored in one collection of the document store.
pub trait DocumentEntity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Collection the records live in
    const COLLECTION: &'static str;
    /// Top-level field names accepted by filters, sorts and updates
    const FIELDS: &'static [&'static str];

    fn has_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

/// A field name checked against `T::FIELDS`.
pub struct Field<T> {
    name: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

impl<T: DocumentEntity> Field<T> {
    pub fn parse(name: &str) -> AppResult<Self> {
        T::FIELDS
            .iter()
            .find(|field| **field == name)
            .map(|field| Self {
                name: field,
                _entity: PhantomData,
            })
            .ok_or_else(|| {
                AppError::validation(format!("unknown field `{}` on {}", name, T::COLLECTION))
            })
    }
}

impl<T> Field<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_bson(self) -> Bson {
        match self {
            SortDirection::Asc => Bson::Int32(1),
            SortDirection::Desc => Bson::Int32(-1),
        }
    }
}

/// Accumulated query-shaping directives for one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryConfig {
    pub filter: Document,
    pub sort: Option<Document>,
    /// Zero means unlimited
    pub limit: i64,
    pub skip: u64,
    pub lookups: Vec<Document>,
    /// Field name and raw keyword
    pub search: Option<(String, String)>,
}

impl QueryConfig {
    pub fn compose<T>(options: &[DocumentOption<T>]) -> Self {
        options
            .iter()
            .fold(Self::default(), |config, option| option.apply(config))
    }

    /// Search and lookups need the aggregation path.
    pub fn uses_pipeline(&self) -> bool {
        self.search.is_some() || !self.lookups.is_empty()
    }

    /// Decide how the config is executed.
    pub fn plan(self) -> QueryPlan {
        if self.uses_pipeline() {
            QueryPlan::Aggregate {
                pipeline: self.pipeline(),
                count: self.count_pipeline(),
            }
        } else {
            QueryPlan::Find(self)
        }
    }

    /// search, lookups, filter, sort, skip, limit
    pub fn pipeline(&self) -> Vec<Document> {
        let mut stages = self.matching_stages();
        if self.skip > 0 {
            stages.push(doc! { "$skip": self.skip as i64 });
        }
        if self.limit > 0 {
            stages.push(doc! { "$limit": self.limit });
        }
        stages
    }

    /// search, lookups, filter, sort, then a terminal `$count` into `total`.
    pub fn count_pipeline(&self) -> Vec<Document> {
        let mut stages = self.matching_stages();
        stages.push(doc! { "$count": "total" });
        stages
    }

    fn matching_stages(&self) -> Vec<Document> {
        let mut stages = Vec::with_capacity(self.lookups.len() + 5);

        if let Some((field, keyword)) = &self.search {
            let mut matcher = Document::new();
            matcher.insert(
                field.clone(),
                doc! { "$regex": regex::escape(keyword), "$options": "i" },
            );
            stages.push(doc! { "$match": matcher });
        }

        stages.extend(self.lookups.iter().cloned());

        if !self.filter.is_empty() {
            stages.push(doc! { "$match": self.filter.clone() });
        }

        if let Some(sort) = self.sort.as_ref().filter(|sort| !sort.is_empty()) {
            stages.push(doc! { "$sort": sort.clone() });
        }

        stages
    }
}

/// Execution path chosen for a composed [`QueryConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// `find` with filter/sort/skip/limit, counted with `count_documents`
    Find(QueryConfig),
    /// Aggregation pipeline, counted with its own count pipeline
    Aggregate {
        pipeline: Vec<Document>,
        count: Vec<Document>,
    },
}

/// A reusable transformation of a [`QueryConfig`] for records of type `T`.
pub struct DocumentOption<T> {
    apply: Arc<dyn Fn(QueryConfig) -> QueryConfig + Send + Sync>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for DocumentOption<T> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DocumentOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DocumentOption")
    }
}

impl<T> DocumentOption<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(QueryConfig) -> QueryConfig + Send + Sync + 'static,
    {
        Self {
            apply: Arc::new(f),
            _entity: PhantomData,
        }
    }

    pub fn noop() -> Self {
        Self::new(|config| config)
    }

    pub fn apply(&self, config: QueryConfig) -> QueryConfig {
        (self.apply)(config)
    }
}

/// First field name in `filter` that `T` does not declare.
///
/// Operator keys are skipped, except that the clauses of `$and`, `$or` and
/// `$nor` are checked too. Dotted paths are checked by their root.
pub fn undeclared_field<T: DocumentEntity>(filter: &Document) -> Option<String> {
    for (key, value) in filter {
        if matches!(key.as_str(), "$and" | "$or" | "$nor") {
            if let Bson::Array(clauses) = value {
                let nested = clauses.iter().find_map(|clause| match clause {
                    Bson::Document(clause) => undeclared_field::<T>(clause),
                    _ => None,
                });
                if nested.is_some() {
                    return nested;
                }
            }
            continue;
        }
        if key.starts_with('$') || key == "_id" {
            continue;
        }
        let root = key.split('.').next().unwrap_or_default();
        if !T::has_field(root) {
            return Some(key.clone());
        }
    }
    None
}

/// Replace the whole filter. An empty document is ignored. Fails when the
/// filter names a field `T` does not declare.
pub fn with_filter<T: DocumentEntity>(filter: Document) -> AppResult<DocumentOption<T>> {
    if let Some(field) = undeclared_field::<T>(&filter) {
        return Err(AppError::validation(format!(
            "unknown field `{}` on {}",
            field,
            T::COLLECTION
        )));
    }
    if filter.is_empty() {
        return Ok(DocumentOption::noop());
    }
    Ok(DocumentOption::new(move |mut config| {
        config.filter = filter.clone();
        config
    }))
}

/// `field == value`, skipped when `value` is `None`.
pub fn with_equal<T>(field: Field<T>, value: Option<impl Into<Bson>>) -> DocumentOption<T> {
    let Some(value) = value.map(Into::into) else {
        return DocumentOption::noop();
    };
    let name = field.name();
    DocumentOption::new(move |mut config| {
        config.filter.insert(name, value.clone());
        config
    })
}

/// `from <= field <= to`, skipped unless both bounds are present.
pub fn with_between<T>(
    field: Field<T>,
    from: Option<impl Into<Bson>>,
    to: Option<impl Into<Bson>>,
) -> DocumentOption<T> {
    let (Some(from), Some(to)) = (from.map(Into::into), to.map(Into::into)) else {
        return DocumentOption::noop();
    };
    let name = field.name();
    DocumentOption::new(move |mut config| {
        config
            .filter
            .insert(name, doc! { "$gte": from.clone(), "$lte": to.clone() });
        config
    })
}

/// Multi-key sort in the given sequence. Replaces any earlier sort.
pub fn with_sort<T>(keys: Vec<(Field<T>, SortDirection)>) -> DocumentOption<T> {
    if keys.is_empty() {
        return DocumentOption::noop();
    }
    let mut sort = Document::new();
    for (field, direction) in keys {
        sort.insert(field.name(), direction.as_bson());
    }
    DocumentOption::new(move |mut config| {
        config.sort = Some(sort.clone());
        config
    })
}

pub fn with_limit<T>(limit: i64) -> DocumentOption<T> {
    DocumentOption::new(move |mut config| {
        config.limit = limit.max(0);
        config
    })
}

pub fn with_skip<T>(skip: u64) -> DocumentOption<T> {
    DocumentOption::new(move |mut config| {
        config.skip = skip;
        config
    })
}

/// Case-insensitive substring match on `field`. Blank keywords are ignored.
pub fn with_search<T>(field: Field<T>, keyword: impl Into<String>) -> DocumentOption<T> {
    let keyword = keyword.into().trim().to_string();
    if keyword.is_empty() {
        return DocumentOption::noop();
    }
    let name = field.name();
    DocumentOption::new(move |mut config| {
        config.search = Some((name.to_string(), keyword.clone()));
        config
    })
}

/// Append a raw `$lookup` stage. Lookups accumulate in call order.
pub fn with_lookup<T>(stage: Document) -> DocumentOption<T> {
    DocumentOption::new(move |mut config| {
        config.lookups.push(stage.clone());
        config
    })
}

/// Build a `$lookup` stage joining `from` on `local_field == foreign_field`.
pub fn lookup(from: &str, local_field: &str, foreign_field: &str, as_field: &str) -> Document {
    doc! {
        "$lookup": {
            "from": from,
            "localField": local_field,
            "foreignField": foreign_field,
            "as": as_field,
        }
    }
}
