//! Chainable, immutable handle over a [`DataStore`].

use crate::item::DataItem;
use crate::store::DataStore;
use datadash_core::{Error, OrderBy, Query, Record, Result, Schema};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A store plus a query over it.
///
/// Every chain method returns a new `DataSource`; the receiver keeps its own
/// query. Nothing touches the store until [`count`](Self::count),
/// [`all`](Self::all), [`get`](Self::get) or [`create`](Self::create).
///
/// ```ignore
/// let page = users
///     .search("tom")
///     .order_by("-joined")?
///     .offset(20)
///     .limit(10)
///     .all()
///     .await?;
/// ```
#[derive(Clone)]
pub struct DataSource {
    store: Arc<dyn DataStore>,
    query: Query,
}

impl DataSource {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            query: Query::new(),
        }
    }

    pub fn from_store(store: impl DataStore + 'static) -> Self {
        Self::new(Arc::new(store))
    }

    pub fn schema(&self) -> &Schema {
        self.store.schema()
    }

    pub fn lookup_field(&self) -> &str {
        self.store.lookup_field()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    fn with_query(&self, query: Query) -> Self {
        Self {
            store: Arc::clone(&self.store),
            query,
        }
    }

    /// Case-insensitive text search across every field. An empty term
    /// leaves the result unfiltered.
    pub fn search(&self, term: impl Into<String>) -> Self {
        self.with_query(self.query.search(term))
    }

    /// Exact-match filter. Replaces any earlier filter.
    pub fn filter(&self, criteria: Record) -> Result<Self> {
        for field in criteria.keys() {
            self.schema().check_field(field)?;
        }
        Ok(self.with_query(self.query.filter(criteria)))
    }

    /// Order by `"column"` (ascending) or `"-column"` (descending).
    pub fn order_by(&self, spec: &str) -> Result<Self> {
        let order = OrderBy::parse(spec).ok_or_else(|| Error::invalid_field(spec))?;
        self.ordered(order)
    }

    pub fn ordered(&self, order: OrderBy) -> Result<Self> {
        self.schema().check_field(&order.column)?;
        Ok(self.with_query(self.query.order_by(order)))
    }

    pub fn offset(&self, offset: usize) -> Self {
        self.with_query(self.query.offset(offset))
    }

    pub fn limit(&self, limit: usize) -> Self {
        self.with_query(self.query.limit(limit))
    }

    /// Rows matching the filter and search, regardless of order and window.
    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.query.unwindowed()).await
    }

    pub async fn all(&self) -> Result<Vec<DataItem>> {
        let records = self.store.fetch(&self.query).await?;
        Ok(records
            .into_iter()
            .map(|record| DataItem::new(Arc::clone(&self.store), record))
            .collect())
    }

    /// First row of the result, if any.
    pub async fn get(&self) -> Result<Option<DataItem>> {
        if self.query.limit_value() == Some(0) {
            return Ok(None);
        }
        let first = self.limit(1).all().await?;
        Ok(first.into_iter().next())
    }

    /// First row matching `criteria`.
    pub async fn get_by(&self, criteria: Record) -> Result<Option<DataItem>> {
        self.filter(criteria)?.get().await
    }

    /// The row whose lookup field equals `key`.
    pub async fn get_by_key(&self, key: Value) -> Result<Option<DataItem>> {
        let mut criteria = Record::new();
        criteria.insert(self.lookup_field().to_string(), key);
        self.get_by(criteria).await
    }

    /// Insert a row, filling absent fields from the schema defaults.
    pub async fn create(&self, fields: Record) -> Result<DataItem> {
        let record = self.schema().apply_defaults(fields)?;
        let stored = self.store.insert(record).await?;
        Ok(DataItem::new(Arc::clone(&self.store), stored))
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("store", &self.store.name())
            .field("query", &self.query)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use datadash_core::{Field, FieldDefault, FieldKind, StoreError};
    use serde_json::json;

    /// A store whose backend is always down.
    struct UnreachableStore {
        schema: Schema,
    }

    fn down() -> Error {
        StoreError::Unavailable("connection refused".into()).into()
    }

    #[async_trait]
    impl DataStore for UnreachableStore {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn schema(&self) -> &Schema {
            &self.schema
        }

        fn lookup_field(&self) -> &str {
            "pk"
        }

        async fn fetch(&self, _query: &Query) -> Result<Vec<Record>> {
            Err(down())
        }

        async fn count(&self, _query: &Query) -> Result<usize> {
            Err(down())
        }

        async fn insert(&self, _record: Record) -> Result<Record> {
            Err(down())
        }

        async fn update(&self, _key: &Value, _changes: Record) -> Result<Option<Record>> {
            Err(down())
        }

        async fn delete(&self, _key: &Value) -> Result<bool> {
            Err(down())
        }
    }

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("pk", FieldKind::Integer).read_only().auto_increment(),
            Field::new("username", FieldKind::String),
            Field::new("is_admin", FieldKind::Boolean)
                .default_value(FieldDefault::Value(json!(false))),
        ])
    }

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    async fn users() -> DataSource {
        let source = DataSource::from_store(MemoryStore::new("users", schema()));
        for (name, admin) in [
            ("alice", true),
            ("bob", false),
            ("carol", false),
            ("dave", true),
            ("erin", false),
        ] {
            source
                .create(record(json!({"username": name, "is_admin": admin})))
                .await
                .unwrap();
        }
        source
    }

    fn names(items: &[DataItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| i.get("username").and_then(|v| v.as_str()).unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_create_fills_defaults() {
        let source = DataSource::from_store(MemoryStore::new("users", schema()));
        let first = source.create(record(json!({"username": "tom"}))).await.unwrap();
        let second = source.create(record(json!({"username": "jo"}))).await.unwrap();

        assert_eq!(first.get("pk"), Some(&json!(0)));
        assert_eq!(first.get("is_admin"), Some(&json!(false)));
        assert_eq!(second.get("pk"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_natural_order_is_newest_first() {
        let all = users().await.all().await.unwrap();
        assert_eq!(names(&all), ["erin", "dave", "carol", "bob", "alice"]);
    }

    #[tokio::test]
    async fn test_chain_does_not_mutate_receiver() {
        let source = users().await;
        let narrowed = source.search("a").limit(1);

        assert_eq!(source.query(), &Query::new());
        assert_eq!(source.all().await.unwrap().len(), 5);
        assert_eq!(narrowed.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_order_by_ascending_and_descending() {
        let source = users().await;
        let asc = source.order_by("username").unwrap().all().await.unwrap();
        let desc = source.order_by("-username").unwrap().all().await.unwrap();

        assert_eq!(names(&asc), ["alice", "bob", "carol", "dave", "erin"]);
        assert_eq!(names(&desc), ["erin", "dave", "carol", "bob", "alice"]);
    }

    #[tokio::test]
    async fn test_order_by_unknown_column_is_invalid_field() {
        let source = users().await;
        assert!(matches!(
            source.order_by("password"),
            Err(Error::InvalidField { field }) if field == "password"
        ));
        assert!(matches!(source.order_by("-"), Err(Error::InvalidField { .. })));
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_field() {
        let source = users().await;
        let err = source.filter(record(json!({"password": "x"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field } if field == "password"));
    }

    #[tokio::test]
    async fn test_filter_replaces_previous_filter() {
        let source = users().await;
        let admins = source.filter(record(json!({"is_admin": true}))).unwrap();
        let bob = admins.filter(record(json!({"username": "bob"}))).unwrap();

        assert_eq!(admins.count().await.unwrap(), 2);
        assert_eq!(names(&bob.all().await.unwrap()), ["bob"]);
    }

    #[tokio::test]
    async fn test_count_ignores_window_and_order() {
        let source = users().await.search("O");
        let windowed = source.order_by("username").unwrap().offset(1).limit(1);

        assert_eq!(source.count().await.unwrap(), 2);
        assert_eq!(windowed.count().await.unwrap(), 2);
        assert_eq!(windowed.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_search_is_a_no_op() {
        let source = users().await;
        assert_eq!(source.search("").count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let source = users().await;
        assert!(source.offset(50).all().await.unwrap().is_empty());
        assert!(source.offset(50).get().await.unwrap().is_none());
        assert!(source.limit(0).get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_key() {
        let source = users().await;
        let carol = source.get_by_key(json!(2)).await.unwrap().unwrap();
        assert_eq!(carol.get("username"), Some(&json!("carol")));
        assert!(source.get_by_key(json!(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_field() {
        let source = users().await;
        let err = source
            .create(record(json!({"username": "x", "password": "y"})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
        assert_eq!(source.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_store_failures_reach_the_caller() {
        let store: Arc<dyn DataStore> = Arc::new(UnreachableStore { schema: schema() });
        let source = DataSource::new(Arc::clone(&store));
        let is_unavailable =
            |err: &Error| matches!(err, Error::Store(StoreError::Unavailable(_)));

        assert!(is_unavailable(&source.count().await.unwrap_err()));
        assert!(is_unavailable(&source.all().await.unwrap_err()));
        assert!(is_unavailable(&source.get().await.unwrap_err()));
        assert!(is_unavailable(
            &source
                .create(record(json!({"username": "tom"})))
                .await
                .unwrap_err()
        ));

        let mut item = DataItem::new(store, record(json!({"pk": 1, "username": "tom"})));
        assert!(is_unavailable(
            &item
                .update(record(json!({"username": "jo"})))
                .await
                .unwrap_err()
        ));
        assert_eq!(item.get("username"), Some(&json!("tom")));
        assert!(is_unavailable(&item.delete().await.unwrap_err()));
    }
}
