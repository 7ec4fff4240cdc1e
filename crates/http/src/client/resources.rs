//! Business resources exposed by the upstream API

use super::{ClientError, SessionClient};
use serde_json::Value;

/// Upstream collections this front-end works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    ProductionOrders,
    Parts,
    Clients,
    Users,
    Activities,
}

impl Resource {
    /// Collection path relative to the API root
    pub fn collection_path(&self) -> &'static str {
        match self {
            Self::ProductionOrders => "ops/",
            Self::Parts => "pecas/",
            Self::Clients => "clientes/",
            Self::Users => "usuarios/",
            Self::Activities => "atividades/",
        }
    }

    /// Path of a single item
    pub fn item_path(&self, id: impl std::fmt::Display) -> String {
        format!("{}{id}/", self.collection_path())
    }
}

/// Items of a collection response
///
/// The upstream answers either with a bare array or with a paginated object
/// carrying `results`; anything else is treated as an empty collection.
pub fn collection_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

impl SessionClient<'_> {
    pub async fn list(&self, resource: Resource) -> Result<Vec<Value>, ClientError> {
        self.get(resource.collection_path())
            .await
            .map(collection_items)
    }

    pub async fn fetch(
        &self,
        resource: Resource,
        id: impl std::fmt::Display,
    ) -> Result<Value, ClientError> {
        self.get(&resource.item_path(id)).await
    }

    pub async fn create(&self, resource: Resource, body: Value) -> Result<Value, ClientError> {
        self.post(resource.collection_path(), body).await
    }

    pub async fn replace(
        &self,
        resource: Resource,
        id: impl std::fmt::Display,
        body: Value,
    ) -> Result<Value, ClientError> {
        self.put(&resource.item_path(id), body).await
    }

    pub async fn update(
        &self,
        resource: Resource,
        id: impl std::fmt::Display,
        body: Value,
    ) -> Result<Value, ClientError> {
        self.patch(&resource.item_path(id), body).await
    }

    pub async fn remove(
        &self,
        resource: Resource,
        id: impl std::fmt::Display,
    ) -> Result<(), ClientError> {
        self.delete(&resource.item_path(id)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_items_accepts_both_shapes() {
        assert_eq!(collection_items(json!([{"id": 1}])).len(), 1);
        assert_eq!(
            collection_items(json!({"count": 2, "results": [{"id": 1}, {"id": 2}]})).len(),
            2
        );
        assert!(collection_items(json!({"detail": "nothing"})).is_empty());
        assert!(collection_items(Value::Null).is_empty());
    }

    #[test]
    fn test_item_path() {
        assert_eq!(Resource::Parts.item_path(12), "pecas/12/");
        assert_eq!(Resource::ProductionOrders.collection_path(), "ops/");
    }
}
