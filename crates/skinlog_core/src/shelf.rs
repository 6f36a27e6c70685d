//! crates/skinlog_core/src/shelf.rs
//!
//! Adding and removing products. Adding goes through the classification port; a
//! failed classification leaves the shelf exactly as it was.

use tracing::{info, warn};

use crate::domain::{Product, ProductQuery};
use crate::ports::{AnalysisError, PortError, ProductClassificationService, StorageService};

#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Classifies the query and appends the resulting product to the shelf.
///
/// Returns `Ok(None)` when a manual entry is missing its brand or name; the
/// classifier is not called in that case.
pub async fn add_product(
    storage: &dyn StorageService,
    classifier: &dyn ProductClassificationService,
    query: ProductQuery,
) -> Result<Option<Product>, ShelfError> {
    if query.is_incomplete() {
        info!("Manual entry without brand or name, nothing to add");
        return Ok(None);
    }

    let analysis = classifier.classify(&query).await.map_err(|e| {
        warn!("Product classification failed: {}", e);
        e
    })?;
    let product = Product::from_analysis(analysis);

    let mut shelf = storage.load_shelf().await?;
    shelf.push(product.clone());
    storage.save_shelf(&shelf).await?;

    info!(id = %product.id, category = %product.category, "Product added to shelf");
    Ok(Some(product))
}

/// Removes a product by id. The usage history keeps its own snapshot and is untouched.
pub async fn remove_product(storage: &dyn StorageService, id: &str) -> Result<Product, ShelfError> {
    let mut shelf = storage.load_shelf().await?;
    let position = shelf
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| PortError::NotFound(format!("Product {} not found", id)))?;

    let removed = shelf.remove(position);
    storage.save_shelf(&shelf).await?;

    info!(id = %removed.id, "Product removed from shelf");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceMode, IngredientCategory, ProductAnalysis, UsageLogEntry};
    use crate::testing::{MemoryStorage, StubClassifier};
    use bytes::Bytes;
    use chrono::Utc;

    fn analysis(name: &str, category: IngredientCategory) -> ProductAnalysis {
        ProductAnalysis {
            brand: "Round Lab".to_string(),
            name: name.to_string(),
            category,
            active_ingredients: vec!["Birch Sap".to_string()],
            image_url: Some("https://images.example/p.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn added_products_keep_insertion_order() {
        let storage = MemoryStorage::default();
        let classifier =
            StubClassifier::answering(analysis("Toner", IngredientCategory::SerumWater));

        let photo = ProductQuery::Image(Bytes::from_static(b"jpg"));
        let first = add_product(&storage, &classifier, photo)
            .await
            .unwrap()
            .unwrap();
        let second = add_product(
            &storage,
            &classifier,
            ProductQuery::Manual { brand: "Round Lab".into(), name: "Toner".into() },
        )
        .await
        .unwrap()
        .unwrap();

        let shelf = storage.load_shelf().await.unwrap();
        assert_eq!(shelf, vec![first.clone(), second.clone()]);
        assert_ne!(first.id, second.id);
        assert_eq!(classifier.calls(), 2);
    }

    #[tokio::test]
    async fn blank_manual_entry_is_declined_before_classification() {
        let storage = MemoryStorage::default();
        let classifier =
            StubClassifier::answering(analysis("Toner", IngredientCategory::SerumWater));

        let added = add_product(
            &storage,
            &classifier,
            ProductQuery::Manual { brand: "".into(), name: "Toner".into() },
        )
        .await
        .unwrap();

        assert!(added.is_none());
        assert_eq!(classifier.calls(), 0);
        assert!(storage.load_shelf().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_classification_leaves_shelf_unchanged() {
        let storage = MemoryStorage::default();
        let ok = StubClassifier::answering(analysis("Cream", IngredientCategory::Moisturizer));
        add_product(&storage, &ok, ProductQuery::Image(Bytes::from_static(b"jpg")))
            .await
            .unwrap();
        let before = storage.load_shelf().await.unwrap();

        let failing = StubClassifier::failing();
        let err = add_product(&storage, &failing, ProductQuery::Image(Bytes::from_static(b"jpg")))
            .await
            .unwrap_err();

        assert!(matches!(err, ShelfError::Analysis(_)));
        assert_eq!(storage.load_shelf().await.unwrap(), before);
    }

    #[tokio::test]
    async fn removing_a_product_keeps_history() {
        let storage = MemoryStorage::default();
        let classifier =
            StubClassifier::answering(analysis("BHA", IngredientCategory::AcidExfoliant));
        let photo = ProductQuery::Image(Bytes::from_static(b"jpg"));
        let product = add_product(&storage, &classifier, photo)
            .await
            .unwrap()
            .unwrap();
        let entry = UsageLogEntry {
            date: Utc::now(),
            device_mode: DeviceMode::None,
            category_used: IngredientCategory::AcidExfoliant,
        };
        storage.append_history(&[entry.clone()]).await.unwrap();

        let removed = remove_product(&storage, &product.id).await.unwrap();

        assert_eq!(removed, product);
        assert!(storage.load_shelf().await.unwrap().is_empty());
        assert_eq!(storage.load_history().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn removing_an_unknown_product_is_not_found() {
        let storage = MemoryStorage::default();
        let err = remove_product(&storage, "missing").await.unwrap_err();
        assert!(matches!(err, ShelfError::Port(PortError::NotFound(_))));
    }
}
