//! Product picker data

use loto_client::PosApi;
use shared::models::Product;

/// Pseudo-category that shows every product
pub const ALL_CATEGORIES: &str = "todas";

#[derive(Debug, Default, Clone)]
pub struct ProductCatalog {
    products: Vec<Product>,
    last_error: Option<String>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            last_error: None,
        }
    }

    /// Fetch the catalog; a failure leaves it empty with an error message
    pub async fn load(api: &dyn PosApi) -> Self {
        match api.list_products().await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Products loaded");
                Self::new(products)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load products");
                Self {
                    products: Vec::new(),
                    last_error: Some(format!("Could not load products: {e}")),
                }
            }
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `todas` followed by each category once, in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for category in self.products.iter().filter_map(|p| p.category.as_deref()) {
            if !categories.iter().any(|c| c == category) {
                categories.push(category.to_string());
            }
        }
        categories
    }

    pub fn filter(&self, category: &str) -> Vec<&Product> {
        if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| p.in_category(category))
            .collect()
    }

    /// Lookup by id, or by name ignoring case
    pub fn find(&self, key: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == key)
            .or_else(|| {
                let key = key.to_lowercase();
                self.products.iter().find(|p| p.name.to_lowercase() == key)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, product};

    fn catalog() -> ProductCatalog {
        ProductCatalog::new(vec![
            product("p1", "Copa Loto", 12000.0, Some("Helados")),
            product("p2", "Cafe", 4000.0, Some("Bebidas")),
            product("p3", "Malteada", 9000.0, Some("helados")),
            product("p4", "Agua", 3000.0, None),
            product("p5", "Te", 3500.0, Some("Bebidas")),
        ])
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(
            catalog().categories(),
            vec!["todas", "Helados", "Bebidas", "helados"]
        );
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let c = catalog();
        let names: Vec<&str> = c.filter("HELADOS").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Copa Loto", "Malteada"]);
        assert_eq!(c.filter("todas").len(), 5);
        assert!(c.filter("Postres").is_empty());
    }

    #[test]
    fn test_find_by_id_or_name() {
        let c = catalog();
        assert_eq!(c.find("p2").map(|p| p.price), Some(4000.0));
        assert_eq!(c.find("copa loto").map(|p| p.id.as_str()), Some("p1"));
        assert!(c.find("pizza").is_none());
    }

    #[tokio::test]
    async fn test_load_failure_is_empty_with_message() {
        let backend = FakeBackend::new();
        backend.add_product(product("p1", "Cafe", 4000.0, None));
        backend.fail_next("list_products");

        let c = ProductCatalog::load(&backend).await;
        assert!(c.products().is_empty());
        assert!(c.last_error().is_some());

        let c = ProductCatalog::load(&backend).await;
        assert_eq!(c.products().len(), 1);
        assert_eq!(c.categories(), vec!["todas"]);
    }
}
