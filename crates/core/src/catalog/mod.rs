pub mod normalize;

pub use normalize::{normalize_product, normalize_products, PLACEHOLDER_DESCRIPTION};

use crate::domain::product::{Product, ProductId};

/// Products whose name contains `term`, ignoring case. An empty term keeps everything.
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.to_lowercase();
    products.iter().filter(|product| product.name.to_lowercase().contains(&needle)).collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn search(&self, term: &str) -> Vec<&Product> {
        filter_products(&self.products, term)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_products, Catalog};
    use crate::domain::product::{Price, Product, ProductId};

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::default(),
            image_url: String::new(),
            description: String::new(),
            additional_images: Vec::new(),
            details: Vec::new(),
            specifications: Vec::new(),
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("p1", "Silver Ring"),
            product("p2", "Rose Gold Watch"),
            product("p3", "Pearl Bracelet"),
            product("p4", "RING box"),
        ]
    }

    #[test]
    fn empty_term_returns_full_list() {
        let products = sample();
        assert_eq!(filter_products(&products, "").len(), products.len());
    }

    #[test]
    fn filter_is_case_insensitive_substring_match() {
        let products = sample();
        let ids: Vec<&str> =
            filter_products(&products, "rInG").iter().map(|product| product.id.as_str()).collect();

        assert_eq!(ids, vec!["p1", "p4"]);
    }

    #[test]
    fn filter_matches_exactly_the_expected_subset_for_every_term() {
        let products = sample();
        for term in ["", "r", "watch", "gold w", "x", "PEARL", " "] {
            let expected: Vec<&str> = products
                .iter()
                .filter(|product| product.name.to_lowercase().contains(&term.to_lowercase()))
                .map(|product| product.id.as_str())
                .collect();
            let actual: Vec<&str> =
                filter_products(&products, term).iter().map(|product| product.id.as_str()).collect();
            assert_eq!(actual, expected, "term `{term}`");
        }
    }

    #[test]
    fn catalog_finds_products_by_id() {
        let catalog = Catalog::new(sample());

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.find(&ProductId::new("p3")).map(|p| p.name.as_str()), Some("Pearl Bracelet"));
        assert!(catalog.find(&ProductId::new("missing")).is_none());
        assert_eq!(catalog.search("watch").len(), 1);
    }
}
