//! Catalog models.

use serde::{Deserialize, Serialize};

use super::{amount, CategoryId, FavoriteId, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "amount::deserialize")]
    pub price: f64,
    /// Category reference as sent by the service (id or name).
    pub category: Option<serde_json::Value>,
    pub category_name: Option<String>,
    pub stock: i64,
    pub sold: i64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub image2: Option<String>,
    pub image3: Option<String>,
    /// Best image to show in listings.
    pub display_image: Option<String>,
    pub is_active: bool,
    pub in_stock: bool,
    #[serde(deserialize_with = "amount::deserialize_opt")]
    pub average_rating: Option<f64>,
    pub total_reviews: i64,
}

impl Product {
    /// Whether the product can be added to a cart.
    pub fn is_available(&self) -> bool {
        self.in_stock || self.stock > 0
    }

    /// Image for listings, falling back to the primary image.
    pub fn thumbnail(&self) -> Option<&str> {
        self.display_image
            .as_deref()
            .or(self.image.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

/// A product category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Category {
    /// Human readable label.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Admin dashboard catalog statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductStats {
    pub total_products: i64,
    pub total_stock: i64,
    pub total_sold: i64,
    pub out_of_stock: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An image attached to a product form.
#[derive(Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Admin create/update form, sent as multipart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub stock: String,
    pub size: String,
    pub color: String,
    pub material: String,
    pub brand: String,
    pub image: Option<ImageUpload>,
    pub image2: Option<ImageUpload>,
    pub image3: Option<ImageUpload>,
}

impl ProductForm {
    /// Non-empty text fields in submission order.
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
            ("price", self.price.as_str()),
            ("category", self.category.as_str()),
            ("stock", self.stock.as_str()),
            ("size", self.size.as_str()),
            ("color", self.color.as_str()),
            ("material", self.material.as_str()),
            ("brand", self.brand.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }

    /// Attached images with their form field names.
    pub fn images(&self) -> Vec<(&'static str, &ImageUpload)> {
        [
            ("image", self.image.as_ref()),
            ("image2", self.image2.as_ref()),
            ("image3", self.image3.as_ref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|img| (k, img)))
        .collect()
    }

    /// Prefill a form from an existing product for editing. Images are not resent.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product
                .category
                .as_ref()
                .map(|c| match c {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            size: product.size.clone().unwrap_or_default(),
            color: product.color.clone().unwrap_or_default(),
            material: product.material.clone().unwrap_or_default(),
            brand: product.brand.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// An entry in the favorites list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    #[serde(default)]
    pub product_details: Product,
}

/// Whether a product is in the favorites list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteStatus {
    #[serde(default)]
    pub is_favorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_decimal_string_price() {
        let product: Product = serde_json::from_value(json!({
            "id": 5,
            "name": "Linen Shirt",
            "price": "1299.50",
            "stock": 3,
            "average_rating": "4.5",
            "category_name": "Shirts"
        }))
        .unwrap();

        assert_eq!(product.id, ProductId(5));
        assert_eq!(product.price, 1299.5);
        assert_eq!(product.average_rating, Some(4.5));
        assert!(product.is_available());
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<Product> = serde_json::from_value(json!({"results": []})).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_form_skips_empty_fields() {
        let form = ProductForm {
            name: "Cap".into(),
            price: "10".into(),
            image2: Some(ImageUpload {
                file_name: "cap.png".into(),
                bytes: vec![1, 2, 3],
            }),
            ..Default::default()
        };

        assert_eq!(form.text_fields(), vec![("name", "Cap"), ("price", "10")]);
        let images = form.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].0, "image2");
    }
}
