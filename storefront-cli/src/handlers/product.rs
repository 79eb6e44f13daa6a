//! Catalog, review and favorite handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use storefront::models::{ImageUpload, ProductStats};
use storefront::{
    Category, Favorite, NewReview, Product, ProductForm, ProductId, RequestScope, Review,
    StorefrontClient,
};

use crate::output::{format_price, format_time, PlainPrint, TableRow};

/// Product summary.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInfo {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub rating: Option<f64>,
    pub reviews: i64,
    pub available: bool,
    pub active: bool,
}

impl From<&Product> for ProductInfo {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.get(),
            name: p.name.clone(),
            category: p.category_name.clone().unwrap_or_default(),
            price: p.price,
            stock: p.stock,
            rating: p.average_rating,
            reviews: p.total_reviews,
            available: p.is_available(),
            active: p.is_active,
        }
    }
}

impl TableRow for ProductInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Category", "Price", "Stock", "Rating"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            format_price(self.price),
            self.stock.to_string(),
            rating(self.rating, self.reviews),
        ]
    }
}

impl PlainPrint for ProductInfo {
    fn plain_print(&self) {
        println!(
            "[{}] {} {}",
            self.id.to_string().cyan(),
            self.name.bold(),
            format_price(self.price).green()
        );
        let stock = match (self.available, self.stock) {
            (false, _) => "out of stock".red(),
            (true, n) if n > 0 => format!("{n} in stock").normal(),
            (true, _) => "in stock".normal(),
        };
        println!(
            "   {} | {} | {}",
            self.category.dimmed(),
            stock,
            rating(self.rating, self.reviews)
        );
    }
}

fn rating(average: Option<f64>, count: i64) -> String {
    match average {
        Some(avg) if count > 0 => format!("{avg:.1}★ ({count})"),
        _ => "-".to_string(),
    }
}

/// Product page: summary plus its description and reviews.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductInfo,
    pub description: String,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub reviews: Vec<ReviewInfo>,
    pub favorite: bool,
}

impl TableRow for ProductDetail {
    fn headers() -> Vec<&'static str> {
        ProductInfo::headers()
    }
    fn row(&self) -> Vec<String> {
        self.product.row()
    }
}

impl PlainPrint for ProductDetail {
    fn plain_print(&self) {
        self.product.plain_print();
        if self.favorite {
            println!("   {}", "♥ in favorites".magenta());
        }
        if let Some(brand) = &self.brand {
            println!("   {}", brand.dimmed());
        }
        if let Some(image) = &self.image {
            println!("   {}", image.dimmed().underline());
        }
        if !self.description.is_empty() {
            println!("\n{}", self.description);
        }
        if !self.reviews.is_empty() {
            println!("\n{}", "Reviews".bold());
            for review in &self.reviews {
                review.plain_print();
            }
        }
    }
}

/// Category entry.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub id: i64,
    pub name: String,
    pub label: String,
}

impl From<&Category> for CategoryInfo {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.get(),
            name: c.name.clone(),
            label: c.label().to_string(),
        }
    }
}

impl TableRow for CategoryInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Label"]
    }
    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.label.clone()]
    }
}

impl PlainPrint for CategoryInfo {
    fn plain_print(&self) {
        println!("{} {}", self.label.bold(), format!("({})", self.name).dimmed());
    }
}

/// Review entry.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewInfo {
    pub id: i64,
    pub user: String,
    pub rating: u8,
    pub comment: String,
    pub date: String,
}

impl From<&Review> for ReviewInfo {
    fn from(r: &Review) -> Self {
        Self {
            id: r.id.get(),
            user: r.user_name.clone(),
            rating: r.rating,
            comment: r.comment.clone(),
            date: format_time(r.created_at),
        }
    }
}

impl TableRow for ReviewInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "User", "Rating", "Comment", "Date"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.user.clone(),
            self.rating.to_string(),
            self.comment.clone(),
            self.date.clone(),
        ]
    }
}

impl PlainPrint for ReviewInfo {
    fn plain_print(&self) {
        println!(
            "{} {} {}",
            "★".repeat(self.rating.into()).yellow(),
            self.user.bold(),
            self.date.dimmed()
        );
        if !self.comment.is_empty() {
            println!("   {}", self.comment);
        }
    }
}

/// Admin catalog statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsInfo {
    pub total_products: i64,
    pub total_stock: i64,
    pub total_sold: i64,
    pub out_of_stock: i64,
}

impl From<&ProductStats> for StatsInfo {
    fn from(s: &ProductStats) -> Self {
        Self {
            total_products: s.total_products,
            total_stock: s.total_stock,
            total_sold: s.total_sold,
            out_of_stock: s.out_of_stock,
        }
    }
}

impl TableRow for StatsInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Products", "Stock", "Sold", "Out of stock"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.total_products.to_string(),
            self.total_stock.to_string(),
            self.total_sold.to_string(),
            self.out_of_stock.to_string(),
        ]
    }
}

impl PlainPrint for StatsInfo {
    fn plain_print(&self) {
        println!("Products:     {}", self.total_products.to_string().bold());
        println!("Stock:        {}", self.total_stock);
        println!("Sold:         {}", self.total_sold);
        println!("Out of stock: {}", self.out_of_stock.to_string().red());
    }
}

/// One page of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResult {
    pub total: u64,
    pub has_next: bool,
    pub products: Vec<ProductInfo>,
}

pub async fn list_products(
    client: &StorefrontClient,
    category: Option<&str>,
    search: Option<&str>,
    page: Option<u32>,
) -> Result<ProductListResult> {
    let mut request = client.products().list();
    if let Some(category) = category {
        request = request.category(category);
    }
    if let Some(search) = search {
        request = request.search(search);
    }
    if let Some(page) = page {
        request = request.page(page);
    }

    let page = request.send().await?;
    Ok(ProductListResult {
        total: page.count,
        has_next: page.next.is_some(),
        products: page.results.iter().map(ProductInfo::from).collect(),
    })
}

pub async fn list_all_products(client: &StorefrontClient) -> Result<Vec<ProductInfo>> {
    let products = client.products().list_all().await?;
    Ok(products.iter().map(ProductInfo::from).collect())
}

/// Product page. Product, reviews and favorite state load concurrently.
pub async fn show_product(client: &StorefrontClient, id: ProductId) -> Result<ProductDetail> {
    let mut scope = RequestScope::new();

    let products = client.products();
    let product = scope.spawn(async move { products.get(id).await });
    let reviews = client.reviews();
    let reviews = scope.spawn(async move { reviews.list(id).await });
    let favorites = client.favorites();
    let favorite = scope.spawn(async move { favorites.check(id).await });

    let product = product.await.context("product request was cancelled")??;
    let reviews = reviews.await.context("review request was cancelled")??;
    let favorite = favorite.await.context("favorite request was cancelled")??;

    Ok(ProductDetail {
        product: ProductInfo::from(&product),
        description: product.description.clone(),
        brand: product.brand.clone(),
        image: product.thumbnail().map(str::to_owned),
        reviews: reviews.iter().map(ReviewInfo::from).collect(),
        favorite,
    })
}

pub async fn list_categories(client: &StorefrontClient) -> Result<Vec<CategoryInfo>> {
    let categories = client.categories().list().await?;
    Ok(categories.iter().map(CategoryInfo::from).collect())
}

pub async fn add_review(
    client: &StorefrontClient,
    id: ProductId,
    rating: u8,
    comment: &str,
) -> Result<ReviewInfo> {
    let review = client
        .reviews()
        .create(id, &NewReview::new(rating, comment))
        .await?;
    Ok(ReviewInfo::from(&review))
}

pub async fn delete_review(client: &StorefrontClient, id: i64) -> Result<()> {
    client.reviews().delete(id).await?;
    Ok(())
}

pub async fn list_favorites(client: &StorefrontClient) -> Result<Vec<ProductInfo>> {
    let favorites: Vec<Favorite> = client.favorites().list().await?;
    Ok(favorites
        .iter()
        .map(|f| ProductInfo::from(&f.product_details))
        .collect())
}

pub async fn add_favorite(client: &StorefrontClient, id: ProductId) -> Result<()> {
    client.favorites().add(id).await?;
    Ok(())
}

pub async fn remove_favorite(client: &StorefrontClient, id: ProductId) -> Result<()> {
    client.favorites().remove(id).await?;
    Ok(())
}

/// Flip favorite state; returns the new state.
pub async fn toggle_favorite(client: &StorefrontClient, id: ProductId) -> Result<bool> {
    Ok(client.favorites().toggle(id).await?)
}

pub async fn admin_products(client: &StorefrontClient) -> Result<Vec<ProductInfo>> {
    let products = client.products().admin_all().await?;
    Ok(products.iter().map(ProductInfo::from).collect())
}

pub async fn stats(client: &StorefrontClient) -> Result<StatsInfo> {
    let stats = client.products().stats().await?;
    Ok(StatsInfo::from(&stats))
}

/// Read an image file for upload.
pub fn load_image(path: &Path) -> Result<ImageUpload> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Image path has no file name")?;
    Ok(ImageUpload { file_name, bytes })
}

pub async fn create_product(client: &StorefrontClient, form: &ProductForm) -> Result<ProductInfo> {
    let product = client.products().create(form).await?;
    Ok(ProductInfo::from(&product))
}

/// Edit a product, starting from its current values.
pub async fn update_product<F>(
    client: &StorefrontClient,
    id: ProductId,
    edit: F,
) -> Result<ProductInfo>
where
    F: FnOnce(&mut ProductForm),
{
    let products = client.products();
    let current = products.get(id).await?;
    let mut form = ProductForm::from_product(&current);
    edit(&mut form);
    let product = products.update(id, &form).await?;
    Ok(ProductInfo::from(&product))
}

pub async fn delete_product(client: &StorefrontClient, id: ProductId) -> Result<()> {
    client.products().delete(id).await?;
    Ok(())
}
