//! Product and category API.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::{ClientInner, FilePart, FormPart},
    error::{Error, Result},
    models::{Category, Page, Product, ProductForm, ProductId, ProductStats},
};

/// Upper bound on pages followed by [`ProductApi::list_all`].
const MAX_PAGES: usize = 1000;

/// API for catalog operations.
pub struct ProductApi {
    client: Arc<ClientInner>,
}

impl ProductApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// List products, one page at a time.
    pub fn list(&self) -> ProductListBuilder {
        ProductListBuilder {
            client: self.client.clone(),
            category: None,
            search: None,
            page: None,
        }
    }

    /// Fetch every product by following `next` links until exhausted.
    pub async fn list_all(&self) -> Result<Vec<Product>> {
        let mut products = Vec::new();
        let mut next = Some("products/".to_owned());
        let mut pages = 0;

        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                return Err(Error::InvalidArgument(format!(
                    "product listing exceeded {MAX_PAGES} pages"
                )));
            }
            let page: Page<Product> = self.client.get(&url).await?;
            products.extend(page.results);
            next = page.next.filter(|n| !n.is_empty());
        }

        Ok(products)
    }

    /// Get product by ID.
    pub async fn get(&self, id: impl Into<ProductId>) -> Result<Product> {
        let id = id.into();
        self.client.get(&format!("products/{id}/")).await
    }

    /// Create a product (admin).
    pub async fn create(&self, form: &ProductForm) -> Result<Product> {
        if form.name.trim().is_empty() || form.price.trim().is_empty() {
            return Err(Error::validation("Product name and price are required"));
        }
        let request = self
            .client
            .request(Method::POST, "products/create/")?
            .multipart(form_parts(form));
        self.client.call(request).await
    }

    /// Update a product (admin). Only fields set in the form are sent.
    pub async fn update(&self, id: impl Into<ProductId>, form: &ProductForm) -> Result<Product> {
        let id = id.into();
        let request = self
            .client
            .request(Method::PUT, &format!("products/update/{id}/"))?
            .multipart(form_parts(form));
        self.client.call(request).await
    }

    /// Delete a product (admin).
    pub async fn delete(&self, id: impl Into<ProductId>) -> Result<()> {
        let id = id.into();
        let request = self
            .client
            .request(Method::DELETE, &format!("products/delete/{id}/"))?;
        self.client.call_unit(request).await
    }

    /// Every product including inactive ones (admin).
    pub async fn admin_all(&self) -> Result<Vec<Product>> {
        self.client.get("products/admin/all/").await
    }

    /// Catalog statistics (admin).
    pub async fn stats(&self) -> Result<ProductStats> {
        self.client.get("products/admin/stats/").await
    }
}

fn form_parts(form: &ProductForm) -> Vec<FormPart> {
    let text = form.text_fields().into_iter().map(|(name, value)| FormPart::Text {
        name: name.to_owned(),
        value: value.to_owned(),
    });
    let files = form.images().into_iter().map(|(name, image)| {
        FormPart::File(FilePart {
            name: name.to_owned(),
            file_name: image.file_name.clone(),
            bytes: image.bytes.clone(),
        })
    });
    text.chain(files).collect()
}

/// Builder for product list requests.
pub struct ProductListBuilder {
    client: Arc<ClientInner>,
    category: Option<String>,
    search: Option<String>,
    page: Option<u32>,
}

impl ProductListBuilder {
    /// Filter by category name.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by a search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Set the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Execute the request.
    pub async fn send(self) -> Result<Page<Product>> {
        let mut request = self.client.request(Method::GET, "products/")?;
        if let Some(category) = &self.category {
            request = request.query("category", category);
        }
        if let Some(search) = &self.search {
            request = request.query("search", search);
        }
        if let Some(page) = self.page {
            request = request.query("page", page);
        }
        self.client.call(request).await
    }
}

/// API for product categories.
pub struct CategoryApi {
    client: Arc<ClientInner>,
}

impl CategoryApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// List all categories.
    pub async fn list(&self) -> Result<Vec<Category>> {
        self.client.get("products/categories/").await
    }
}
