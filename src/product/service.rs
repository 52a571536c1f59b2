use crate::framework::RequestContext;
use crate::model::{
    PaginationQuery, Product, ProductCreate, ProductId, ProductListResponse, ProductSortField,
    ProductUpdate, SortDirection,
};
use crate::product::ProductError;
use crate::store::Store;
use async_trait::async_trait;
use std::cmp::Ordering;
use tracing::{info, instrument};

/// Product read path consumed by the order service.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_product_by_id(&self, ctx: &RequestContext, id: ProductId) -> Result<Product, ProductError>;
}

/// Catalog management: product CRUD and listing.
#[derive(Clone)]
pub struct ProductService {
    store: Store,
}

impl ProductService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_product(&self, ctx: &RequestContext, params: ProductCreate) -> Result<Product, ProductError> {
        validate_name(&params.name)?;
        validate_price(params.price)?;
        validate_stock(params.stock)?;

        let product = self
            .store
            .transact(ctx, "create_product", move |uow| {
                let now = uow.now();
                Ok::<_, ProductError>(uow.products().insert_with(|id| Product {
                    id,
                    name: params.name.trim().to_string(),
                    price: params.price,
                    stock: params.stock,
                    created_at: now,
                    updated_at: now,
                }))
            })
            .await?;
        info!(product_id = %product.id, stock = product.stock, "Product created");
        Ok(product)
    }

    pub async fn get_product_by_id(&self, ctx: &RequestContext, id: ProductId) -> Result<Product, ProductError> {
        self.store
            .read(ctx, "get_product", move |tables| tables.products.get(id).cloned())
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_product(
        &self,
        ctx: &RequestContext,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
        }
        if let Some(stock) = update.stock {
            validate_stock(stock)?;
        }

        self.store
            .transact(ctx, "update_product", move |uow| {
                let mut product = uow.products().get(id).ok_or(ProductError::NotFound(id))?;
                if let Some(name) = update.name {
                    product.name = name.trim().to_string();
                }
                if let Some(price) = update.price {
                    product.price = price;
                }
                if let Some(stock) = update.stock {
                    product.stock = stock;
                }
                product.updated_at = uow.now();
                uow.products().put(product.clone());
                Ok(product)
            })
            .await
    }

    /// Deletes a product that no order refers to.
    #[instrument(skip(self, ctx))]
    pub async fn delete_product(&self, ctx: &RequestContext, id: ProductId) -> Result<(), ProductError> {
        self.store
            .transact(ctx, "delete_product", move |uow| {
                if uow.products().get(id).is_none() {
                    return Err(ProductError::NotFound(id));
                }
                if !uow.order_items().filter(|item| item.product_id == id).is_empty() {
                    return Err(ProductError::InUse(id));
                }
                uow.products().delete(id);
                Ok(())
            })
            .await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    pub async fn get_all_products_with_query(
        &self,
        ctx: &RequestContext,
        query: &PaginationQuery,
    ) -> Result<ProductListResponse, ProductError> {
        let field: ProductSortField = query.sort_field();
        let direction = query.direction();
        let (offset, limit) = (query.offset(), query.limit());

        let (data, total) = self
            .store
            .read(ctx, "list_products", move |tables| {
                let mut products: Vec<Product> = tables.products.iter().cloned().collect();
                products.sort_by(|a, b| {
                    let ordering = compare_products(a, b, field);
                    match direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                });
                let total = products.len() as u64;
                let page = products.into_iter().skip(offset).take(limit).collect::<Vec<_>>();
                (page, total)
            })
            .await?;

        Ok(ProductListResponse {
            data,
            pagination: query.metadata(total),
        })
    }
}

#[async_trait]
impl ProductCatalog for ProductService {
    async fn get_product_by_id(&self, ctx: &RequestContext, id: ProductId) -> Result<Product, ProductError> {
        ProductService::get_product_by_id(self, ctx, id).await
    }
}

fn compare_products(a: &Product, b: &Product, field: ProductSortField) -> Ordering {
    let primary = match field {
        ProductSortField::Id => Ordering::Equal,
        ProductSortField::Name => a.name.cmp(&b.name),
        ProductSortField::Price => a.price.cmp(&b.price),
        ProductSortField::Stock => a.stock.cmp(&b.stock),
        ProductSortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn validate_name(name: &str) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::Validation("name is required".into()));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), ProductError> {
    if price <= 0 {
        return Err(ProductError::Validation(format!("price must be positive, got {price}")));
    }
    Ok(())
}

fn validate_stock(stock: i64) -> Result<(), ProductError> {
    if stock < 0 {
        return Err(ProductError::Validation(format!("stock cannot be negative, got {stock}")));
    }
    Ok(())
}
