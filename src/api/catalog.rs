//! Catalog endpoints: products, categories, artisan profiles.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::AppState,
    domain::{Artisan, Category, Product},
    MarketError,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub artisan: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub async fn list_products(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>, MarketError> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE status = 'active'
         AND ($3::uuid IS NULL OR category_id = $3)
         AND ($4::uuid IS NULL OR artisan_id = $4)
         ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .bind(p.category)
    .bind(p.artisan)
    .fetch_all(&s.db)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE status = 'active'
         AND ($1::uuid IS NULL OR category_id = $1)
         AND ($2::uuid IS NULL OR artisan_id = $2)",
    )
    .bind(p.category)
    .bind(p.artisan)
    .fetch_one(&s.db)
    .await?;

    Ok(Json(PaginatedResponse { data: products, total: total.0, page }))
}

pub async fn get_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, MarketError> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(MarketError::ProductNotFound)
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub artisan_id: Option<Uuid>,
    pub stock: Option<Decimal>,
    pub unit: Option<String>,
}

pub async fn create_product(
    State(s): State<AppState>,
    Json(r): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), MarketError> {
    let sku = format!("SKU-{:08}", rand::random::<u32>());
    let p = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, sku, name, description, price, currency, category_id, artisan_id, stock, unit, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, 'EUR', $6, $7, $8, $9, 'active', NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&sku)
    .bind(&r.name)
    .bind(&r.description)
    .bind(r.price)
    .bind(r.category_id)
    .bind(r.artisan_id)
    .bind(r.stock.unwrap_or(Decimal::ZERO))
    .bind(r.unit.as_deref().unwrap_or("piece"))
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(p)))
}

pub async fn update_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CreateProductRequest>,
) -> Result<Json<Product>, MarketError> {
    let p = sqlx::query_as::<_, Product>(
        "UPDATE products SET name = $2, description = $3, price = $4, category_id = $5, artisan_id = $6, stock = $7, unit = $8, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.description)
    .bind(r.price)
    .bind(r.category_id)
    .bind(r.artisan_id)
    .bind(r.stock.unwrap_or(Decimal::ZERO))
    .bind(r.unit.as_deref().unwrap_or("piece"))
    .fetch_optional(&s.db)
    .await?
    .ok_or(MarketError::ProductNotFound)?;
    Ok(Json(p))
}

pub async fn delete_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketError> {
    sqlx::query("UPDATE products SET status = 'deleted', updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(
    State(s): State<AppState>,
) -> Result<Json<Vec<Category>>, MarketError> {
    let cats = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&s.db)
        .await?;
    Ok(Json(cats))
}

pub async fn get_category(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, MarketError> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(MarketError::CategoryNotFound)
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

pub async fn create_category(
    State(s): State<AppState>,
    Json(r): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), MarketError> {
    let slug = r.name.to_lowercase().replace(' ', "-");
    let c = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, description, parent_id, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(&slug)
    .bind(&r.description)
    .bind(r.parent_id)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(c)))
}

pub async fn list_artisans(State(s): State<AppState>) -> Result<Json<Vec<Artisan>>, MarketError> {
    let artisans = sqlx::query_as::<_, Artisan>("SELECT * FROM artisans ORDER BY name")
        .fetch_all(&s.db)
        .await?;
    Ok(Json(artisans))
}

pub async fn get_artisan(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Artisan>, MarketError> {
    sqlx::query_as::<_, Artisan>("SELECT * FROM artisans WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(MarketError::ArtisanNotFound)
}

#[derive(Debug, Deserialize)]
pub struct CreateArtisanRequest {
    pub name: String,
    pub bio: Option<String>,
    pub region: Option<String>,
}

pub async fn create_artisan(
    State(s): State<AppState>,
    Json(r): Json<CreateArtisanRequest>,
) -> Result<(StatusCode, Json<Artisan>), MarketError> {
    let slug = r.name.to_lowercase().replace(' ', "-");
    let a = sqlx::query_as::<_, Artisan>(
        "INSERT INTO artisans (id, name, slug, bio, region, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(&slug)
    .bind(&r.bio)
    .bind(&r.region)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(a)))
}
