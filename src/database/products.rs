//! Product catalog and vector index queries

use pgvector::Vector;

use super::Database;
use crate::models::NewProduct;
use crate::models::Product;
use crate::models::ProductQuery;
use crate::Result;

/// One row returned by the vector index, joined with catalog fields
///
/// `score` is the cosine distance to the query embedding; lower is closer.
#[derive(Debug, Clone)]
pub struct ProductMatch {
    pub product_id: i32,
    pub document: String,
    pub score: f32,
    pub price: f64,
    pub quantity: i32,
}

impl Database {
    /// Insert a product into the catalog
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let created = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (name, brand, features, price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, brand, features, price, quantity
            ",
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.features)
        .bind(product.price)
        .bind(product.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// List products with filters
    pub async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>> {
        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);

        let products = if query.brand.is_some()
            || query.min_price.is_some()
            || query.max_price.is_some()
        {
            let mut conditions = vec!["1=1".to_string()];
            let mut param_idx = 1;

            if query.brand.is_some() {
                conditions.push(format!("brand ILIKE ${param_idx}"));
                param_idx += 1;
            }
            if query.min_price.is_some() {
                conditions.push(format!("price >= ${param_idx}"));
                param_idx += 1;
            }
            if query.max_price.is_some() {
                conditions.push(format!("price <= ${param_idx}"));
            }

            let where_clause = conditions.join(" AND ");
            let sql = format!(
                "SELECT id, name, brand, features, price, quantity FROM products \
                 WHERE {where_clause} ORDER BY id LIMIT {limit} OFFSET {offset}"
            );

            let mut q = sqlx::query_as::<_, Product>(&sql);

            if let Some(brand) = &query.brand {
                q = q.bind(format!("%{brand}%"));
            }
            if let Some(min_price) = query.min_price {
                q = q.bind(min_price);
            }
            if let Some(max_price) = query.max_price {
                q = q.bind(max_price);
            }

            q.fetch_all(&self.pool).await?
        } else {
            sqlx::query_as::<_, Product>(
                "SELECT id, name, brand, features, price, quantity FROM products \
                 ORDER BY id LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(products)
    }

    /// Substring search over name, brand and features
    pub async fn search_products(&self, term: &str, limit: i64) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, brand, features, price, quantity
            FROM products
            WHERE name ILIKE $1 OR brand ILIKE $1 OR features ILIKE $1
            ORDER BY id
            LIMIT $2
            ",
        )
        .bind(format!("%{term}%"))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Get a single product by id
    pub async fn get_product(&self, id: i32) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, brand, features, price, quantity FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// List distinct brands, alphabetically
    pub async fn list_brands(&self) -> Result<Vec<String>> {
        let brands = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT brand FROM products WHERE brand <> '' ORDER BY brand",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(brands)
    }

    /// List the whole catalog, ordered by id
    pub async fn all_products(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, brand, features, price, quantity FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// List products that have no embedding yet
    pub async fn products_missing_embeddings(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT p.id, p.name, p.brand, p.features, p.price, p.quantity
            FROM products p
            LEFT JOIN product_embeddings pe ON pe.product_id = p.id
            WHERE pe.product_id IS NULL
            ORDER BY p.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Count products in the catalog
    pub async fn count_products(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Store or refresh the embedding for one product document
    pub async fn upsert_product_embedding(
        &self,
        product_id: i32,
        document: &str,
        embedding: Vec<f32>,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO product_embeddings (product_id, document, embedding)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id)
            DO UPDATE SET document = $2, embedding = $3, updated_at = NOW()
            ",
        )
        .bind(product_id)
        .bind(document)
        .bind(Vector::from(embedding))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count products that have an embedding
    pub async fn count_product_embeddings(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product_embeddings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Nearest-neighbor search over product embeddings
    ///
    /// Results come back ordered by cosine distance, closest first.
    pub async fn similarity_search(
        &self,
        query_embedding: Vec<f32>,
        limit: i64,
    ) -> Result<Vec<ProductMatch>> {
        #[derive(sqlx::FromRow)]
        struct RawResult {
            product_id: i32,
            document: String,
            score: f64, // PostgreSQL returns FLOAT8 (f64) from distance operator
            price: f64,
            quantity: i32,
        }

        let raw_results = sqlx::query_as::<_, RawResult>(
            r"
            SELECT
                pe.product_id,
                pe.document,
                pe.embedding <=> $1::vector as score,
                p.price,
                p.quantity
            FROM product_embeddings pe
            INNER JOIN products p ON pe.product_id = p.id
            ORDER BY pe.embedding <=> $1::vector
            LIMIT $2
            ",
        )
        .bind(Vector::from(query_embedding))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let results = raw_results
            .into_iter()
            .map(|r| ProductMatch {
                product_id: r.product_id,
                document: r.document,
                score: r.score as f32,
                price: r.price,
                quantity: r.quantity,
            })
            .collect();

        Ok(results)
    }
}
