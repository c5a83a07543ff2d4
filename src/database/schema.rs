use super::Database;
use crate::Result;

impl Database {
    /// Check if database schema is initialized
    /// Returns true if all required tables exist
    pub async fn is_schema_initialized(&self) -> Result<bool> {
        let required_tables = vec!["users", "chat_messages", "products", "product_embeddings"];

        for table_name in required_tables {
            let result = sqlx::query_scalar::<_, bool>(
                r"
                SELECT EXISTS (
                    SELECT FROM information_schema.tables
                    WHERE table_schema = 'public'
                    AND table_name = $1
                )
                ",
            )
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

            if !result {
                tracing::debug!("Missing required table: {}", table_name);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Initialize database schema
    ///
    /// `embedding_dimension` must match the dimension of the configured
    /// embedding model; the vector column is typed with it.
    pub async fn init_schema(&self, embedding_dimension: usize) -> Result<()> {
        // pgvector must be available before any VECTOR column is created
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        // Create users table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name VARCHAR(255),
                role VARCHAR(32) NOT NULL DEFAULT 'user',
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create chat_messages table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                session_id VARCHAR(255) NOT NULL,
                role VARCHAR(32) NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create products table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS products (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                brand VARCHAR(255) NOT NULL,
                features TEXT,
                price DOUBLE PRECISION NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create product_embeddings table
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS product_embeddings (
                product_id INTEGER PRIMARY KEY REFERENCES products(id) ON DELETE CASCADE,
                document TEXT NOT NULL,
                embedding VECTOR({embedding_dimension}) NOT NULL,
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            ",
        ))
        .execute(&self.pool)
        .await?;

        // Create indexes for common lookups
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_chat_messages_user_session
            ON chat_messages (user_id, session_id, created_at)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_brand ON products (brand)")
            .execute(&self.pool)
            .await?;

        tracing::info!("Database schema initialized");

        Ok(())
    }
}
