use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Registered account
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to serialize in API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// One persisted message of a conversation
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog product
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub features: Option<String>,
    pub price: f64,
    pub quantity: i32,
}

impl Product {
    /// Text that gets embedded into the vector index for this product
    #[must_use]
    pub fn document_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.brand,
            self.features.as_deref().unwrap_or_default()
        )
    }
}

/// Product payload for inserts and seed files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub features: Option<String>,
    pub price: f64,
    pub quantity: i32,
}

/// Filters for listing products
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_text_includes_all_fields() {
        let product = Product {
            id: 1,
            name: "Wireless Sensor".to_string(),
            brand: "Acme".to_string(),
            features: Some("long battery life".to_string()),
            price: 19.99,
            quantity: 3,
        };

        assert_eq!(product.document_text(), "Wireless Sensor Acme long battery life");
    }

    #[test]
    fn test_document_text_without_features() {
        let product = Product {
            id: 2,
            name: "Thermostat".to_string(),
            brand: "Acme".to_string(),
            features: None,
            price: 49.0,
            quantity: 1,
        };

        assert_eq!(product.document_text(), "Thermostat Acme ");
    }

    #[test]
    fn test_user_info_drops_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "secret".to_string(),
            name: None,
            role: "user".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let info = UserInfo::from(user.clone());
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("secret"));
        assert_eq!(info.email, user.email);
    }
}
