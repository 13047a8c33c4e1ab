use sqlx::PgPool;

use crate::models::catalog::{Combo, Product};

pub async fn products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY price")
        .fetch_all(pool)
        .await
}

pub async fn combos(pool: &PgPool) -> Result<Vec<Combo>, sqlx::Error> {
    sqlx::query_as::<_, Combo>("SELECT * FROM combos ORDER BY price")
        .fetch_all(pool)
        .await
}
