use sqlx::{postgres::PgPoolOptions, PgPool};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id    BIGSERIAL PRIMARY KEY,
    name  TEXT NOT NULL,
    email TEXT NOT NULL,
    cpf   TEXT NOT NULL
)
"#;

const CREATE_CPF_INDEX: &str = "CREATE INDEX IF NOT EXISTS users_cpf_idx ON users (cpf)";

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query(CREATE_USERS_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_CPF_INDEX).execute(&pool).await?;

        Ok(Self { pool })
    }
}
