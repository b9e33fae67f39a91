use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,

    /// Directory holding the pre-built frontend bundle.
    pub static_dir: String,

    /// Origins allowed by the CORS middleware.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://hrms.db".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "dist/public".to_string()),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
        }
    }
}

/// Local dev frontends plus the deployed one.
const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,http://localhost:3000,https://hrms-drab-alpha.vercel.app";

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origins_include_the_deployed_frontend() {
        let origins = parse_origins(DEFAULT_CORS_ORIGINS);
        assert_eq!(origins, [
            "http://localhost:5173",
            "http://localhost:3000",
            "https://hrms-drab-alpha.vercel.app"
        ]);
    }

    #[test]
    fn origin_lists_tolerate_whitespace_and_trailing_commas() {
        let origins = parse_origins(" http://a.test , http://b.test ,");
        assert_eq!(origins, ["http://a.test", "http://b.test"]);
    }
}
