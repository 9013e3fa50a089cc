use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::selection::selector::SelectionLimits;

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding: EmbeddingConfig,
    pub render: RenderConfig,
    pub limits: SelectionLimits,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// `None` disables embeddings; ranking then uses keyword scoring only.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub timeout_secs: u64,
    pub primary_compiler: String,
    pub fallback_compiler: String,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub cleanup_temp: bool,
    pub template_path: PathBuf,
    pub cover_letter_template_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let string_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let api_key = var("EMBEDDING_API_KEY").or_else(|| var("OPENAI_API_KEY"));

        Ok(Config {
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: string_or("RUST_LOG", "info"),
            embedding: EmbeddingConfig {
                api_key,
                model: string_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
                endpoint: string_or("EMBEDDING_ENDPOINT", DEFAULT_EMBEDDING_ENDPOINT),
                timeout_secs: parse_or(&var, "EMBEDDING_TIMEOUT_SECS", 30)?,
            },
            render: RenderConfig {
                timeout_secs: parse_or(&var, "LATEX_TIMEOUT_SECS", 30)?,
                primary_compiler: string_or("LATEX_PRIMARY_COMPILER", "pdflatex"),
                fallback_compiler: string_or("LATEX_FALLBACK_COMPILER", "xelatex"),
                output_dir: string_or("PDF_OUTPUT_DIR", "./generated-pdfs").into(),
                temp_dir: string_or("LATEX_TEMP_DIR", "./temp-latex").into(),
                cleanup_temp: parse_bool_or(&var, "LATEX_CLEANUP_TEMP", true)?,
                template_path: string_or("RESUME_TEMPLATE_PATH", "templates/resume_template.tex")
                    .into(),
                cover_letter_template_path: string_or(
                    "COVER_LETTER_TEMPLATE_PATH",
                    "templates/cover_letter_template.tex",
                )
                .into(),
            },
            limits: SelectionLimits {
                max_experiences: parse_or(&var, "MAX_EXPERIENCES", 3)?,
                max_projects: parse_or(&var, "MAX_PROJECTS", 3)?,
            },
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bool_or(var: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match var(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("Environment variable '{key}' must be a boolean, got '{v}'"),
        },
    }
}
