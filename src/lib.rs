// Oxidized Summarizer - upload a document, get a summary back as PDF, DOCX or TXT

pub mod config;
pub mod export;    // Summary rendering (txt, docx, pdf)
pub mod extract;   // Text extraction from uploads
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod summarizer;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
