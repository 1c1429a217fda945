//! # Módulo Web — A API do Assistente
//!
//! Camada HTTP da aplicação, construída com **Axum** + **tower-http**.
//! O frontend (Electron/React) consome estas rotas e despacha as ações
//! classificadas para os colaboradores de SO.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Frontend desktop (Electron + React)                      │
//! ├──────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                                │
//! │  ├── GET  /api/health                  → liveness        │
//! │  ├── POST /api/ai/process              → intenção + parâmetros │
//! │  ├── POST /api/ai/analyze-image        → visão sobre arquivo   │
//! │  ├── POST /api/ai/analyze-image-upload → multipart (10MB)      │
//! │  ├── POST /api/ai/analyze              → sentimento/urgência   │
//! │  └── POST /api/ai/search               → query melhorada       │
//! ├──────────────────────────────────────────────────────────┤
//! │ CORS permissivo (frontend roda em origem file://)        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`handlers`] | Handlers Axum para cada rota |

pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// O upload de imagem tem limite próprio de 10MB; as demais rotas usam
/// o limite default do Axum. O estado é compartilhado entre todos os
/// handlers via extrator `State<AppState>`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Liveness ──────────────────────────────────────────
        .route("/api/health", get(handlers::health))
        // ── Núcleo: classificação de intenção ─────────────────
        .route("/api/ai/process", post(handlers::process))
        // ── Análise via modelo de visão ───────────────────────
        .route("/api/ai/analyze-image", post(handlers::analyze_image))
        .route(
            "/api/ai/analyze-image-upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        // ── Utilidades de texto ───────────────────────────────
        .route("/api/ai/analyze", post(handlers::analyze_text))
        .route("/api/ai/search", post(handlers::improve_search))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
