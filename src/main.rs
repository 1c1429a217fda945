#![allow(dead_code)]
//! # Assistente IA — Backend do Assistente Pessoal
//!
//! **Ponto de entrada principal** do backend do assistente de desktop.
//!
//! O serviço recebe cada mensagem do usuário (texto ou voz já
//! transcrita), pede uma resposta ao modelo de linguagem hospedado,
//! classifica a intenção em duas camadas (palavras-chave → modelo) e
//! devolve `{response, action, parameters}` para o frontend despachar
//! a ação de SO correspondente (abrir app/site, screenshot, volume,
//! janelas, música).
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG)
//!   ├── Carrega catálogo de apps (ou degrada para vazio)
//!   ├── Constrói o gateway Groq (GROQ_API_KEY)
//!   ├── Monta IntentPipeline + AppState + Router
//!   └── Serve em 0.0.0.0:{PORT|3001}
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! GROQ_API_KEY=... cargo run
//!
//! # Executar com logs detalhados
//! RUST_LOG=debug GROQ_API_KEY=... cargo run
//!
//! curl -s localhost:3001/api/ai/process \
//!   -H 'content-type: application/json' \
//!   -d '{"message": "tirar screenshot da janela ativa", "context": ""}'
//! ```

/// Módulo `config` — catálogo estático de aplicativos conhecidos.
mod config;

/// Módulo `gateway` — cliente da API de completion (trait + Groq).
mod gateway;

/// Módulo `nlu` — pipeline de classificação de intenção e extração.
mod nlu;

/// Módulo `web` — servidor axum, rotas e estado compartilhado.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppDirectory;
use crate::gateway::{Completion, GroqGateway};
use crate::nlu::IntentPipeline;
use crate::web::state::AppState;

/// Porta default quando a variável `PORT` não está definida.
const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> Result<()> {
    // Aceita a variável de ambiente RUST_LOG para configurar o nível.
    // Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🤖 Assistente IA — Starting...");

    // Catálogo de apps: somente-leitura após o load; falha degrada para
    // vazio em vez de derrubar o processo.
    let apps = Arc::new(AppDirectory::load(config::APPS_CONFIG_PATH));
    tracing::info!(apps = apps.len(), "Catálogo de aplicativos carregado");

    let gateway: Arc<dyn Completion> =
        Arc::new(GroqGateway::from_env().context("Falha ao construir o gateway de completion")?);

    let pipeline = Arc::new(IntentPipeline::new(gateway.clone(), apps));
    let state = AppState { pipeline, gateway };

    let app = web::create_router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao fazer bind em {addr}"))?;
    tracing::info!("🚀 API disponível em http://localhost:{port}/api");

    axum::serve(listener, app).await?;

    Ok(())
}
