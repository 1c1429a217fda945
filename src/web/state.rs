//! # Estado da Aplicação Web
//!
//! Estado compartilhado entre todos os handlers Axum. Tudo aqui é
//! **imutável após a inicialização** — `Arc`s clonados por requisição,
//! sem locks: o pipeline não guarda estado entre requisições e o
//! diretório de apps é somente-leitura.

use std::sync::Arc;

use crate::gateway::Completion;
use crate::nlu::IntentPipeline;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline de classificação/extração — o núcleo do assistente.
    pub pipeline: Arc<IntentPipeline>,
    /// Gateway de completion, usado direto pelas rotas de análise.
    pub gateway: Arc<dyn Completion>,
}
