//! # Pipeline de Intenção — O Núcleo do Assistente
//!
//! Este módulo orquestra o processamento de cada mensagem de chat. O
//! [`IntentPipeline`] é o componente central que:
//!
//! 1. **Normaliza** o texto do usuário (Unicode NFC)
//! 2. **Pede a resposta genérica** ao gateway (sempre, uma chamada)
//! 3. **Classifica** a intenção (palavras-chave, depois modelo)
//! 4. **Extrai** os parâmetros específicos da intenção
//! 5. **Resolve a URL** quando a intenção é abrir site
//! 6. **Suprime** a resposta quando há ação específica
//!
//! ## Fluxo de Processamento
//!
//! ```text
//! {message, context}
//!   ├── 1. NFC normalize (Unicode)
//!   ├── 2. parse do contexto → turnos (máx. 10)
//!   ├── 3. completion: resposta genérica
//!   │      └── falhou? → texto de desculpas, segue o fluxo
//!   ├── 4. classify: Fase 1 (keywords) → Fase 2 (modelo)
//!   ├── 5. se open_website: resolver URL (modelo → literal → default)
//!   └── 6. política de supressão → ProcessOutcome
//! ```
//!
//! ## Concorrência
//!
//! O pipeline é imutável (`&self`) após a construção — seguro para uso
//! concorrente entre requisições. As até três chamadas externas de uma
//! requisição são **sequenciais** e bloqueiam apenas aquela requisição;
//! não há estado compartilhado mutável, retry nem cancelamento.
//!
//! ## Sub-módulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`context`] | transcrição plana → turnos role-tagged |
//! | [`intent`] | rótulos de intenção + classificador em 2 estágios |
//! | [`extractor`] | extração de parâmetros por regex/substring |
//! | [`url_resolver`] | síntese de URL para a intenção de site |
//! | [`prompts`] | templates de prompt enviados ao gateway |

pub mod context;
pub mod extractor;
pub mod intent;
pub mod prompts;
pub mod url_resolver;

use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::config::AppDirectory;
use crate::gateway::{ChatTurn, Completion, CompletionRequest, CHAT_MODEL};

use intent::{IntentClassifier, IntentLabel, ParameterRecord};
use url_resolver::UrlResolver;

/// Resultado do processamento de uma mensagem.
///
/// O handler HTTP serializa isso (mais o timestamp) de volta ao
/// frontend, que despacha a ação para o colaborador de SO apropriado.
#[derive(Clone, Debug)]
pub struct ProcessOutcome {
    /// Texto exibido ao usuário (possivelmente vazio, ver supressão).
    pub response: String,
    /// Intenção classificada — exatamente uma por requisição.
    pub action: IntentLabel,
    /// Parâmetros extraídos; toda chave é opcional.
    pub parameters: ParameterRecord,
}

/// Pipeline completo — combina classificador, extrator e resolvedor.
pub struct IntentPipeline {
    gateway: Arc<dyn Completion>,
    classifier: IntentClassifier,
    resolver: UrlResolver,
}

impl IntentPipeline {
    /// Monta o pipeline com o gateway e o diretório de apps injetados.
    pub fn new(gateway: Arc<dyn Completion>, apps: Arc<AppDirectory>) -> Self {
        Self {
            gateway,
            classifier: IntentClassifier::new(apps),
            resolver: UrlResolver::new(),
        }
    }

    /// Processa uma mensagem do usuário de ponta a ponta.
    ///
    /// Nunca retorna erro: toda falha externa degrada para
    /// `general_response` com texto genérico ou para parâmetro ausente.
    /// O chamador deve rejeitar mensagem vazia **antes** de chamar aqui.
    pub async fn process(&self, message: &str, context: &str) -> ProcessOutcome {
        // Normalização Unicode NFC — acentos representados de forma
        // consistente antes de qualquer matching
        let message: String = message.nfc().collect();

        let turns = context::bounded(context::parse_context(context));

        // ─── 1. Resposta genérica (sempre uma chamada) ───────────
        let reply = match self.gateway.complete(reply_request(&turns, &message)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Falha na resposta genérica, usando texto padrão");
                prompts::FALLBACK_REPLY.to_string()
            }
        };

        // ─── 2. Classificação em dois estágios ───────────────────
        let (action, mut parameters) = self
            .classifier
            .classify(self.gateway.as_ref(), &message, context)
            .await;

        // ─── 3. Resolução de URL (apenas para abrir site) ────────
        if action == IntentLabel::OpenWebsite {
            let resolved = self
                .resolver
                .resolve_with_fallback(self.gateway.as_ref(), &message, context)
                .await;
            tracing::debug!(url = %resolved.url, site = %resolved.site_name, "URL resolvida");
            parameters.set("url", resolved.url);
            parameters.set("siteName", resolved.site_name);
        }

        tracing::info!(action = ?action, "Mensagem processada");

        // ─── 4. Política de supressão de resposta ────────────────
        let response = suppress_reply(action, reply);

        ProcessOutcome {
            response,
            action,
            parameters,
        }
    }
}

/// Monta a requisição da resposta genérica: prompt de sistema +
/// histórico + mensagem nova.
fn reply_request(history: &[ChatTurn], message: &str) -> CompletionRequest {
    let mut turns = history.to_vec();
    turns.push(ChatTurn::user(message));
    CompletionRequest {
        system: Some(prompts::SYSTEM_PROMPT.to_string()),
        turns,
        model: CHAT_MODEL,
        temperature: 0.7,
        max_tokens: 1000,
    }
}

/// Aplica a política de supressão da resposta natural.
///
/// Intenções acionáveis descartam o texto do modelo (o frontend mostra o
/// resultado da ação, não a narrativa). As duas análises recebem uma
/// confirmação curta fixa — a narrativa real chega depois, junto com o
/// resultado da análise.
fn suppress_reply(action: IntentLabel, reply: String) -> String {
    match action {
        IntentLabel::GeneralResponse => reply,
        IntentLabel::AnalyzeImage => prompts::IMAGE_ACK.to_string(),
        IntentLabel::AnalyzeScreen => prompts::SCREEN_ACK.to_string(),
        _ => String::new(),
    }
}
