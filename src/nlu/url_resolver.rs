//! # Resolvedor de URL — Intenção de Abrir Site
//!
//! Para a intenção `open_website`, o serviço faz uma **segunda** chamada
//! ao modelo com um prompt diferente, pedindo a URL literal do site (ou
//! uma URL de busca quando a mensagem tem termos de pesquisa). O
//! contrato com o modelo é estrito: uma URL absoluta ou o token
//! `NOT_FOUND`, nada mais.
//!
//! ## Cadeia de Fallback
//!
//! ```text
//! 1. modelo → URL absoluta válida?        → usa
//! 2. mensagem contém http(s)://… literal? → usa
//! 3. default: página inicial de busca (google)
//! ```
//!
//! Resposta malformada nunca chega ao chamador: se o texto do modelo não
//! parsear como URL absoluta, o resultado é `None` e a cadeia continua.
//! Erro de transporte idem — falha suave, logada, jamais propagada.

use regex::Regex;
use reqwest::Url;

use super::prompts;
use crate::gateway::{ChatTurn, Completion, CompletionRequest, CHAT_MODEL};

/// Token que o modelo devolve quando não reconhece o site.
const NOT_FOUND: &str = "NOT_FOUND";

/// URL usada quando nenhuma estratégia encontra um destino.
const DEFAULT_SEARCH_URL: &str = "https://www.google.com";

/// Nome de site do default de busca.
const DEFAULT_SEARCH_NAME: &str = "google";

/// URL resolvida com o host derivado para exibição.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub site_name: String,
}

/// Resolvedor de URL via modelo, com fallback determinístico.
pub struct UrlResolver {
    /// URL http(s) literal dentro da mensagem.
    http_re: Regex,
}

impl UrlResolver {
    pub fn new() -> Self {
        Self {
            http_re: Regex::new(r"(?i)(https?://\S+)").unwrap(),
        }
    }

    /// Pergunta ao modelo a URL do site mencionado na mensagem.
    ///
    /// Retorna `None` quando o modelo responde `NOT_FOUND`, quando a
    /// resposta não parseia como URL absoluta, ou quando a chamada
    /// falha — todos tratados como "não encontrado", nunca como erro.
    pub async fn resolve(
        &self,
        gateway: &dyn Completion,
        message: &str,
        context: &str,
    ) -> Option<ResolvedUrl> {
        let request = CompletionRequest {
            system: None,
            turns: vec![ChatTurn::user(prompts::url_prompt(message, context))],
            model: CHAT_MODEL,
            temperature: 0.1,
            max_tokens: 200,
        };

        let reply = match gateway.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Falha ao resolver URL via modelo");
                return None;
            }
        };

        let reply = reply.trim();
        if reply == NOT_FOUND {
            return None;
        }

        let parsed = match Url::parse(reply) {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::debug!(reply = %reply, "Resposta do modelo não é URL válida");
                return None;
            }
        };

        Some(ResolvedUrl {
            url: reply.to_string(),
            site_name: parsed.host_str().unwrap_or_default().to_string(),
        })
    }

    /// Cadeia completa: modelo → URL literal na mensagem → default de busca.
    ///
    /// Sempre produz um resultado — o frontend recebe `url` e `siteName`
    /// para toda intenção de abrir site, ainda que degradados.
    pub async fn resolve_with_fallback(
        &self,
        gateway: &dyn Completion,
        message: &str,
        context: &str,
    ) -> ResolvedUrl {
        if let Some(resolved) = self.resolve(gateway, message, context).await {
            return resolved;
        }

        if let Some(cap) = self.http_re.captures(message) {
            let raw = cap[1].to_string();
            if let Ok(parsed) = Url::parse(&raw) {
                return ResolvedUrl {
                    site_name: parsed.host_str().unwrap_or_default().to_string(),
                    url: raw,
                };
            }
        }

        ResolvedUrl {
            url: DEFAULT_SEARCH_URL.to_string(),
            site_name: DEFAULT_SEARCH_NAME.to_string(),
        }
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::new()
    }
}
