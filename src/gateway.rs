//! # Gateway LLM — Cliente da API de Completion
//!
//! Encapsula o acesso à API de chat-completion hospedada (Groq, endpoint
//! compatível com OpenAI) atrás da trait [`Completion`], injetada em todo
//! o restante do sistema.
//!
//! ## Por que uma trait?
//!
//! O classificador e o resolvedor de URL tratam o modelo como um oráculo
//! de texto: `prompt entra → texto sai`. Com a capacidade atrás de uma
//! trait, a suíte de testes roda inteira com stubs determinísticos, sem
//! rede.
//!
//! ## Semântica de Chamada
//!
//! Uma requisição, uma resposta. **Sem retry, sem streaming, sem
//! cancelamento** — uma chamada lenta simplesmente atrasa a resposta, e
//! falha de transporte vira erro do estágio chamador (que degrada, nunca
//! propaga para o usuário).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Modelo de texto usado para resposta genérica, classificação e URL.
pub const CHAT_MODEL: &str = "llama-3.1-8b-instant";

/// Modelo multimodal usado para análise de imagem e de tela.
pub const VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Endpoint base da API (compatível com o formato OpenAI).
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Papel de um turno na conversa.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    /// Instruções de sistema (prompt fixo do assistente).
    System,
    /// Mensagem do usuário.
    User,
    /// Resposta anterior do assistente.
    Assistant,
}

impl ChatRole {
    /// Nome do papel no formato de wire da API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Um turno de conversa, na ordem cronológica em que ocorreu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Parâmetros de uma chamada de completion.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    /// Prompt de sistema opcional, prefixado aos turnos.
    pub system: Option<String>,
    /// Histórico + mensagem nova, em ordem cronológica.
    pub turns: Vec<ChatTurn>,
    /// Identificador do modelo (ex: [`CHAT_MODEL`]).
    pub model: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Falhas do gateway — sempre capturadas no estágio chamador.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Erro de transporte (conexão, timeout, TLS, corpo inválido).
    #[error("falha de transporte na API de completion: {0}")]
    Transport(#[from] reqwest::Error),

    /// A API respondeu com status de erro.
    #[error("API de completion retornou status {status}: {body}")]
    Api { status: u16, body: String },

    /// Resposta 200 mas sem `choices[0].message.content`.
    #[error("resposta da API de completion sem conteúdo")]
    EmptyReply,
}

/// Capacidade de completar texto via modelo de linguagem.
///
/// Uma tentativa por chamada; o chamador decide como degradar em erro.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Envia uma conversa e retorna o texto gerado.
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError>;

    /// Envia um prompt + imagem (bytes crus) para o modelo de visão.
    async fn complete_vision(
        &self,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, GatewayError>;
}

/// Implementação de produção contra a API da Groq.
pub struct GroqGateway {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqGateway {
    /// Cria o gateway com uma chave explícita.
    ///
    /// # Erros
    ///
    /// Retorna erro se o cliente HTTP não puder ser construído.
    pub fn new(api_key: String) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: GROQ_BASE_URL.to_string(),
        })
    }

    /// Cria o gateway lendo `GROQ_API_KEY` do ambiente.
    ///
    /// Chave ausente **não aborta a inicialização**: as chamadas falharão
    /// na hora e cada estágio degrada conforme sua política.
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var("GROQ_API_KEY").unwrap_or_else(|_| {
            tracing::warn!("GROQ_API_KEY não definida — chamadas à API de completion falharão");
            String::new()
        });
        Self::new(api_key)
    }

    /// Faz o POST e extrai `choices[0].message.content`.
    async fn post_completion(&self, body: serde_json::Value) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(GatewayError::EmptyReply)?;
        Ok(content.to_string())
    }
}

#[async_trait]
impl Completion for GroqGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let mut messages: Vec<serde_json::Value> = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        for turn in &request.turns {
            messages.push(json!({ "role": turn.role.as_str(), "content": turn.content }));
        }

        let body = json!({
            "messages": messages,
            "model": request.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        self.post_completion(body).await
    }

    async fn complete_vision(
        &self,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, GatewayError> {
        let encoded = BASE64.encode(image);
        let body = json!({
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:{};base64,{}", mime, encoded) }
                    }
                ]
            }],
            "model": VISION_MODEL,
            "temperature": 0.7,
            "max_completion_tokens": 1000,
        });
        self.post_completion(body).await
    }
}

/// Stubs determinísticos de [`Completion`] para a suíte de testes.
#[cfg(test)]
pub(crate) mod stubs {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Responde sempre o mesmo texto e conta as chamadas.
    pub struct FixedGateway {
        pub reply: String,
        pub calls: AtomicUsize,
    }

    impl FixedGateway {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Completion for FixedGateway {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }

        async fn complete_vision(
            &self,
            _prompt: &str,
            _image: &[u8],
            _mime: &str,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    /// Responde uma sequência fixa, na ordem das chamadas.
    ///
    /// Esgotada a sequência, devolve [`GatewayError::EmptyReply`].
    pub struct ScriptedGateway {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedGateway {
        pub fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl Completion for ScriptedGateway {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, GatewayError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(GatewayError::EmptyReply)
        }

        async fn complete_vision(
            &self,
            _prompt: &str,
            _image: &[u8],
            _mime: &str,
        ) -> Result<String, GatewayError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(GatewayError::EmptyReply)
        }
    }

    /// Falha toda chamada, simulando API fora do ar.
    pub struct FailingGateway;

    #[async_trait]
    impl Completion for FailingGateway {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, GatewayError> {
            Err(GatewayError::EmptyReply)
        }

        async fn complete_vision(
            &self,
            _prompt: &str,
            _image: &[u8],
            _mime: &str,
        ) -> Result<String, GatewayError> {
            Err(GatewayError::EmptyReply)
        }
    }

    /// Entra em pânico se chamado — prova que um caminho não toca a rede.
    pub struct PanicGateway;

    #[async_trait]
    impl Completion for PanicGateway {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, GatewayError> {
            panic!("chamada inesperada ao gateway");
        }

        async fn complete_vision(
            &self,
            _prompt: &str,
            _image: &[u8],
            _mime: &str,
        ) -> Result<String, GatewayError> {
            panic!("chamada inesperada ao gateway de visão");
        }
    }
}
