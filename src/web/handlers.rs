//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Todos respondem JSON.
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Uso |
//! |---------|--------|-----|
//! | `health` | GET | liveness do serviço |
//! | `process` | POST | rota central: mensagem → {response, action, parameters} |
//! | `analyze_image` | POST | arquivo de imagem → descrição via modelo de visão |
//! | `upload_image` | POST | multipart → salva em `uploads/`, retorna o caminho |
//! | `analyze_text` | POST | texto → sentimento/intenção/urgência |
//! | `improve_search` | POST | query → query de pesquisa melhorada |
//!
//! ## Política de Erro
//!
//! Entrada malformada (mensagem/caminho/query vazios) é rejeitada com
//! 400 **antes** de qualquer chamada externa. Falha do gateway nas rotas
//! de análise vira 500 com corpo JSON; na rota `process` a degradação
//! acontece dentro do pipeline e a resposta é sempre 200.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::state::AppState;
use crate::gateway::{ChatTurn, CompletionRequest, CHAT_MODEL};
use crate::nlu::intent::{IntentLabel, ParameterRecord};
use crate::nlu::prompts;

/// Diretório onde uploads de imagem são gravados.
const UPLOAD_DIR: &str = "uploads";

/// Corpo da rota `/api/ai/process`.
#[derive(Deserialize)]
pub struct ProcessRequest {
    /// Mensagem nova do usuário.
    pub message: String,
    /// Transcrição da conversa anterior (uma linha por turno).
    #[serde(default)]
    pub context: String,
}

/// Resposta da rota `/api/ai/process`.
#[derive(Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    /// Texto do assistente (vazio quando há ação específica).
    pub response: String,
    /// Intenção classificada, em `snake_case`.
    pub action: IntentLabel,
    /// Parâmetros extraídos — toda chave é opcional.
    pub parameters: ParameterRecord,
    pub timestamp: DateTime<Utc>,
}

/// Corpo da rota `/api/ai/analyze-image`.
#[derive(Deserialize)]
pub struct AnalyzeImageRequest {
    #[serde(rename = "imagePath", default)]
    pub image_path: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Resposta das rotas de análise via modelo.
#[derive(Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Corpo da rota `/api/ai/analyze`.
#[derive(Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
}

/// Corpo da rota `/api/ai/search`.
#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Resposta JSON de erro padronizada.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

/// GET `/api/health` — liveness do serviço.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "message": "Assistente IA funcionando!" }))
}

/// POST `/api/ai/process` — rota central do assistente.
///
/// ## Fluxo
///
/// ```text
/// 1. Rejeita mensagem vazia (400, nenhuma chamada externa)
/// 2. pipeline.process(): resposta genérica + classificação + extração
/// 3. Responde {success, response, action, parameters, timestamp}
/// ```
///
/// Falhas do gateway degradam dentro do pipeline — esta rota nunca
/// responde erro por causa de classificação.
pub async fn process(
    State(state): State<AppState>,
    Json(payload): Json<ProcessRequest>,
) -> Response {
    let message = payload.message.trim();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Mensagem é obrigatória");
    }

    let outcome = state.pipeline.process(message, &payload.context).await;

    Json(ProcessResponse {
        success: true,
        response: outcome.response,
        action: outcome.action,
        parameters: outcome.parameters,
        timestamp: Utc::now(),
    })
    .into_response()
}

/// POST `/api/ai/analyze-image` — descreve um arquivo de imagem local.
///
/// Lê o arquivo, codifica em base64 e envia ao modelo de visão com o
/// prompt do usuário (ou o prompt padrão). Caminho ausente ou arquivo
/// ilegível → 400; falha do modelo → 500.
pub async fn analyze_image(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeImageRequest>,
) -> Response {
    let path = payload.image_path.trim();
    if path.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Caminho da imagem é obrigatório");
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Arquivo de imagem inacessível");
            return error_response(StatusCode::BAD_REQUEST, "Arquivo de imagem não encontrado");
        }
    };

    let prompt = payload
        .prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_IMAGE_PROMPT);
    let mime = mime_for_path(path);
    tracing::info!(path = %path, size_bytes = bytes.len(), mime = %mime, "Analisando imagem");

    match state.gateway.complete_vision(prompt, &bytes, mime).await {
        Ok(response) => Json(AnalysisResponse {
            success: true,
            response,
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Falha na análise de imagem");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao analisar imagem com IA",
            )
        }
    }
}

/// POST `/api/ai/analyze-image-upload` — recebe uma imagem por multipart.
///
/// Salva o arquivo em `uploads/` com nome timestampado e devolve o
/// caminho para uma chamada posterior a `/api/ai/analyze-image`.
/// Só aceita campos `image` com content-type `image/*`.
pub async fn upload_image(mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        if !content_type.starts_with("image/") {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Apenas arquivos de imagem são permitidos",
            );
        }

        let original = field.file_name().unwrap_or("imagem.png").to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Falha ao ler bytes do upload");
                return error_response(StatusCode::BAD_REQUEST, "Erro no upload da imagem");
            }
        };

        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
        let filename = format!("upload_{stamp}_{original}");
        let path = Path::new(UPLOAD_DIR).join(&filename);

        if let Err(e) = tokio::fs::create_dir_all(UPLOAD_DIR).await {
            tracing::error!(error = %e, "Falha ao criar diretório de uploads");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor");
        }
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            tracing::error!(error = %e, path = %path.display(), "Falha ao gravar upload");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor");
        }

        tracing::info!(path = %path.display(), size_bytes = bytes.len(), "Imagem recebida");
        return Json(json!({
            "success": true,
            "imagePath": path.to_string_lossy(),
            "message": "Imagem enviada com sucesso",
        }))
        .into_response();
    }

    error_response(StatusCode::BAD_REQUEST, "Nenhum arquivo foi enviado")
}

/// POST `/api/ai/analyze` — sentimento, intenção e urgência de um texto.
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeTextRequest>,
) -> Response {
    let request = CompletionRequest {
        system: None,
        turns: vec![ChatTurn::user(prompts::analysis_prompt(&payload.text))],
        model: CHAT_MODEL,
        temperature: 0.5,
        max_tokens: 500,
    };

    match state.gateway.complete(request).await {
        Ok(analysis) => Json(json!({
            "success": true,
            "analysis": analysis,
            "timestamp": Utc::now(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Falha na análise de texto");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro ao analisar texto")
        }
    }
}

/// POST `/api/ai/search` — melhora uma query de pesquisa via modelo.
pub async fn improve_search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Response {
    let query = payload.query.trim();
    if query.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Query é obrigatória");
    }

    let request = CompletionRequest {
        system: None,
        turns: vec![ChatTurn::user(prompts::search_prompt(query))],
        model: CHAT_MODEL,
        temperature: 0.3,
        max_tokens: 100,
    };

    match state.gateway.complete(request).await {
        Ok(improved) => Json(json!({
            "success": true,
            "data": {
                "query": improved.trim(),
                "timestamp": Utc::now(),
            },
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Falha ao melhorar query de pesquisa");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro ao realizar pesquisa")
        }
    }
}

/// Tipo MIME inferido pela extensão do arquivo, default `image/jpeg`.
fn mime_for_path(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppDirectory;
    use crate::gateway::stubs::{PanicGateway, ScriptedGateway};
    use crate::gateway::Completion;
    use crate::nlu::IntentPipeline;
    use crate::web::create_router;

    fn test_router(gateway: Arc<dyn Completion>) -> axum::Router {
        let apps = Arc::new(AppDirectory::default());
        let state = AppState {
            pipeline: Arc::new(IntentPipeline::new(gateway.clone(), apps)),
            gateway,
        };
        create_router(state)
    }

    async fn post_json(
        router: axum::Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let router = test_router(Arc::new(PanicGateway));
        let response = router
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_message_rejected_before_any_external_call() {
        // PanicGateway: se a rota tocasse o gateway, o teste quebraria
        let router = test_router(Arc::new(PanicGateway));
        let (status, body) =
            post_json(router, "/api/ai/process", serde_json::json!({ "message": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Mensagem é obrigatória");
    }

    #[tokio::test]
    async fn process_returns_action_and_parameters() {
        let gateway = Arc::new(ScriptedGateway::new(&["posso fechar sim", "CLOSE_WINDOW"]));
        let router = test_router(gateway);
        let (status, body) = post_json(
            router,
            "/api/ai/process",
            serde_json::json!({ "message": "fechar janela \"Bloco de Notas\"", "context": "" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["action"], "close_window");
        assert_eq!(body["parameters"]["windowTitle"], "Bloco de Notas");
        // ação específica suprime a resposta natural
        assert_eq!(body["response"], "");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn process_conversation_passes_reply_through() {
        let gateway = Arc::new(ScriptedGateway::new(&["olá!", "NONE"]));
        let router = test_router(gateway);
        let (status, body) = post_json(
            router,
            "/api/ai/process",
            serde_json::json!({ "message": "oi" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "general_response");
        assert_eq!(body["response"], "olá!");
    }

    #[tokio::test]
    async fn analyze_image_requires_path() {
        let router = test_router(Arc::new(PanicGateway));
        let (status, body) =
            post_json(router, "/api/ai/analyze-image", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Caminho da imagem é obrigatório");
    }

    #[tokio::test]
    async fn analyze_image_missing_file_is_client_error() {
        let router = test_router(Arc::new(PanicGateway));
        let (status, body) = post_json(
            router,
            "/api/ai/analyze-image",
            serde_json::json!({ "imagePath": "/nao/existe.png" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Arquivo de imagem não encontrado");
    }

    #[tokio::test]
    async fn search_requires_query() {
        let router = test_router(Arc::new(PanicGateway));
        let (status, _) = post_json(
            router,
            "/api/ai/search",
            serde_json::json!({ "query": "" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_returns_improved_query() {
        let gateway = Arc::new(ScriptedGateway::new(&["rust axum tutorial completo"]));
        let router = test_router(gateway);
        let (status, body) = post_json(
            router,
            "/api/ai/search",
            serde_json::json!({ "query": "axum" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["query"], "rust axum tutorial completo");
    }

    #[test]
    fn mime_inference() {
        assert_eq!(mime_for_path("C:\\img.png"), "image/png");
        assert_eq!(mime_for_path("foto.JPEG"), "image/jpeg");
        assert_eq!(mime_for_path("anim.gif"), "image/gif");
        assert_eq!(mime_for_path("sem_extensao"), "image/jpeg");
    }
}
