//! # Classificador de Intenção — Duas Camadas
//!
//! O [`IntentClassifier`] decide qual **ação** a mensagem do usuário
//! está pedindo. A decisão influencia todo o resto da requisição: quais
//! parâmetros extrair, se a resposta do modelo é exibida ou suprimida, e
//! qual colaborador externo o frontend aciona.
//!
//! | Label | Significado | Exemplo |
//! |-------|-------------|---------|
//! | [`AnalyzeScreen`](IntentLabel::AnalyzeScreen) | capturar e descrever a tela | "analise minha tela" |
//! | [`AnalyzeImage`](IntentLabel::AnalyzeImage) | descrever um arquivo de imagem | "analise a imagem: C:\\foto.png" |
//! | [`Screenshot`](IntentLabel::Screenshot) | capturar a tela sem analisar | "tirar print da janela ativa" |
//! | [`FocusWindow`](IntentLabel::FocusWindow) | trazer janela para frente | "focar no chrome" |
//! | [`OpenWebsite`](IntentLabel::OpenWebsite) | abrir uma URL | "abrir youtube" |
//! | [`OpenApp`](IntentLabel::OpenApp) | abrir um programa local | "abrir calculadora" |
//! | [`PlayMusic`](IntentLabel::PlayMusic) | tocar/controlar áudio | "tocar música" |
//! | [`ListWindows`](IntentLabel::ListWindows) | listar janelas abertas | "listar janelas" |
//! | [`CloseWindow`](IntentLabel::CloseWindow) | fechar uma janela | "fechar janela \"X\"" |
//! | [`RunCommand`](IntentLabel::RunCommand) | rodar comando de shell | "executar comando \"dir\"" |
//! | [`SystemControl`](IntentLabel::SystemControl) | volume do sistema | "aumentar volume" |
//! | [`GeneralResponse`](IntentLabel::GeneralResponse) | conversa, sem ação | "gosta de nirvana?" |
//!
//! ## Estratégia em Dois Estágios
//!
//! ```text
//! Mensagem do usuário
//!   ├── Fase 1: bateria de regras de palavra-chave (ordem fixa,
//!   │   primeira que casar vence, sem rede)
//!   └── Fase 2: uma chamada de completion pedindo UM token do
//!       conjunto fechado; NONE e tokens desconhecidos viram
//!       GeneralResponse; erro de transporte também (fail-open)
//! ```
//!
//! A Fase 1 é mutuamente exclusiva por construção e **nunca** é
//! sobrescrito pela Fase 2. A precisão da Fase 2 é melhor-esforço:
//! fica a cargo do modelo distinguir comando ambíguo de conversa.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::extractor::ParamExtractor;
use super::prompts;
use crate::config::AppDirectory;
use crate::gateway::{ChatTurn, Completion, CompletionRequest, CHAT_MODEL};

/// Rótulo de intenção — conjunto fechado, exatamente um por requisição.
///
/// Serializa em `snake_case` no campo `action` da resposta HTTP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    OpenWebsite,
    OpenApp,
    Screenshot,
    PlayMusic,
    ListWindows,
    CloseWindow,
    RunCommand,
    SystemControl,
    FocusWindow,
    AnalyzeImage,
    AnalyzeScreen,
    /// Default e também o resultado explícito de "nenhuma ação".
    GeneralResponse,
}

impl IntentLabel {
    /// Mapeia o token emitido pelo modelo na Fase 2.
    ///
    /// `NONE` e qualquer valor fora do conjunto reconhecido viram
    /// [`GeneralResponse`](IntentLabel::GeneralResponse).
    pub fn from_model_token(token: &str) -> IntentLabel {
        match token {
            "SITE" => IntentLabel::OpenWebsite,
            "APP" => IntentLabel::OpenApp,
            "SCREENSHOT" => IntentLabel::Screenshot,
            "MUSIC" => IntentLabel::PlayMusic,
            "LIST_WINDOWS" => IntentLabel::ListWindows,
            "CLOSE_WINDOW" => IntentLabel::CloseWindow,
            "RUN_COMMAND" => IntentLabel::RunCommand,
            "VOLUME" => IntentLabel::SystemControl,
            "FOCUS" => IntentLabel::FocusWindow,
            "ANALYZE_IMAGE" => IntentLabel::AnalyzeImage,
            "ANALYZE_SCREEN" => IntentLabel::AnalyzeScreen,
            _ => IntentLabel::GeneralResponse,
        }
    }
}

/// Sacola de parâmetros extraídos, chaveada por nome.
///
/// Quais chaves aparecem depende do [`IntentLabel`]; nenhuma é
/// obrigatória — ausência de chave é resultado válido (degradado) e o
/// consumidor trata tudo como opcional. Serializa como objeto JSON
/// plano (`{"screenshotType": "active"}`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterRecord(BTreeMap<String, String>);

impl ParameterRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (ou sobrescreve) um parâmetro.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Lê um parâmetro, se presente.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─── Fase 1: bateria de regras de palavra-chave ─────────────────

/// Frases que disparam análise de tela (prioridade 1).
const SCREEN_ANALYSIS_PHRASES: &[&str] = &[
    "analise minha tela",
    "analisar tela",
    "analise a tela",
    "descrever tela",
    "o que tem na tela",
    "identificar tela",
    "explicar tela",
    "ver tela",
    "analise print",
    "descrever print",
    "consegue analisar",
    "veja oq tem",
    "veja o que tem",
    "mostrar tela",
    "capturar e analisar",
    "tirar print e analisar",
];

/// Frases compostas que disparam análise de imagem (prioridade 2).
///
/// Além destas, a combinação "analise" + "imagem" em qualquer posição
/// também dispara.
const IMAGE_ANALYSIS_PHRASES: &[&str] = &[
    "analisar imagem",
    "descrever imagem",
    "o que tem na imagem",
    "identificar imagem",
    "explicar imagem",
    "ver imagem",
];

/// Frases que disparam screenshot (prioridade 3).
const SCREENSHOT_PHRASES: &[&str] = &[
    "screenshot",
    "capturar tela",
    "tirar print",
    "print screen",
    "captura",
    "print",
];

/// Frases que disparam foco de janela (prioridade 4).
const FOCUS_PHRASES: &[&str] = &["focar", "focar em", "ir para", "mudar para"];

fn contains_any(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| lower.contains(p))
}

fn is_screen_analysis(lower: &str) -> bool {
    contains_any(lower, SCREEN_ANALYSIS_PHRASES)
}

fn is_image_analysis(lower: &str) -> bool {
    (lower.contains("analise") && lower.contains("imagem"))
        || contains_any(lower, IMAGE_ANALYSIS_PHRASES)
}

fn is_screenshot(lower: &str) -> bool {
    contains_any(lower, SCREENSHOT_PHRASES)
}

fn is_focus(lower: &str) -> bool {
    contains_any(lower, FOCUS_PHRASES)
}

/// Uma regra da Fase 1: predicado puro sobre a mensagem em minúsculas.
struct KeywordRule {
    label: IntentLabel,
    matches: fn(&str) -> bool,
}

/// Bateria da Fase 1 em **ordem de prioridade** — a primeira regra que
/// casar vence, mesmo que frases de regras posteriores também estejam
/// presentes na mensagem.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        label: IntentLabel::AnalyzeScreen,
        matches: is_screen_analysis,
    },
    KeywordRule {
        label: IntentLabel::AnalyzeImage,
        matches: is_image_analysis,
    },
    KeywordRule {
        label: IntentLabel::Screenshot,
        matches: is_screenshot,
    },
    KeywordRule {
        label: IntentLabel::FocusWindow,
        matches: is_focus,
    },
];

// ─── Classificador ───────────────────────────────────────────────

/// Classificador de intenção em dois estágios.
///
/// O diretório de aplicativos é injetado na construção (imutável,
/// compartilhado) e o gateway é passado por chamada — testes usam
/// fixtures e stubs sem nenhuma dependência global.
pub struct IntentClassifier {
    apps: Arc<AppDirectory>,
    extractor: ParamExtractor,
}

impl IntentClassifier {
    pub fn new(apps: Arc<AppDirectory>) -> Self {
        Self {
            apps,
            extractor: ParamExtractor::new(),
        }
    }

    /// Fase 1: avalia a bateria de regras de palavra-chave.
    ///
    /// Retorna `None` quando nenhuma regra casa — o chamador decide se
    /// cai para a Fase 2. Nunca toca a rede.
    pub fn classify_keywords(&self, message: &str) -> Option<(IntentLabel, ParameterRecord)> {
        let lower = message.to_lowercase();
        let rule = KEYWORD_RULES.iter().find(|r| (r.matches)(&lower))?;

        let params = match rule.label {
            IntentLabel::AnalyzeScreen => self.extractor.analyze_screen_params(message),
            IntentLabel::AnalyzeImage => self.extractor.analyze_image_params(message),
            IntentLabel::Screenshot => self.extractor.screenshot_params(message, &self.apps),
            IntentLabel::FocusWindow => self.extractor.focus_keyword_params(message, &self.apps),
            _ => ParameterRecord::new(),
        };
        Some((rule.label, params))
    }

    /// Classificação completa: Fase 1 primeiro, Fase 2 como fallback.
    pub async fn classify(
        &self,
        gateway: &dyn Completion,
        message: &str,
        context: &str,
    ) -> (IntentLabel, ParameterRecord) {
        if let Some(hit) = self.classify_keywords(message) {
            tracing::debug!(label = ?hit.0, "Intenção detectada por palavra-chave");
            return hit;
        }
        self.classify_fallback(gateway, message, context).await
    }

    /// Fase 2: pede ao modelo um token do conjunto fechado.
    ///
    /// Qualquer falha da chamada degrada para `GeneralResponse` com
    /// parâmetros vazios — o fluxo do usuário nunca quebra por erro de
    /// classificação.
    async fn classify_fallback(
        &self,
        gateway: &dyn Completion,
        message: &str,
        context: &str,
    ) -> (IntentLabel, ParameterRecord) {
        let request = CompletionRequest {
            system: None,
            turns: vec![ChatTurn::user(prompts::action_prompt(message, context))],
            model: CHAT_MODEL,
            temperature: 0.1,
            max_tokens: 10,
        };

        let token = match gateway.complete(request).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Falha na classificação via modelo, mantendo general_response");
                return (IntentLabel::GeneralResponse, ParameterRecord::new());
            }
        };

        let label = IntentLabel::from_model_token(&token);
        tracing::debug!(token = %token, label = ?label, "Intenção detectada pelo modelo");
        let params = self.extractor.fallback_params(label, message, &self.apps);
        (label, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEntry;
    use crate::gateway::stubs::{FailingGateway, FixedGateway, PanicGateway};

    fn classifier() -> IntentClassifier {
        let apps = Arc::new(AppDirectory::from_entries(vec![AppEntry {
            id: "spotify".to_string(),
            name: "Spotify".to_string(),
            keywords: vec!["musica".to_string()],
        }]));
        IntentClassifier::new(apps)
    }

    // ─── Fase 1 ───────────────────────────────────────────────

    #[tokio::test]
    async fn screen_phrase_never_reaches_model() {
        let c = classifier();
        // PanicGateway garante que nenhuma chamada externa acontece
        let (label, _) = c.classify(&PanicGateway, "analise minha tela", "").await;
        assert_eq!(label, IntentLabel::AnalyzeScreen);
    }

    #[test]
    fn image_compound_rule_extracts_path() {
        let c = classifier();
        let (label, params) = c
            .classify_keywords("analise a imagem: C:\\img.png")
            .unwrap();
        assert_eq!(label, IntentLabel::AnalyzeImage);
        assert_eq!(params.get("imagePath"), Some("C:\\img.png"));
    }

    #[test]
    fn screenshot_active_window() {
        let c = classifier();
        let (label, params) = c
            .classify_keywords("tirar screenshot da janela ativa")
            .unwrap();
        assert_eq!(label, IntentLabel::Screenshot);
        assert_eq!(params.get("screenshotType"), Some("active"));
    }

    #[test]
    fn screenshot_full_screen() {
        let c = classifier();
        let (_, params) = c.classify_keywords("capturar tela inteira").unwrap();
        assert_eq!(params.get("screenshotType"), Some("full"));
    }

    #[test]
    fn screenshot_of_known_app_scopes_to_window() {
        let c = classifier();
        let (label, params) = c.classify_keywords("tirar print do spotify").unwrap();
        assert_eq!(label, IntentLabel::Screenshot);
        assert_eq!(params.get("screenshotType"), Some("window"));
        assert_eq!(params.get("windowTitle"), Some("spotify"));
    }

    #[test]
    fn screen_analysis_wins_over_screenshot() {
        // "tirar print e analisar" contém frases das duas categorias;
        // a regra de análise de tela tem prioridade maior
        let c = classifier();
        let (label, _) = c.classify_keywords("tirar print e analisar").unwrap();
        assert_eq!(label, IntentLabel::AnalyzeScreen);
    }

    #[test]
    fn focus_resolves_via_directory() {
        let c = classifier();
        let (label, params) = c.classify_keywords("focar no spotify").unwrap();
        assert_eq!(label, IntentLabel::FocusWindow);
        assert_eq!(params.get("windowTitle"), Some("spotify"));
    }

    #[test]
    fn plain_conversation_misses_stage_a() {
        let c = classifier();
        assert!(c.classify_keywords("bom dia, tudo bem?").is_none());
    }

    // ─── Fase 2 ───────────────────────────────────────────────

    #[tokio::test]
    async fn model_close_window_with_title() {
        let c = classifier();
        let gateway = FixedGateway::new("CLOSE_WINDOW");
        let (label, params) = c
            .classify(&gateway, "fechar janela \"Bloco de Notas\"", "")
            .await;
        assert_eq!(label, IntentLabel::CloseWindow);
        assert_eq!(params.get("windowTitle"), Some("Bloco de Notas"));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn model_unknown_token_degrades_to_general() {
        let c = classifier();
        let gateway = FixedGateway::new("TALVEZ");
        let (label, params) = c.classify(&gateway, "faz alguma coisa", "").await;
        assert_eq!(label, IntentLabel::GeneralResponse);
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn model_none_maps_to_general() {
        let c = classifier();
        let gateway = FixedGateway::new("NONE");
        let (label, _) = c.classify(&gateway, "gosta de nirvana?", "").await;
        assert_eq!(label, IntentLabel::GeneralResponse);
    }

    #[tokio::test]
    async fn model_failure_fails_open() {
        let c = classifier();
        let (label, params) = c.classify(&FailingGateway, "abrir youtube", "").await;
        assert_eq!(label, IntentLabel::GeneralResponse);
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn model_volume_subaction() {
        let c = classifier();
        let gateway = FixedGateway::new("VOLUME");
        let (label, params) = c.classify(&gateway, "aumentar o volume", "").await;
        assert_eq!(label, IntentLabel::SystemControl);
        assert_eq!(params.get("command"), Some("volume_up"));
    }

    #[test]
    fn token_mapping_covers_known_tokens() {
        for (token, label) in [
            ("SITE", IntentLabel::OpenWebsite),
            ("APP", IntentLabel::OpenApp),
            ("SCREENSHOT", IntentLabel::Screenshot),
            ("MUSIC", IntentLabel::PlayMusic),
            ("LIST_WINDOWS", IntentLabel::ListWindows),
            ("CLOSE_WINDOW", IntentLabel::CloseWindow),
            ("RUN_COMMAND", IntentLabel::RunCommand),
            ("VOLUME", IntentLabel::SystemControl),
            ("FOCUS", IntentLabel::FocusWindow),
            ("ANALYZE_IMAGE", IntentLabel::AnalyzeImage),
            ("ANALYZE_SCREEN", IntentLabel::AnalyzeScreen),
            ("NONE", IntentLabel::GeneralResponse),
        ] {
            assert_eq!(IntentLabel::from_model_token(token), label);
        }
    }

    #[test]
    fn label_serializes_snake_case() {
        let json = serde_json::to_string(&IntentLabel::OpenWebsite).unwrap();
        assert_eq!(json, "\"open_website\"");
        let json = serde_json::to_string(&IntentLabel::GeneralResponse).unwrap();
        assert_eq!(json, "\"general_response\"");
    }
}
