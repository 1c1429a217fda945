//! # Extrator de Parâmetros — Heurísticas por Intenção
//!
//! O [`ParamExtractor`] puxa argumentos estruturados de texto livre,
//! com uma heurística específica por [`IntentLabel`]:
//!
//! | Intenção | Heurística | Chave extraída |
//! |----------|-----------|----------------|
//! | análise de imagem | cascata de 3 regexes de caminho Windows | `imagePath`, `prompt` |
//! | análise de tela | captura do texto após verbo descritivo | `prompt` |
//! | screenshot | frases fixas + diretório de apps + regex de janela | `screenshotType`, `windowTitle` |
//! | foco de janela | diretório de apps, depois regex do alvo | `windowTitle` |
//! | abrir app | diretório de apps, depois primeiro token útil | `appName` |
//! | fechar janela | regex com título opcionalmente entre aspas | `windowTitle` |
//! | executar comando | regex do literal após "executar comando" | `command` |
//! | volume | substrings aumentar/diminuir/mutar | `command` |
//!
//! ## Política de Falha
//!
//! Extração **nunca** é erro: regex que não casa significa apenas chave
//! ausente no [`ParameterRecord`], e o consumidor trata toda chave como
//! opcional. As regexes são compiladas uma única vez na construção e
//! reutilizadas em todas as requisições.

use regex::Regex;

use super::intent::{IntentLabel, ParameterRecord};
use super::prompts::{DEFAULT_IMAGE_PROMPT, DEFAULT_SCREEN_PROMPT};
use crate::config::AppDirectory;

/// Palavras ignoradas no fallback de nome de aplicativo.
const OPEN_APP_STOPWORDS: &[&str] = &["abrir", "programa", "aplicativo", "app"];

/// Sub-ações de volume reconhecidas por substring, em ordem de teste.
const VOLUME_RULES: &[(&[&str], &str)] = &[
    (&["aumentar", "subir"], "volume_up"),
    (&["diminuir", "descer"], "volume_down"),
    (&["mutar", "silenciar"], "volume_mute"),
];

/// Extrator com regexes pré-compiladas.
pub struct ParamExtractor {
    /// Texto após verbo descritivo, com sufixo "tela"/"print" opcional.
    screen_prompt_re: Regex,
    /// Texto após verbo descritivo, com sufixo "imagem"/"arquivo"/"foto" opcional.
    image_prompt_re: Regex,
    /// Caminho Windows rotulado: "imagem: C:\...\x.png".
    labeled_path_re: Regex,
    /// Qualquer caminho Windows terminando em extensão de imagem.
    bare_path_re: Regex,
    /// Qualquer coisa após o literal "imagem:".
    simple_path_re: Regex,
    /// Nome de janela após "janela" (primeira palavra).
    window_re: Regex,
    /// Alvo após "focar"/"ir para"/"mudar para" (primeira palavra).
    focus_re: Regex,
    /// Título após "fechar janela", aspas opcionais.
    close_window_re: Regex,
    /// Comando literal após "executar comando", aspas opcionais.
    run_command_re: Regex,
}

impl ParamExtractor {
    pub fn new() -> Self {
        Self {
            screen_prompt_re: Regex::new(
                r"(?i)(?:descrever|explicar|analisar|identificar)\s+(.+?)(?:\s+(?:tela|print))?",
            )
            .unwrap(),
            image_prompt_re: Regex::new(
                r"(?i)(?:descrever|explicar|analisar|identificar)\s+(.+?)(?:\s+(?:imagem|arquivo|foto))?",
            )
            .unwrap(),
            labeled_path_re: Regex::new(
                r"(?i)(?:imagem|arquivo|foto)\s*:?\s*([A-Za-z]:\\\S+\.(?:png|jpg|jpeg|gif|bmp|webp))",
            )
            .unwrap(),
            bare_path_re: Regex::new(r"(?i)([A-Za-z]:\\\S+\.(?:png|jpg|jpeg|gif|bmp|webp))")
                .unwrap(),
            simple_path_re: Regex::new(r"(?i)imagem:\s*(.+)").unwrap(),
            window_re: Regex::new(r"janela\s+(.+?)(?:\s|$)").unwrap(),
            focus_re: Regex::new(r"(?i)(?:focar|focar em|ir para|mudar para)\s+(.+?)(?:\s|$)")
                .unwrap(),
            close_window_re: Regex::new(
                r#"(?i)fechar (?:a )?janela(?:s)? (?:de )?["']?([^"']+)["']?"#,
            )
            .unwrap(),
            run_command_re: Regex::new(r#"(?i)executar comando ["']?([^"']+)["']?"#).unwrap(),
        }
    }

    // ─── Caminho Fase 1 (regras de palavra-chave) ───────────────

    /// Parâmetros de análise de tela: só o prompt descritivo, se houver.
    pub fn analyze_screen_params(&self, message: &str) -> ParameterRecord {
        let mut params = ParameterRecord::new();
        if let Some(cap) = self.screen_prompt_re.captures(message) {
            params.set("prompt", cap[1].trim());
        }
        params
    }

    /// Parâmetros de análise de imagem: caminho (cascata) + prompt.
    ///
    /// As três regexes de caminho são tentadas em ordem — rotulada, caminho
    /// solto, captura simples após "imagem:" — e a primeira que casar vence.
    pub fn analyze_image_params(&self, message: &str) -> ParameterRecord {
        let mut params = ParameterRecord::new();

        let path = self
            .labeled_path_re
            .captures(message)
            .or_else(|| self.bare_path_re.captures(message))
            .or_else(|| self.simple_path_re.captures(message))
            .map(|cap| cap[1].trim().to_string());
        if let Some(path) = path {
            params.set("imagePath", path);
        }

        if let Some(cap) = self.image_prompt_re.captures(message) {
            params.set("prompt", cap[1].trim());
        }
        params
    }

    /// Sub-classificação de screenshot.
    ///
    /// Ordem: tela inteira → janela ativa → "janela <X>" → aplicativo
    /// conhecido no diretório → `full` como default.
    pub fn screenshot_params(&self, message: &str, apps: &AppDirectory) -> ParameterRecord {
        let mut params = ParameterRecord::new();
        let lower = message.to_lowercase();

        if lower.contains("tela inteira") || lower.contains("tela completa") {
            params.set("screenshotType", "full");
        } else if lower.contains("janela ativa") || lower.contains("janela em foco") {
            params.set("screenshotType", "active");
        } else if lower.contains("janela") && !lower.contains("ativa") {
            if let Some(cap) = self.window_re.captures(&lower) {
                params.set("screenshotType", "window");
                params.set("windowTitle", cap[1].trim());
            } else {
                params.set("screenshotType", "full");
            }
        } else if let Some(hit) = apps.find(message) {
            params.set("screenshotType", "window");
            params.set("windowTitle", hit.matched);
        } else {
            params.set("screenshotType", "full");
        }
        params
    }

    /// Alvo de foco via Fase 1: diretório primeiro, regex como fallback.
    pub fn focus_keyword_params(&self, message: &str, apps: &AppDirectory) -> ParameterRecord {
        if let Some(hit) = apps.find(message) {
            let mut params = ParameterRecord::new();
            params.set("windowTitle", hit.matched);
            return params;
        }
        self.focus_regex_params(message)
    }

    // ─── Caminho Fase 2 (fallback via modelo) ───────────────────

    /// Extração por intenção para rótulos vindos da Fase 2.
    ///
    /// Função pura de `(label, mensagem, diretório)` — regras novas
    /// entram aqui sem tocar o classificador.
    pub fn fallback_params(
        &self,
        label: IntentLabel,
        message: &str,
        apps: &AppDirectory,
    ) -> ParameterRecord {
        let mut params = ParameterRecord::new();
        match label {
            IntentLabel::OpenApp => return self.open_app_params(message, apps),
            IntentLabel::Screenshot => {
                // Fase 2 não refaz a sub-classificação rica da Fase 1
                params.set("screenshotType", "full");
            }
            IntentLabel::CloseWindow => {
                if let Some(cap) = self.close_window_re.captures(message) {
                    params.set("windowTitle", cap[1].to_string());
                }
            }
            IntentLabel::RunCommand => {
                if let Some(cap) = self.run_command_re.captures(message) {
                    params.set("command", cap[1].to_string());
                }
            }
            IntentLabel::SystemControl => return self.volume_params(message),
            IntentLabel::FocusWindow => return self.focus_regex_params(message),
            IntentLabel::AnalyzeImage => {
                params.set("prompt", DEFAULT_IMAGE_PROMPT);
            }
            IntentLabel::AnalyzeScreen => {
                params.set("prompt", DEFAULT_SCREEN_PROMPT);
            }
            // open_website é resolvido pelo resolvedor de URL; os demais
            // não carregam parâmetros
            IntentLabel::OpenWebsite
            | IntentLabel::PlayMusic
            | IntentLabel::ListWindows
            | IntentLabel::GeneralResponse => {}
        }
        params
    }

    /// Nome do aplicativo: diretório primeiro, token útil como fallback.
    ///
    /// A prioridade dentro do diretório é id → nome → keyword por
    /// entrada, na ordem do catálogo; `appName` recebe o **id** da
    /// entrada. Sem match, usa o primeiro token com mais de 2 caracteres
    /// que não seja stopword de abertura.
    pub fn open_app_params(&self, message: &str, apps: &AppDirectory) -> ParameterRecord {
        let mut params = ParameterRecord::new();
        if let Some(hit) = apps.find(message) {
            params.set("appName", hit.entry.id.clone());
            return params;
        }

        let lower = message.to_lowercase();
        let token = lower.split_whitespace().find(|word| {
            word.chars().count() > 2 && !OPEN_APP_STOPWORDS.contains(word)
        });
        if let Some(token) = token {
            params.set("appName", token);
        }
        params
    }

    /// Sub-ação de volume por substring; nenhuma casa → chave ausente.
    pub fn volume_params(&self, message: &str) -> ParameterRecord {
        let mut params = ParameterRecord::new();
        let lower = message.to_lowercase();
        for (needles, command) in VOLUME_RULES {
            if needles.iter().any(|n| lower.contains(n)) {
                params.set("command", *command);
                break;
            }
        }
        params
    }

    /// Alvo de foco apenas pela regex (sem consultar o diretório).
    pub fn focus_regex_params(&self, message: &str) -> ParameterRecord {
        let mut params = ParameterRecord::new();
        if let Some(cap) = self.focus_re.captures(message) {
            params.set("windowTitle", cap[1].trim());
        }
        params
    }
}

impl Default for ParamExtractor {
    fn default() -> Self {
        Self::new()
    }
}
