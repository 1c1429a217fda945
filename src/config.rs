//! # Diretório de Aplicativos — Configuração Estática
//!
//! Carrega o catálogo de aplicativos conhecidos de `config/apps.json`
//! e expõe o [`AppDirectory`]: uma tabela **imutável** de palavras-chave
//! para identidade de aplicativo, usada pelo classificador para
//! reconhecer menções a programas em texto livre.
//!
//! ## Formato do Arquivo
//!
//! ```json
//! {
//!   "apps": [
//!     { "id": "chrome", "name": "Google Chrome", "keywords": ["navegador", "browser"] }
//!   ]
//! }
//! ```
//!
//! A lista é **ordenada**: na busca, a primeira entrada que casar vence.
//! Dentro de cada entrada, a prioridade é `id` → `name` → cada keyword,
//! nessa ordem.
//!
//! ## Degradação
//!
//! Falha de leitura ou parse **não derruba o processo** — o diretório
//! degrada para vazio (toda busca falha) e um warning é logado. O
//! diretório é carregado uma única vez em `main` e compartilhado via
//! `Arc`; recarregar exige reiniciar o processo.

use std::path::Path;

use serde::Deserialize;

/// Caminho padrão do catálogo de aplicativos (relativo à raiz do projeto).
pub const APPS_CONFIG_PATH: &str = "config/apps.json";

/// Uma entrada do catálogo: identidade de um aplicativo e seus apelidos.
#[derive(Clone, Debug, Deserialize)]
pub struct AppEntry {
    /// Identificador estável do aplicativo (ex: "chrome").
    pub id: String,
    /// Nome de exibição (ex: "Google Chrome").
    pub name: String,
    /// Palavras-chave adicionais que o usuário pode usar para se referir
    /// ao aplicativo, em ordem de prioridade.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Resultado de uma busca no diretório.
///
/// Além da entrada, carrega o **token que casou** (id, nome ou keyword,
/// como escrito no catálogo) — o extrator de screenshot/foco usa esse
/// token como título de janela.
#[derive(Clone, Copy, Debug)]
pub struct AppMatch<'a> {
    /// A entrada do catálogo que casou.
    pub entry: &'a AppEntry,
    /// O token específico (id, name ou keyword) encontrado na mensagem.
    pub matched: &'a str,
}

/// Tabela imutável de aplicativos conhecidos.
///
/// Construída uma vez na inicialização e injetada no classificador —
/// nunca mutada depois, portanto segura para compartilhar entre
/// requisições concorrentes sem lock.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppDirectory {
    #[serde(default)]
    apps: Vec<AppEntry>,
}

impl AppDirectory {
    /// Carrega o diretório do disco, degradando para vazio em qualquer falha.
    ///
    /// Arquivo ausente, ilegível ou JSON malformado produzem um diretório
    /// vazio com warning — o serviço continua funcionando, apenas sem
    /// reconhecimento de aplicativos.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Falha ao ler catálogo de apps, iniciando vazio");
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(directory) => directory,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Catálogo de apps malformado, iniciando vazio");
                Self::default()
            }
        }
    }

    /// Constrói um diretório a partir de entradas já montadas.
    ///
    /// Usado nos testes para injetar catálogos-fixture sem tocar o disco.
    pub fn from_entries(apps: Vec<AppEntry>) -> Self {
        Self { apps }
    }

    /// Número de entradas carregadas.
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// `true` se nenhuma entrada foi carregada.
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Procura a primeira entrada mencionada na mensagem.
    ///
    /// Comparação por **substring case-insensitive**: para cada entrada,
    /// na ordem do catálogo, verifica `id`, depois `name`, depois cada
    /// keyword. A primeira ocorrência vence e a busca para.
    pub fn find(&self, message: &str) -> Option<AppMatch<'_>> {
        let lower = message.to_lowercase();
        for entry in &self.apps {
            if lower.contains(&entry.id.to_lowercase()) {
                return Some(AppMatch {
                    entry,
                    matched: &entry.id,
                });
            }
            if lower.contains(&entry.name.to_lowercase()) {
                return Some(AppMatch {
                    entry,
                    matched: &entry.name,
                });
            }
            for keyword in &entry.keywords {
                if lower.contains(&keyword.to_lowercase()) {
                    return Some(AppMatch {
                        entry,
                        matched: keyword,
                    });
                }
            }
        }
        None
    }
}
