//! # Parser de Contexto — Transcrição Plana → Turnos
//!
//! O frontend envia o histórico da conversa como um blob de texto com
//! uma linha por turno, prefixada pelo papel:
//!
//! ```text
//! Usuário: analise minha tela
//! Assistente: Vou analisar sua tela agora.
//! ```
//!
//! Este módulo converte o blob em turnos ordenados ([`ChatTurn`]) para
//! reenvio à API de completion. Linhas em branco e linhas sem prefixo
//! reconhecido são descartadas em silêncio — entrada malformada nunca é
//! erro, no pior caso o resultado é vazio.

use crate::gateway::ChatTurn;

/// Prefixo de turno do usuário na transcrição.
const USER_PREFIX: &str = "Usuário:";

/// Prefixo de turno do assistente na transcrição.
const ASSISTANT_PREFIX: &str = "Assistente:";

/// Máximo de turnos repassados ao modelo por requisição.
///
/// Turnos mais antigos são descartados; nada é persistido no servidor.
pub const MAX_CONTEXT_TURNS: usize = 10;

/// Converte a transcrição plana em turnos ordenados.
///
/// Cada linha é aparada antes do teste de prefixo, então variações de
/// espaço em branco no início/fim não afetam o parse. O conteúdo do
/// turno é o restante da linha, também aparado.
pub fn parse_context(context: &str) -> Vec<ChatTurn> {
    let mut turns = Vec::new();
    for line in context.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(USER_PREFIX) {
            turns.push(ChatTurn::user(rest.trim()));
        } else if let Some(rest) = line.strip_prefix(ASSISTANT_PREFIX) {
            turns.push(ChatTurn::assistant(rest.trim()));
        }
        // linhas sem prefixo reconhecido são descartadas
    }
    turns
}

/// Limita aos últimos [`MAX_CONTEXT_TURNS`] turnos, preservando a ordem.
pub fn bounded(turns: Vec<ChatTurn>) -> Vec<ChatTurn> {
    if turns.len() <= MAX_CONTEXT_TURNS {
        return turns;
    }
    let skip = turns.len() - MAX_CONTEXT_TURNS;
    turns.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ChatRole;

    #[test]
    fn round_trip_two_turns() {
        let turns = parse_context("Usuário: oi\nAssistente: olá\n");
        assert_eq!(
            turns,
            vec![ChatTurn::user("oi"), ChatTurn::assistant("olá")]
        );
    }

    #[test]
    fn whitespace_variations_do_not_matter() {
        let turns = parse_context("  Usuário:   oi  \n\n   Assistente: olá   ");
        assert_eq!(
            turns,
            vec![ChatTurn::user("oi"), ChatTurn::assistant("olá")]
        );
    }

    #[test]
    fn unknown_prefixes_are_dropped() {
        let turns = parse_context("Sistema: boot\nUsuário: oi\nlinha solta\n");
        assert_eq!(turns, vec![ChatTurn::user("oi")]);
    }

    #[test]
    fn empty_input_yields_empty() {
        assert!(parse_context("").is_empty());
        assert!(parse_context("\n\n  \n").is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let turns = parse_context("Assistente: a\nUsuário: b\nAssistente: c");
        assert_eq!(turns[0].role, ChatRole::Assistant);
        assert_eq!(turns[1].role, ChatRole::User);
        assert_eq!(turns[2].content, "c");
    }

    #[test]
    fn bounded_keeps_last_ten() {
        let turns: Vec<ChatTurn> = (0..14).map(|i| ChatTurn::user(format!("m{i}"))).collect();
        let bounded = bounded(turns);
        assert_eq!(bounded.len(), MAX_CONTEXT_TURNS);
        assert_eq!(bounded[0].content, "m4");
        assert_eq!(bounded[9].content, "m13");
    }

    #[test]
    fn bounded_is_noop_when_short() {
        let turns = vec![ChatTurn::user("a"), ChatTurn::assistant("b")];
        assert_eq!(bounded(turns.clone()), turns);
    }
}
