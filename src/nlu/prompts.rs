//! # Prompts — Templates de Instrução para o Modelo
//!
//! Todos os textos enviados ao gateway vivem aqui, como constantes ou
//! funções que interpolam a mensagem e o contexto. Três famílias:
//!
//! | Prompt | Chamada | Saída esperada |
//! |--------|---------|----------------|
//! | [`SYSTEM_PROMPT`] | resposta genérica | texto livre do assistente |
//! | [`action_prompt()`] | classificação (Fase 2) | um único token do conjunto fechado |
//! | [`url_prompt()`] | resolução de URL | URL absoluta ou `NOT_FOUND` |
//!
//! Os prompts são em português porque o assistente conversa em PT-BR;
//! os tokens de ação são em caixa alta para facilitar o parse exato.

/// Prompt de sistema da resposta genérica do assistente.
///
/// Instrui o modelo a usar o contexto da conversa (análises anteriores,
/// perguntas de acompanhamento) e a responder curto quando a mensagem é
/// um comando de ação.
pub const SYSTEM_PROMPT: &str = "\
Você é um assistente pessoal inteligente para PC. Responda de forma natural e útil.

INSTRUÇÕES CRÍTICAS:
1. SEMPRE leia o contexto da conversa anterior antes de responder
2. Se o usuário fizer perguntas sobre análises anteriores (como \"qual é a cidade?\", \"sabe qual cidade?\", \"ele é famoso?\"), use as informações das análises anteriores para responder
3. NUNCA diga que não analisou algo se no contexto há uma análise anterior
4. Use as informações que estão no contexto da conversa para responder perguntas
5. Se não conseguir identificar algo específico nas análises anteriores, seja honesto mas use o que você tem

EXEMPLO:
- Se no contexto há \"A imagem mostra um edifício de vidro e metal com cúpulas\"
- E o usuário pergunta \"sabe qual cidade?\"
- Responda com base na análise anterior, admitindo o que não dá para identificar só pela imagem

EXEMPLO DE PERGUNTAS SOBRE MÚSICA:
- Se o usuário pergunta \"gosta de nirvana?\" ou \"qual a melhor musica deles?\"
- Responda normalmente sobre a banda, sem executar ações

Quando o usuário pedir para:
- Abrir programas: responda normalmente e mencione que vai abrir o programa
- Tocar música: responda normalmente e mencione que vai tocar música
- Pesquisar algo: responda normalmente e mencione que vai pesquisar
- Controlar volume: responda normalmente e mencione que vai ajustar o volume
- Analisar tela: responda brevemente que vai analisar a tela

IMPORTANTE: Para análise de tela, responda apenas \"Vou analisar sua tela agora\" ou similar. Não dê explicações longas.

Seja sempre útil, amigável e direto. Não use formato JSON, apenas responda como um assistente real.";

/// Resposta usada quando a chamada de resposta genérica falha.
pub const FALLBACK_REPLY: &str = "Desculpe, não consegui processar sua solicitação.";

/// Confirmação curta exibida no lugar da resposta para análise de imagem.
pub const IMAGE_ACK: &str = "Vou analisar a imagem para você.";

/// Confirmação curta exibida no lugar da resposta para análise de tela.
pub const SCREEN_ACK: &str = "Vou analisar sua tela agora.";

/// Prompt padrão anexado quando o usuário não descreve o que quer da imagem.
pub const DEFAULT_IMAGE_PROMPT: &str = "Descreva o que você vê nesta imagem";

/// Prompt padrão anexado quando o usuário não descreve o que quer da tela.
pub const DEFAULT_SCREEN_PROMPT: &str = "Descreva o que você vê nesta tela";

/// Texto usado quando a requisição não trouxe contexto de conversa.
const NO_CONTEXT: &str = "Nenhum contexto disponível";

fn context_or_placeholder(context: &str) -> &str {
    if context.trim().is_empty() {
        NO_CONTEXT
    } else {
        context
    }
}

/// Prompt de classificação de ação (Fase 2).
///
/// Enumera o conjunto fechado de tokens e martela que conversa normal —
/// cumprimentos, perguntas sobre análises anteriores, opiniões sobre
/// música, frustrações — deve sempre virar `NONE`.
pub fn action_prompt(message: &str, context: &str) -> String {
    format!(
        "O usuário disse: \"{message}\"

CONTEXTO DA CONVERSA: {context}

Você é um assistente que precisa distinguir entre CONVERSA NORMAL e COMANDOS ESPECÍFICOS.

IMPORTANTE: SE FOR CONVERSA NORMAL, SEMPRE RESPONDA NONE

CONVERSA NORMAL = NONE (sempre):
- Cumprimentos: \"olá\", \"bom dia\", \"oi\", \"boa tarde\", \"boa noite\"
- Perguntas sobre análises anteriores: \"oq significa?\", \"qual console?\", \"sabe qual cidade?\"
- Perguntas sobre música: \"gosta de nirvana?\", \"qual a melhor musica deles?\"
- Perguntas sobre significado: \"o que significa?\", \"oq significa?\"
- Frustrações e desabafos do usuário
- Qualquer pergunta que não seja um comando específico
- Qualquer conversa normal

COMANDOS ESPECÍFICOS (responda a ação correspondente):
- \"abrir calculadora\" → APP
- \"abrir paint\" → APP
- \"abrir youtube\" → SITE
- \"pesquisar no youtube\" → SITE
- \"coloque nirvana no youtube\" → SITE
- \"analisar tela\" → ANALYZE_SCREEN
- \"tirar screenshot\" → SCREENSHOT
- \"tocar música\" → MUSIC
- \"aumentar volume\" → VOLUME
- \"diminuir volume\" → VOLUME
- \"listar janelas\" → LIST_WINDOWS
- \"fechar janela\" → CLOSE_WINDOW
- \"executar comando\" → RUN_COMMAND
- \"focar janela\" → FOCUS
- \"analise a imagem: [caminho]\" → ANALYZE_IMAGE

REGRA DE OURO:
- SE FOR CONVERSA NORMAL = NONE (sempre)
- SE NÃO FOR UM COMANDO ESPECÍFICO E CLARO = NONE
- EM DÚVIDA = NONE

Responda APENAS com uma das opções abaixo (sem explicações):
SITE
APP
SCREENSHOT
MUSIC
LIST_WINDOWS
CLOSE_WINDOW
RUN_COMMAND
VOLUME
FOCUS
ANALYZE_IMAGE
ANALYZE_SCREEN
NONE",
        message = message,
        context = context_or_placeholder(context),
    )
}

/// Prompt de resolução de URL para a intenção de abrir site.
///
/// Pede uma URL absoluta ou o token literal `NOT_FOUND`, com exemplos
/// de sites comuns e a regra de construir URL de busca quando a
/// mensagem contém \"pesquisar\"/\"buscar\"/\"procurar\"/\"search\".
pub fn url_prompt(message: &str, context: &str) -> String {
    format!(
        "O usuário quer acessar um site. Baseado na mensagem \"{message}\" e no contexto da conversa, encontre a URL correta do site.

CONTEXTO DA CONVERSA: {context}

Responda APENAS com a URL completa no formato: https://exemplo.com
Se não conseguir encontrar, responda: NOT_FOUND

Exemplos:
\"abrir youtube\" → https://www.youtube.com
\"acessar steam\" → https://store.steampowered.com
\"abrir facebook\" → https://www.facebook.com
\"acessar github\" → https://github.com
\"ir para netflix\" → https://www.netflix.com
\"abrir discord\" → https://discord.com
\"acessar twitch\" → https://www.twitch.tv
\"ir para reddit\" → https://www.reddit.com
\"abrir whatsapp\" → https://web.whatsapp.com
\"acessar spotify\" → https://www.spotify.com
\"ir para google\" → https://www.google.com

Para pesquisas no YouTube, use: https://www.youtube.com/results?search_query=TERMO_DE_PESQUISA
Para pesquisas no Google, use: https://www.google.com/search?q=TERMO_DE_PESQUISA

IMPORTANTE: Se o usuário mencionar \"pesquisar\", \"buscar\", \"procurar\" ou \"search\", construa a URL de pesquisa!
Exemplo: \"youtube e pesquisar sobre xbox\" → https://www.youtube.com/results?search_query=xbox

CONTEXTO: Se o usuário estava falando sobre um assunto específico, use esse contexto para entender o que ele quer pesquisar!",
        message = message,
        context = context_or_placeholder(context),
    )
}

/// Prompt de análise de sentimento/intenção de um texto avulso.
pub fn analysis_prompt(text: &str) -> String {
    format!(
        "Analise o seguinte texto e forneça:
1. Sentimento (positivo, negativo, neutro)
2. Intenção principal
3. Ações sugeridas
4. Nível de urgência (baixo, médio, alto)

Texto: \"{text}\""
    )
}

/// Prompt de melhoria de query de pesquisa.
pub fn search_prompt(query: &str) -> String {
    format!(
        "Melhore esta query de pesquisa para obter melhores resultados: \"{query}\". \
Retorne apenas a query melhorada, sem explicações."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_prompt_embeds_message_and_placeholder() {
        let prompt = action_prompt("abrir youtube", "");
        assert!(prompt.contains("\"abrir youtube\""));
        assert!(prompt.contains(NO_CONTEXT));
        assert!(prompt.contains("NONE"));
    }

    #[test]
    fn action_prompt_embeds_context_when_present() {
        let prompt = action_prompt("oi", "Usuário: oi");
        assert!(prompt.contains("Usuário: oi"));
        assert!(!prompt.contains(NO_CONTEXT));
    }

    #[test]
    fn url_prompt_keeps_not_found_contract() {
        let prompt = url_prompt("abrir youtube", "");
        assert!(prompt.contains("NOT_FOUND"));
        assert!(prompt.contains("search_query="));
    }
}
