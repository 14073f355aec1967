use crate::models::{Intent, IntentScore};

const CONNECTIVE: &str = "Além disso,";

pub fn template_for(intent: Intent) -> &'static str {
    match intent {
        Intent::TechnicalIssue => {
            "Olá! Percebemos que você tem um problema técnico. Nossa equipe irá analisar e responder em breve."
        }
        Intent::Complaint => {
            "Obrigado pelo seu contato. Recebemos sua reclamação e vamos verificar imediatamente."
        }
        Intent::Question => {
            "Agradecemos sua mensagem! Entendemos que se trata de uma dúvida. Nossa equipe responderá em breve."
        }
        Intent::Request => {
            "Recebemos sua solicitação e nossa equipe está analisando. Retornaremos em breve."
        }
        Intent::Compliment => {
            "Obrigado pelo seu elogio! Ficamos felizes em saber que você está satisfeito."
        }
        Intent::Thanks => {
            "Agradecemos sua mensagem! Estamos à disposição para ajudar sempre que precisar."
        }
        Intent::Greeting => {
            "Olá! Agradecemos por entrar em contato. Nossa equipe está à disposição."
        }
        Intent::Other => {
            "Não conseguimos identificar o assunto da sua mensagem. Por favor, poderia nos dar mais detalhes sobre o que você precisa? Assim, poderemos te ajudar melhor."
        }
    }
}

/// Unknown labels resolve to the `outros` template.
pub fn template_for_label(label: &str) -> &'static str {
    template_for(Intent::from_label(label).unwrap_or(Intent::Other))
}

/// Reply sent for every message classified as unproductive.
pub fn unproductive_reply() -> &'static str {
    template_for(Intent::Thanks)
}

/// Builds a reply from templates for the already-selected relevant intents.
pub fn compose_template_reply(relevant: &[IntentScore]) -> String {
    let mut actionable = relevant
        .iter()
        .filter(|entry| entry.intent.is_actionable())
        .collect::<Vec<_>>();
    actionable.sort_by(|lhs, rhs| {
        rhs.score
            .partial_cmp(&lhs.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    match actionable.as_slice() {
        [first, second, ..] => format!(
            "{} {} {}",
            template_for(first.intent),
            CONNECTIVE,
            template_for(second.intent).to_lowercase()
        ),
        [only] => template_for(only.intent).to_string(),
        [] => relevant
            .iter()
            .max_by(|lhs, rhs| {
                lhs.score
                    .partial_cmp(&rhs.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|entry| template_for(entry.intent))
            .unwrap_or_else(|| template_for(Intent::Other))
            .to_string(),
    }
}
