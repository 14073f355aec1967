use async_trait::async_trait;
use triage_core::{Intent, IntentScore, Sentiment};

use crate::{IntentClassifier, MlError, SentimentClassifier};

pub(crate) const LEXICON_SENTIMENT_MODEL: &str = "lexicon-sentiment-pt";
pub(crate) const KEYWORD_INTENT_MODEL: &str = "keyword-intent-pt";

const POSITIVE_WORDS: &[&str] = &[
    "obrigad",
    "agradeço",
    "agradecemos",
    "parabéns",
    "excelente",
    "ótimo",
    "otimo",
    "bom dia",
    "boa tarde",
    "boa noite",
    "gostei",
    "adorei",
    "satisfeit",
    "perfeito",
    "por favor",
];

const NEGATIVE_WORDS: &[&str] = &[
    "péssimo",
    "pessimo",
    "horrível",
    "horrivel",
    "absurdo",
    "vergonha",
    "ridículo",
    "ridiculo",
    "odeio",
    "lixo",
    "decepcion",
    "inaceitável",
    "nunca mais",
    "cancelar tudo",
];

const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::TechnicalIssue,
        &[
            "erro",
            "não consigo",
            "nao consigo",
            "não funciona",
            "nao funciona",
            "travou",
            "trava",
            "bug",
            "falha",
            "senha",
            "acessar",
            "login",
            "sistema",
            "fora do ar",
        ],
    ),
    (
        Intent::Complaint,
        &[
            "reclamação",
            "reclamar",
            "insatisfeit",
            "demora",
            "atraso",
            "atrasad",
            "cobrança indevida",
            "cobrado",
            "ninguém responde",
            "problema com",
        ],
    ),
    (
        Intent::Question,
        &[
            "dúvida",
            "duvida",
            "como faço",
            "como posso",
            "gostaria de saber",
            "qual",
            "quando",
            "onde",
            "?",
        ],
    ),
    (
        Intent::Request,
        &[
            "solicito",
            "solicitação",
            "gostaria de",
            "preciso",
            "poderia",
            "podem",
            "envie",
            "enviar",
            "atualizar",
            "status",
            "segunda via",
        ],
    ),
    (
        Intent::Compliment,
        &["parabéns", "excelente", "ótimo atendimento", "adorei", "gostei", "elogi"],
    ),
    (
        Intent::Thanks,
        &["obrigad", "agradeço", "agradecemos", "valeu", "grato", "grata"],
    ),
    (
        Intent::Greeting,
        &["olá", "ola ", "oi ", "bom dia", "boa tarde", "boa noite", "feliz natal", "boas festas"],
    ),
];

/// Counts positive and negative cue words; ties are neutral.
#[derive(Debug, Clone, Default)]
pub struct LexiconSentimentClassifier;

#[async_trait]
impl SentimentClassifier for LexiconSentimentClassifier {
    fn model_name(&self) -> &str {
        LEXICON_SENTIMENT_MODEL
    }

    async fn classify(&self, text: &str) -> Result<Sentiment, MlError> {
        let lower = text.to_lowercase();
        let positive = count_hits(&lower, POSITIVE_WORDS);
        let negative = count_hits(&lower, NEGATIVE_WORDS);

        Ok(match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        })
    }
}

/// Keyword scorer that mimics a multi-label classifier: each label is scored
/// independently from the number of its cue words found in the text.
#[derive(Debug, Clone, Default)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    fn score_label(intent: Intent, lower: &str) -> f32 {
        let hits = INTENT_KEYWORDS
            .iter()
            .find(|(candidate, _)| *candidate == intent)
            .map(|(_, keywords)| count_hits(lower, keywords))
            .unwrap_or(0);

        if hits == 0 {
            0.05
        } else {
            1.0 - 0.5_f32.powi(hits as i32 + 1)
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    fn model_name(&self) -> &str {
        KEYWORD_INTENT_MODEL
    }

    async fn score(&self, text: &str, labels: &[Intent]) -> Result<Vec<IntentScore>, MlError> {
        let lower = format!("{} ", text.to_lowercase());

        let mut scores = labels
            .iter()
            .filter(|intent| **intent != Intent::Other)
            .map(|intent| IntentScore::new(*intent, Self::score_label(*intent, &lower)))
            .collect::<Vec<_>>();

        if labels.contains(&Intent::Other) {
            let anything_matched = scores.iter().any(|entry| entry.score > 0.5);
            let other_score = if anything_matched { 0.05 } else { 0.5 };
            scores.push(IntentScore::new(Intent::Other, other_score));
        }

        scores.sort_by(|lhs, rhs| {
            rhs.score
                .partial_cmp(&lhs.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(scores)
    }
}

fn count_hits(input: &str, needles: &[&str]) -> usize {
    needles.iter().filter(|needle| input.contains(*needle)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lexicon_detects_negative_tone() {
        let sentiment = LexiconSentimentClassifier
            .classify("atendimento péssimo, um absurdo o que fizeram")
            .await
            .unwrap();
        assert_eq!(sentiment, Sentiment::Negative);
    }

    #[tokio::test]
    async fn lexicon_defaults_to_neutral() {
        let sentiment = LexiconSentimentClassifier
            .classify("segue em anexo o relatório do mês")
            .await
            .unwrap();
        assert_eq!(sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn keyword_scorer_ranks_technical_issue_first() {
        let scores = KeywordIntentClassifier
            .score(
                "não consigo acessar o sistema, aparece erro de login",
                &Intent::ALL,
            )
            .await
            .unwrap();
        assert_eq!(scores.len(), Intent::ALL.len());
        assert_eq!(scores[0].intent, Intent::TechnicalIssue);
        assert!(scores[0].score > 0.9);
    }

    #[tokio::test]
    async fn unmatched_text_scores_other() {
        let scores = KeywordIntentClassifier
            .score("segue em anexo o relatório do mês", &Intent::ALL)
            .await
            .unwrap();
        assert_eq!(scores[0].intent, Intent::Other);
        assert!(scores[0].score > 0.3);
    }

    #[tokio::test]
    async fn only_requested_labels_are_scored() {
        let scores = KeywordIntentClassifier
            .score("obrigado pela ajuda", &[Intent::Thanks, Intent::Request])
            .await
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].intent, Intent::Thanks);
    }
}
