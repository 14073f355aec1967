use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Produtivo")]
    Productive,
    #[serde(rename = "Improdutivo")]
    Unproductive,
}

impl Category {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Productive => "Produtivo",
            Self::Unproductive => "Improdutivo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Accepts the short `POS`/`NEU`/`NEG` labels as well as spelled-out names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pos" | "positive" | "positivo" => Some(Self::Positive),
            "neu" | "neutral" | "neutro" => Some(Self::Neutral),
            "neg" | "negative" | "negativo" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Positive => "POS",
            Self::Neutral => "NEU",
            Self::Negative => "NEG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    TechnicalIssue,
    Complaint,
    Question,
    Request,
    Compliment,
    Thanks,
    Greeting,
    Other,
}

impl Intent {
    /// Candidate label order sent to the zero-shot model.
    pub const ALL: [Intent; 8] = [
        Intent::TechnicalIssue,
        Intent::Complaint,
        Intent::Question,
        Intent::Request,
        Intent::Compliment,
        Intent::Thanks,
        Intent::Greeting,
        Intent::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TechnicalIssue => "problema técnico",
            Self::Complaint => "reclamação",
            Self::Question => "dúvida",
            Self::Request => "solicitação",
            Self::Compliment => "elogio",
            Self::Thanks => "agradecimento",
            Self::Greeting => "saudação",
            Self::Other => "outros",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|intent| intent.label() == value)
    }

    /// Compliments, thanks and greetings need no action from the support team.
    pub fn is_courteous(self) -> bool {
        matches!(self, Self::Compliment | Self::Thanks | Self::Greeting)
    }

    pub fn is_actionable(self) -> bool {
        !self.is_courteous()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: Intent,
    pub score: f32,
}

impl IntentScore {
    pub fn new(intent: Intent, score: f32) -> Self {
        Self { intent, score }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    TooShort,
    Offensive,
    Spam,
    NegativeSentiment,
    Classified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Template,
    Generative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub category: Category,
    pub reply: String,
    pub reason: OutcomeReason,
    pub sentiment: Option<Sentiment>,
    pub intents: Vec<IntentScore>,
    pub reply_source: ReplySource,
}

impl TriageOutcome {
    pub fn unproductive(reason: OutcomeReason, reply: impl Into<String>) -> Self {
        Self {
            category: Category::Unproductive,
            reply: reply.into(),
            reason,
            sentiment: None,
            intents: Vec::new(),
            reply_source: ReplySource::Template,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email_text: Option<String>,
}

/// Public response body; field names are part of the HTTP contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResponse {
    pub categoria: Category,
    pub resposta: String,
}

impl From<TriageOutcome> for TriageResponse {
    fn from(outcome: TriageOutcome) -> Self {
        Self {
            categoria: outcome.category,
            resposta: outcome.reply,
        }
    }
}
