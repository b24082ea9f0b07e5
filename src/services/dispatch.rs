use crate::config::{GeminiSettings, CREDENTIAL_ENV_VAR};
use crate::core::PromptBuilder;
use crate::models::DispatchRequest;
use crate::services::gemini::{GeminiClient, GeminiError};
use thiserror::Error;
use validator::Validate;

/// Returned when the model answers without any text
pub const NO_RESPONSE_PLACEHOLDER: &str = "Nessuna risposta dall'AI.";

/// Failures of a dispatch, each mapped to one HTTP status at the boundary
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("GEMINI_API_KEY non configurata")]
    MissingCredential,

    #[error("Richiesta non valida")]
    InvalidRequest(String),

    #[error("Richiesta troppo grande")]
    PayloadTooLarge { limit: usize },

    #[error("Errore nella risposta dell'AI")]
    Upstream { status: u16, body: String },

    #[error("Errore interno del server")]
    Internal(String),
}

impl DispatchError {
    /// Diagnostic detail shown under the message
    pub fn details(&self) -> Option<String> {
        match self {
            DispatchError::MissingCredential => Some(format!(
                "Aggiungi {CREDENTIAL_ENV_VAR} nell'ambiente del servizio (o nel file .env) per abilitare l'AI Dispatch. Puoi ottenere una chiave su https://aistudio.google.com/"
            )),
            DispatchError::InvalidRequest(details) | DispatchError::Internal(details) => {
                Some(details.clone())
            }
            DispatchError::PayloadTooLarge { limit } => Some(format!(
                "Il corpo della richiesta supera il limite di {} byte",
                limit
            )),
            DispatchError::Upstream { body, .. } => Some(body.clone()),
        }
    }
}

impl From<GeminiError> for DispatchError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::ApiError { status, body } => DispatchError::Upstream { status, body },
            other => DispatchError::Internal(other.to_string()),
        }
    }
}

/// Prompt builder plus the upstream client, when a credential is configured
pub struct Dispatcher {
    client: Option<GeminiClient>,
    prompts: PromptBuilder,
}

impl Dispatcher {
    pub fn new(settings: &GeminiSettings) -> Result<Self, DispatchError> {
        let client = settings
            .api_key()
            .map(|key| GeminiClient::new(settings, key))
            .transpose()?;

        Ok(Self {
            client,
            prompts: PromptBuilder::new(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Fails with the setup instructions when no API key is configured
    pub fn ensure_configured(&self) -> Result<(), DispatchError> {
        self.client
            .as_ref()
            .map(|_| ())
            .ok_or(DispatchError::MissingCredential)
    }

    /// Relay a raw request body: credential check, parse, validate, dispatch
    ///
    /// The credential is checked before the body is looked at, so a missing
    /// key is reported the same way whatever the client sent.
    pub async fn relay(&self, body: &[u8]) -> Result<String, DispatchError> {
        let client = self.client.as_ref().ok_or(DispatchError::MissingCredential)?;
        let request = parse_request(body)?;
        self.dispatch_with(client, &request).await
    }

    async fn dispatch_with(
        &self,
        client: &GeminiClient,
        request: &DispatchRequest,
    ) -> Result<String, DispatchError> {
        let request_id = uuid::Uuid::new_v4();
        let summary = request.context.summary();

        tracing::info!(
            "[{}] Dispatching query ({} drivers, {} available; {} vehicles, {} available; {} trips, {} open)",
            request_id,
            summary.drivers_total,
            summary.drivers_available,
            summary.vehicles_total,
            summary.vehicles_available,
            summary.trips_total,
            summary.trips_open
        );

        let prompt = self.prompts.build(&request.user_query, &request.context);

        match client.generate(&prompt).await {
            Ok(Some(text)) => {
                tracing::info!("[{}] AI response received ({} chars)", request_id, text.chars().count());
                Ok(text)
            }
            Ok(None) => {
                tracing::warn!("[{}] AI response contained no text", request_id);
                Ok(NO_RESPONSE_PLACEHOLDER.to_string())
            }
            Err(GeminiError::ApiError { status, body }) => {
                tracing::error!("[{}] Gemini API error ({}): {}", request_id, status, body);
                Err(DispatchError::Upstream { status, body })
            }
            Err(e) => {
                tracing::error!("[{}] AI dispatch error: {}", request_id, e);
                Err(e.into())
            }
        }
    }
}

/// Decode and validate a request body
pub fn parse_request(body: &[u8]) -> Result<DispatchRequest, DispatchError> {
    let request: DispatchRequest = serde_json::from_slice(body)
        .map_err(|e| DispatchError::InvalidRequest(format!("Invalid JSON: {}", e)))?;
    request
        .validate()
        .map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;
    Ok(request)
}
