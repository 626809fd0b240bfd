use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::external::error::ExternalError;

/// Sentinels wrapped around the document text in every prompt so the model
/// can tell instruction from payload.
pub const INPUT_START: &str = "%%start";
pub const INPUT_END: &str = "%%end";

const INSTRUCT_PERSONA: &str = "You are Granite, an AI language model developed by IBM in 2024. \
    You are an insightful assistant, carefully analyzing the provided text to identify \
    the core themes, key topics, and important relationships.";

const CODE_PERSONA: &str = "You are an intelligent AI programming assistant, utilizing a Granite \
    code language model developed by IBM. Your primary function is to assist users in programming \
    tasks, including code generation, code explanation, code fixing, generating unit tests, \
    generating documentation, application modernization, vulnerability detection, function calling, \
    code translation, and all sorts of other software engineering tasks.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraniteConfig {
    pub endpoint: String,
    pub api_version: String,
    pub project_id: String,
    pub instruct_model: String,
    pub code_model: String,
    pub max_new_tokens: u32,
}

impl GraniteConfig {
    /// Get the full text-generation URL for the watsonx service
    pub fn generation_url(&self) -> Result<String> {
        let base = self.endpoint.trim_end_matches('/');
        let base = if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("https://{}", base)
        };
        let url = format!("{}/ml/v1/text/generation?version={}", base, self.api_version);

        // Validate the URL
        Url::parse(&url).map_err(|e| ExternalError::ConfigError(format!("Invalid URL: {}", e)))?;

        Ok(url)
    }
}

impl Default for GraniteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://us-south.ml.cloud.ibm.com".to_string(),
            api_version: "2023-05-29".to_string(),
            project_id: String::new(),
            instruct_model: "ibm/granite-3-8b-instruct".to_string(),
            code_model: "ibm/granite-34b-code-instruct".to_string(),
            max_new_tokens: 900,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    results: Vec<GenerationResult>,
}

/// Client for the watsonx.ai text-generation endpoint serving the Granite
/// instruct and code models.
pub struct GraniteClient {
    client: Client,
    config: GraniteConfig,
    token: String,
}

impl GraniteClient {
    pub fn new(config: GraniteConfig, token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(ExternalError::ConfigError(
                "watsonx bearer token must not be empty".to_string(),
            )
            .into());
        }
        if config.project_id.trim().is_empty() {
            return Err(
                ExternalError::ConfigError("watsonx project id must not be empty".to_string())
                    .into(),
            );
        }

        Ok(Self {
            client: Client::new(),
            config,
            token,
        })
    }

    /// Prompt for the instruct model, using its chat role tags.
    fn build_instruct_prompt(system_instruct: &str, input_text: &str) -> String {
        format!(
            "<|start_of_role|>system<|end_of_role|>{} {}<|end_of_text|>\n\
             <|start_of_role|>assistant<|end_of_role|>\n\n\
             {}\n{}\n{}\n",
            INSTRUCT_PERSONA, system_instruct, INPUT_START, input_text, INPUT_END
        )
    }

    /// Prompt for the code model, which expects a plain System/Answer layout.
    fn build_code_prompt(system_instruct: &str, input_text: &str) -> String {
        format!(
            "System:\n{}\n{}\n\n{}\n{}\n{}\nAnswer:\n",
            CODE_PERSONA, system_instruct, INPUT_START, input_text, INPUT_END
        )
    }

    async fn generate(&self, model_id: &str, prompt: String) -> Result<String> {
        let url = self.config.generation_url()?;

        let body = json!({
            "input": prompt,
            "parameters": {
                "decoding_method": "greedy",
                "max_new_tokens": self.config.max_new_tokens,
                "min_new_tokens": 0,
                "repetition_penalty": 1
            },
            "model_id": model_id,
            "project_id": self.config.project_id,
        });

        tracing::debug!(model_id, "Sending generation request to watsonx");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| ExternalError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalError::ApiError {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ExternalError::ResponseError(e.to_string()))?;

        let generated = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ExternalError::ResponseError("empty results array".to_string()))?;

        Ok(generated.generated_text)
    }

    /// Run the instruct model over the document text to extract themes,
    /// keywords and relationships.
    pub async fn generate_text(&self, system_instruct: &str, input_text: &str) -> Result<String> {
        if system_instruct.trim().is_empty() || input_text.trim().is_empty() {
            return Err(ExternalError::ConfigError(
                "system instruction and input text must both be provided".to_string(),
            )
            .into());
        }

        let prompt = Self::build_instruct_prompt(system_instruct, input_text);
        self.generate(&self.config.instruct_model, prompt).await
    }

    /// Run the code model to draft or repair a Cypher statement.
    pub async fn generate_code(&self, input_text: &str, system_instruct: &str) -> Result<String> {
        if system_instruct.trim().is_empty() || input_text.trim().is_empty() {
            return Err(ExternalError::ConfigError(
                "system instruction and input text must both be provided".to_string(),
            )
            .into());
        }

        let prompt = Self::build_code_prompt(system_instruct, input_text);
        self.generate(&self.config.code_model, prompt).await
    }
}
