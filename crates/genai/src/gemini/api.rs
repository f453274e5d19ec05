use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};

use crate::types::{GeminiClient, InlineImage};

use super::models::{GeminiResponse, ImagenResponse};

pub fn text_part(text: &str) -> Value {
    json!({ "text": text })
}

pub fn inline_image_part(mime_type: &str, data_b64: &str) -> Value {
    json!({
        "inlineData": {
            "mimeType": mime_type,
            "data": data_b64
        }
    })
}

pub fn user_content(parts: Vec<Value>) -> Value {
    json!({
        "role": "user",
        "parts": parts
    })
}

pub async fn send_generate_content(
    client: &GeminiClient,
    model: &str,
    contents: Vec<Value>,
    generation_config: Option<Value>,
) -> Result<GeminiResponse> {
    let endpoint = client.endpoint().trim_end_matches('/');
    let url = format!("{}/{}:generateContent", endpoint, model);

    let mut body = json!({ "contents": contents });
    if let Some(config) = generation_config {
        body["generationConfig"] = config;
    }

    let response_text = client
        .http
        .post(url)
        .header("x-goog-api-key", client.api_key())
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .context("HTTP request failed")?
        .error_for_status()
        .context("Non-success status returned")?
        .text()
        .await
        .context("Reading response body failed")?;

    let response: GeminiResponse = serde_json::from_str(&response_text).with_context(|| {
        format!(
            "Failed to decode Gemini response JSON. Raw response: {}",
            response_text
        )
    })?;

    Ok(response)
}

pub async fn send_predict(
    client: &GeminiClient,
    model: &str,
    prompt: &str,
    aspect_ratio: &str,
    output_mime_type: &str,
) -> Result<ImagenResponse> {
    let endpoint = client.endpoint().trim_end_matches('/');
    let url = format!("{}/{}:predict", endpoint, model);

    let body = json!({
        "instances": [{ "prompt": prompt }],
        "parameters": {
            "sampleCount": 1,
            "aspectRatio": aspect_ratio,
            "outputMimeType": output_mime_type
        }
    });

    let response_text = client
        .http
        .post(url)
        .header("x-goog-api-key", client.api_key())
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .context("HTTP request failed")?
        .error_for_status()
        .context("Non-success status returned")?
        .text()
        .await
        .context("Reading response body failed")?;

    let response: ImagenResponse = serde_json::from_str(&response_text).with_context(|| {
        format!(
            "Failed to decode Imagen response JSON. Raw response: {}",
            response_text
        )
    })?;

    Ok(response)
}

/// Concatenated text parts of the first candidate.
pub fn response_to_text(response: &GeminiResponse) -> Result<String> {
    if let Some(candidate) = response.candidates.first() {
        let mut full_text = String::new();
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                full_text.push_str(text);
            }
        }
        Ok(full_text)
    } else {
        Err(anyhow!("No candidates found"))
    }
}

/// First non-empty inline image across all candidates.
pub fn response_to_inline_image(response: &GeminiResponse) -> Option<InlineImage> {
    response
        .candidates
        .iter()
        .flat_map(|candidate| candidate.content.parts.iter())
        .find_map(|part| {
            let inline_data = part.inline_data.as_ref()?;
            let data = inline_data.data.trim();
            if data.is_empty() {
                return None;
            }
            Some(InlineImage {
                mime_type: inline_data.mime_type.clone(),
                data: data.to_string(),
            })
        })
}

/// Generates plain text from a prompt, e.g. for translation.
pub async fn generate_text(client: &GeminiClient, model: &str, prompt: &str) -> Result<String> {
    let contents = vec![user_content(vec![text_part(prompt)])];
    let response = send_generate_content(client, model, contents, None).await?;
    let text = response_to_text(&response)?;
    Ok(text.trim().to_string())
}

/// Generates a single image from a prompt via an Imagen model.
pub async fn generate_image(
    client: &GeminiClient,
    model: &str,
    prompt: &str,
    aspect_ratio: &str,
    output_mime_type: &str,
) -> Result<InlineImage> {
    let response = send_predict(client, model, prompt, aspect_ratio, output_mime_type).await?;

    response
        .predictions
        .into_iter()
        .find_map(|prediction| {
            let data = prediction.bytes_base64_encoded?;
            let data = data.trim();
            if data.is_empty() {
                return None;
            }
            Some(InlineImage {
                mime_type: prediction
                    .mime_type
                    .unwrap_or_else(|| output_mime_type.to_string()),
                data: data.to_string(),
            })
        })
        .ok_or_else(|| anyhow!("No image was generated."))
}

/// Applies a textual instruction to a source image and returns the edited image.
pub async fn edit_image(
    client: &GeminiClient,
    model: &str,
    source_mime_type: &str,
    source_data_b64: &str,
    instruction: &str,
) -> Result<InlineImage> {
    let contents = vec![user_content(vec![
        inline_image_part(source_mime_type, source_data_b64),
        text_part(instruction),
    ])];
    let config = json!({ "responseModalities": ["IMAGE"] });

    let response = send_generate_content(client, model, contents, Some(config)).await?;

    response_to_inline_image(&response)
        .ok_or_else(|| anyhow!("No image was generated in the edit response."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_first_candidate() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [{ "text": "A red " }, { "text": "balloon" }],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }],
                "modelVersion": "gemini-2.5-flash"
            }"#,
        )
        .unwrap();

        assert_eq!(response_to_text(&response).unwrap(), "A red balloon");
    }

    #[test]
    fn text_extraction_fails_without_candidates() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(response_to_text(&response).is_err());
    }

    #[test]
    fn finds_inline_image_after_text_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [
                            { "text": "Here is your edit:" },
                            { "inlineData": { "mimeType": "image/png", "data": "aW1n" } }
                        ]
                    }
                }]
            }"#,
        )
        .unwrap();

        let image = response_to_inline_image(&response).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "aW1n");
    }

    #[test]
    fn skips_empty_inline_image_data() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [{ "inlineData": { "mimeType": "image/png", "data": "  " } }]
                    }
                }]
            }"#,
        )
        .unwrap();

        assert!(response_to_inline_image(&response).is_none());
    }

    #[test]
    fn decodes_imagen_predictions() {
        let response: ImagenResponse = serde_json::from_str(
            r#"{
                "predictions": [
                    { "bytesBase64Encoded": "aW1n", "mimeType": "image/jpeg" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.predictions.len(), 1);
        assert_eq!(
            response.predictions[0].bytes_base64_encoded.as_deref(),
            Some("aW1n")
        );
    }

    #[test]
    fn imagen_response_tolerates_missing_predictions() {
        let response: ImagenResponse = serde_json::from_str("{}").unwrap();
        assert!(response.predictions.is_empty());
    }
}
