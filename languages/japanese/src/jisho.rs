use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use yomi_core::lookup::{Lookup, LookupError};
use yomi_types::Entry;

/// Remote lookup against the Jisho word search API
#[derive(Clone)]
pub struct JishoClient {
    client: reqwest::Client,
    api_url: String,
}

impl JishoClient {
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self { client, api_url })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<WordData>,
}

#[derive(Debug, Deserialize)]
struct WordData {
    #[serde(default)]
    japanese: Vec<JapaneseForm>,
    #[serde(default)]
    senses: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
struct JapaneseForm {
    word: Option<String>,
    reading: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Sense {
    #[serde(default)]
    english_definitions: Vec<String>,
    #[serde(default)]
    parts_of_speech: Vec<String>,
}

/// Only the first result and its first sense are used
fn parse_entry(query: &str, response: SearchResponse) -> Result<Entry, LookupError> {
    let Some(first) = response.data.into_iter().next() else {
        return Ok(Entry::not_found());
    };

    let form = first
        .japanese
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::Parse("result without japanese forms".to_string()))?;
    let sense = first
        .senses
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::Parse("result without senses".to_string()))?;

    Ok(Entry::found(
        form.word.unwrap_or_else(|| query.to_string()),
        form.reading.unwrap_or_default(),
        sense.english_definitions.join(", "),
        sense.parts_of_speech.join(", "),
    ))
}

#[async_trait::async_trait]
impl Lookup for JishoClient {
    async fn lookup(&self, word: &str) -> Result<Entry, LookupError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("keyword", word)])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        parse_entry(word, body)
    }

    fn name(&self) -> &str {
        "jisho"
    }

    fn is_remote(&self) -> bool {
        true
    }
}
