//! HTTP implementation of the card service.
//!
//! This module speaks the Mochi REST API. The actual HTTP client is
//! abstracted via a trait to allow different implementations (ureq,
//! reqwest, a canned client in tests).

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult, SyncResult};
use crate::service::{CardPage, CardService};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cardsync_codec::{CardRecord, DeckRef};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
    /// DELETE.
    Delete,
}

/// A request handed to an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters, not yet percent-encoded.
    pub query: Vec<(String, String)>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Vec<u8>>,
}

/// A response returned by an [`HttpClient`], whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. An `Err` means
/// no response was received; non-success statuses must be returned as an
/// [`HttpResponse`].
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the response.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, String>;
}

/// Card service backed by the Mochi HTTP API.
pub struct HttpCardService<C: HttpClient> {
    config: ServiceConfig,
    client: C,
    authorization: String,
}

impl<C: HttpClient> HttpCardService<C> {
    /// Creates a new HTTP card service.
    pub fn new(config: ServiceConfig, client: C) -> SyncResult<Self> {
        config.validate()?;
        let authorization = format!("Basic {}", STANDARD.encode(format!("{}:", config.api_key)));
        Ok(Self {
            config,
            client,
            authorization,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> HttpRequest {
        let mut headers = vec![
            ("Authorization".to_string(), self.authorization.clone()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if method == Method::Post {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: self.url(path),
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    fn send(&self, request: HttpRequest, subject: &str) -> ServiceResult<Vec<u8>> {
        let response = self
            .client
            .execute(&request)
            .map_err(ServiceError::Transport)?;
        match response.status {
            200..=299 => Ok(response.body),
            401 | 403 => Err(ServiceError::Authentication(format!(
                "status {} for {}",
                response.status, subject
            ))),
            404 => Err(ServiceError::NotFound(subject.to_string())),
            status => Err(ServiceError::Status {
                status,
                message: body_excerpt(&response.body),
            }),
        }
    }

    fn send_json<T: DeserializeOwned>(&self, request: HttpRequest, subject: &str) -> ServiceResult<T> {
        let body = self.send(request, subject)?;
        serde_json::from_slice(&body)
            .map_err(|e| ServiceError::Protocol(format!("failed to decode {} response: {}", subject, e)))
    }

    fn with_body<T: Serialize>(mut request: HttpRequest, body: &T) -> ServiceResult<HttpRequest> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ServiceError::Protocol(format!("failed to encode request: {}", e)))?;
        request.body = Some(bytes);
        Ok(request)
    }
}

impl<C: HttpClient> CardService for HttpCardService<C> {
    fn list_decks(&self) -> ServiceResult<Vec<DeckRef>> {
        let mut decks = Vec::new();
        let mut bookmark: Option<String> = None;
        loop {
            let mut request = self.request(Method::Get, "decks/");
            if let Some(bookmark) = &bookmark {
                request.query.push(("bookmark".into(), bookmark.clone()));
            }
            let page: WirePage<WireDeck> = self.send_json(request, "deck list")?;
            if page.docs.is_empty() {
                break;
            }
            decks.extend(page.docs.into_iter().map(WireDeck::into_deck));
            match page.bookmark {
                Some(next) if !next.is_empty() && bookmark.as_deref() != Some(next.as_str()) => {
                    bookmark = Some(next)
                }
                _ => break,
            }
        }
        Ok(decks)
    }

    fn get_deck(&self, deck_id: &str) -> ServiceResult<DeckRef> {
        let request = self.request(Method::Get, &format!("decks/{}", deck_id));
        let deck: WireDeck = self.send_json(request, &format!("deck {}", deck_id))?;
        Ok(deck.into_deck())
    }

    fn list_cards(
        &self,
        deck_id: &str,
        page_token: Option<&str>,
        limit: u32,
    ) -> ServiceResult<CardPage> {
        let mut request = self.request(Method::Get, "cards/");
        request.query.push(("deck-id".into(), deck_id.to_string()));
        request.query.push(("limit".into(), limit.to_string()));
        if let Some(token) = page_token {
            request.query.push(("bookmark".into(), token.to_string()));
        }
        let page: WirePage<WireCard> = self.send_json(request, &format!("cards of deck {}", deck_id))?;
        Ok(CardPage {
            cards: page.docs.into_iter().map(WireCard::into_record).collect(),
            next_page_token: page.bookmark,
        })
    }

    fn create_card(&self, deck_id: &str, card: &CardRecord) -> ServiceResult<String> {
        let body = CardBody::new(card, Some(deck_id));
        let request = Self::with_body(self.request(Method::Post, "cards/"), &body)?;
        let created: WireCreated = self.send_json(request, "card creation")?;
        Ok(created.id)
    }

    fn update_card(&self, remote_id: &str, card: &CardRecord) -> ServiceResult<()> {
        let body = CardBody::new(card, None);
        let request = Self::with_body(
            self.request(Method::Post, &format!("cards/{}", remote_id)),
            &body,
        )?;
        self.send(request, &format!("card {}", remote_id))?;
        Ok(())
    }

    fn delete_card(&self, remote_id: &str) -> ServiceResult<()> {
        let request = self.request(Method::Delete, &format!("cards/{}", remote_id));
        self.send(request, &format!("card {}", remote_id))?;
        Ok(())
    }
}

fn body_excerpt(body: &[u8]) -> String {
    const LIMIT: usize = 200;
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Paged listing envelope.
#[derive(Debug, Deserialize)]
struct WirePage<T> {
    #[serde(default = "Vec::new")]
    docs: Vec<T>,
    #[serde(default)]
    bookmark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDeck {
    id: String,
    #[serde(default)]
    name: String,
}

impl WireDeck {
    fn into_deck(self) -> DeckRef {
        DeckRef::new(self.id, self.name)
    }
}

#[derive(Debug, Deserialize)]
struct WireCard {
    id: String,
    #[serde(default)]
    content: String,
    #[serde(default, rename = "manual-tags")]
    manual_tags: Option<Value>,
    #[serde(default)]
    tags: Option<Value>,
    #[serde(default)]
    archived: Option<bool>,
    #[serde(default, rename = "archived?")]
    archived_flag: Option<bool>,
}

impl WireCard {
    fn into_record(self) -> CardRecord {
        let tags = self
            .manual_tags
            .as_ref()
            .or(self.tags.as_ref())
            .map(string_list)
            .unwrap_or_default();
        let archived = self.archived_flag.or(self.archived).unwrap_or(false);
        CardRecord::from_remote(self.id, &self.content, tags, archived)
    }
}

/// Strings of a JSON array; anything else yields no tags.
fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct WireCreated {
    id: String,
}

/// Create/update request body. Tags and the archived flag are always sent
/// so that clearing them locally reaches the service.
#[derive(Debug, Serialize)]
struct CardBody<'a> {
    content: String,
    #[serde(rename = "deck-id", skip_serializing_if = "Option::is_none")]
    deck_id: Option<&'a str>,
    #[serde(rename = "manual-tags")]
    manual_tags: &'a [String],
    #[serde(rename = "archived?")]
    archived: bool,
}

impl<'a> CardBody<'a> {
    fn new(card: &'a CardRecord, deck_id: Option<&'a str>) -> Self {
        Self {
            content: card.content(),
            deck_id,
            manual_tags: card.tags.as_slice(),
            archived: card.archived,
        }
    }
}
