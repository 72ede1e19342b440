//! Browser `fetch` client for the hosted leaderboard (WASM only)

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::api::{LEADERBOARD_PATH, REGISTER_PATH, SUBMIT_PATH};
use super::{LeaderboardError, LeaderboardPage, ScoreMeta, SubmitOutcome};

fn js_error(err: JsValue) -> LeaderboardError {
    LeaderboardError::Network(format!("{:?}", err))
}

/// Talks to the `/api/*` endpoints on `base_url` (empty for same origin)
#[derive(Debug, Clone, Default)]
pub struct HttpLeaderboard {
    base_url: String,
}

impl HttpLeaderboard {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<Value, LeaderboardError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let url = format!("{}{}", self.base_url, path);
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }

        let window =
            web_sys::window().ok_or_else(|| LeaderboardError::Network("no window".into()))?;
        let resp: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;

        let text = JsFuture::from(resp.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .unwrap_or_default();
        let json: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if resp.ok() {
            Ok(json)
        } else {
            let message = json
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Request failed");
            log::warn!("{} {} failed: {} {}", method, path, resp.status(), message);
            Err(LeaderboardError::from_status(resp.status(), message))
        }
    }

    fn decode<T: DeserializeOwned>(json: Value) -> Result<T, LeaderboardError> {
        serde_json::from_value(json)
            .map_err(|e| LeaderboardError::Network(format!("unexpected response: {}", e)))
    }

    pub async fn register_player(&self, player_id: &str, name: &str) -> Result<(), LeaderboardError> {
        let body = json!({ "playerId": player_id, "playerName": name });
        self.send("POST", REGISTER_PATH, Some(body.to_string()))
            .await
            .map(|_| ())
    }

    pub async fn submit_score(
        &self,
        player_id: &str,
        score: u32,
        meta: &ScoreMeta,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        let body = json!({ "playerId": player_id, "score": score, "gameData": meta });
        let json = self.send("POST", SUBMIT_PATH, Some(body.to_string())).await?;
        Self::decode(json)
    }

    pub async fn fetch_leaderboard(
        &self,
        limit: usize,
        player_id: Option<&str>,
    ) -> Result<LeaderboardPage, LeaderboardError> {
        let mut path = format!("{}?limit={}", LEADERBOARD_PATH, limit);
        if let Some(id) = player_id {
            let encoded: String = js_sys::encode_uri_component(id).into();
            path.push_str("&playerId=");
            path.push_str(&encoded);
        }
        let json = self.send("GET", &path, None).await?;
        Self::decode(json)
    }
}
