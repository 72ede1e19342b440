//! Serverless request boundary
//!
//! Routes `/api/*` requests onto a [`LeaderboardClient`], validating the
//! body and mapping failures to HTTP status codes. Transport agnostic: the
//! host turns its native request into an [`ApiRequest`] and writes the
//! [`ApiResponse`] back.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{LeaderboardClient, LeaderboardError, ScoreMeta};
use crate::character::Character;
use crate::consts::{DEFAULT_LEADERBOARD_LIMIT, MAX_SUBMITTED_SCORE};

pub const REGISTER_PATH: &str = "/api/register-player";
pub const SUBMIT_PATH: &str = "/api/submit-score";
pub const LEADERBOARD_PATH: &str = "/api/leaderboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
    Other,
}

impl Method {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            _ => Method::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(query: &str) -> Self {
        Self {
            method: Method::Get,
            query: parse_query(query),
            body: None,
        }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            query: HashMap::new(),
            body: Some(body.into()),
        }
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            query: HashMap::new(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    /// `None` for preflight answers
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, allow: &'static str, body: Value) -> Self {
        Self {
            status,
            headers: cors_headers(allow),
            body: Some(body),
        }
    }

    fn error(allow: &'static str, err: &LeaderboardError) -> Self {
        if let LeaderboardError::Unavailable(cause) = err {
            log::error!("Leaderboard storage error: {}", cause);
        }
        Self::json(err.status(), allow, json!({ "error": err.to_string() }))
    }

    fn preflight(allow: &'static str) -> Self {
        Self {
            status: 200,
            headers: cors_headers(allow),
            body: None,
        }
    }
}

fn cors_headers(allow: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", allow),
        ("Access-Control-Allow-Headers", "Content-Type"),
        ("Content-Type", "application/json"),
    ]
}

/// Split `a=1&b=2` into pairs. Keys without `=` map to an empty value.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Dispatch a request by path
pub fn route<C: LeaderboardClient>(client: &mut C, path: &str, req: &ApiRequest) -> ApiResponse {
    match path {
        REGISTER_PATH => register_player(client, req),
        SUBMIT_PATH => submit_score(client, req),
        LEADERBOARD_PATH => leaderboard(client, req),
        _ => ApiResponse::json(404, "GET, POST, OPTIONS", json!({ "error": "Not found" })),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    player_id: Option<String>,
    player_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody {
    player_id: Option<String>,
    score: Option<Value>,
    #[serde(default)]
    game_data: Option<Value>,
}

fn parse_body<T: DeserializeOwned>(req: &ApiRequest) -> Result<T, LeaderboardError> {
    let body = req
        .body
        .as_deref()
        .ok_or_else(|| LeaderboardError::InvalidRequest("Request body is required".into()))?;
    serde_json::from_str(body)
        .map_err(|e| LeaderboardError::InvalidRequest(format!("Malformed JSON body: {}", e)))
}

/// Empty strings count as missing
fn required(value: Option<String>, field: &'static str) -> Result<String, LeaderboardError> {
    value
        .filter(|s| !s.is_empty())
        .ok_or(LeaderboardError::MissingField(field))
}

/// Scores must be whole numbers in `0..=MAX_SUBMITTED_SCORE`
fn parse_score(value: &Value) -> Result<u32, LeaderboardError> {
    let score = value.as_f64().ok_or(LeaderboardError::OutOfRange)?;
    if !score.is_finite()
        || score.fract() != 0.0
        || score < 0.0
        || score > f64::from(MAX_SUBMITTED_SCORE)
    {
        return Err(LeaderboardError::OutOfRange);
    }
    Ok(score as u32)
}

fn score_meta(game_data: Option<&Value>) -> ScoreMeta {
    let Some(data) = game_data else {
        return ScoreMeta::default();
    };
    ScoreMeta {
        character: data
            .get("character")
            .and_then(Value::as_str)
            .map(Character::from_key)
            .unwrap_or_default(),
        new_record: data
            .get("newRecord")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

const REGISTER_ALLOW: &str = "POST, OPTIONS";

pub fn register_player<C: LeaderboardClient>(client: &mut C, req: &ApiRequest) -> ApiResponse {
    match req.method {
        Method::Options => return ApiResponse::preflight(REGISTER_ALLOW),
        Method::Post => {}
        _ => return ApiResponse::error(REGISTER_ALLOW, &LeaderboardError::MethodNotAllowed),
    }

    let result = parse_body::<RegisterBody>(req).and_then(|body| {
        let player_id = required(body.player_id, "playerId")?;
        let name = required(body.player_name, "playerName")?;
        let name = name.trim().to_string();
        client.register_player(&player_id, &name)?;
        Ok(name)
    });

    match result {
        Ok(name) => ApiResponse::json(
            201,
            REGISTER_ALLOW,
            json!({
                "success": true,
                "message": "Player registered successfully",
                "player": { "name": name, "bestScore": 0, "gamesPlayed": 0 },
            }),
        ),
        Err(err) => ApiResponse::error(REGISTER_ALLOW, &err),
    }
}

const SUBMIT_ALLOW: &str = "POST, OPTIONS";

pub fn submit_score<C: LeaderboardClient>(client: &mut C, req: &ApiRequest) -> ApiResponse {
    match req.method {
        Method::Options => return ApiResponse::preflight(SUBMIT_ALLOW),
        Method::Post => {}
        _ => return ApiResponse::error(SUBMIT_ALLOW, &LeaderboardError::MethodNotAllowed),
    }

    let result = parse_body::<SubmitBody>(req).and_then(|body| {
        let player_id = required(body.player_id, "playerId")?;
        let score = body
            .score
            .filter(|v| !v.is_null())
            .ok_or(LeaderboardError::MissingField("score"))?;
        let score = parse_score(&score)?;
        let meta = score_meta(body.game_data.as_ref());
        client.submit_score(&player_id, score, &meta)
    });

    match result {
        Ok(outcome) => {
            let message = if outcome.new_record {
                "New personal record!"
            } else {
                "Score submitted"
            };
            ApiResponse::json(
                200,
                SUBMIT_ALLOW,
                json!({
                    "success": true,
                    "newRecord": outcome.new_record,
                    "bestScore": outcome.best_score,
                    "rank": outcome.rank,
                    "totalPlayers": outcome.total_players,
                    "message": message,
                }),
            )
        }
        Err(err) => ApiResponse::error(SUBMIT_ALLOW, &err),
    }
}

const LEADERBOARD_ALLOW: &str = "GET, OPTIONS";

pub fn leaderboard<C: LeaderboardClient>(client: &mut C, req: &ApiRequest) -> ApiResponse {
    match req.method {
        Method::Options => return ApiResponse::preflight(LEADERBOARD_ALLOW),
        Method::Get => {}
        _ => return ApiResponse::error(LEADERBOARD_ALLOW, &LeaderboardError::MethodNotAllowed),
    }

    let limit = req
        .query
        .get("limit")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let player_id = req
        .query
        .get("playerId")
        .map(String::as_str)
        .filter(|s| !s.is_empty());

    match client.fetch_leaderboard(limit, player_id) {
        Ok(page) => ApiResponse::json(
            200,
            LEADERBOARD_ALLOW,
            json!({
                "success": true,
                "leaderboard": page.entries,
                "playerRank": page.player_rank,
                "totalPlayers": page.total_players,
                "timestamp": Utc::now(),
            }),
        ),
        Err(err) => ApiResponse::error(LEADERBOARD_ALLOW, &err),
    }
}
