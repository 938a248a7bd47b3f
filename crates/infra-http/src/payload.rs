//! Decoding of the `video_insights` payload.
//!
//! Likes are the sum of all reaction counts of the
//! `post_video_likes_by_reaction_type` insight, views the value of
//! `fb_reels_total_plays`. An absent insight counts as zero; a present one
//! whose value is not a non-negative integer yields `None` for that count.

use contest_core::port::VideoMetrics;
use serde::Deserialize;
use serde_json::Value;

const LIKES_INSIGHT: &str = "post_video_likes_by_reaction_type";
const VIEWS_INSIGHT: &str = "fb_reels_total_plays";

#[derive(Debug, Deserialize)]
struct VideoDto {
    #[serde(default)]
    video_insights: Option<InsightsDto>,
}

#[derive(Debug, Deserialize)]
struct InsightsDto {
    #[serde(default)]
    data: Vec<InsightDto>,
}

#[derive(Debug, Deserialize)]
struct InsightDto {
    name: String,
    #[serde(default)]
    values: Vec<InsightValueDto>,
}

#[derive(Debug, Deserialize)]
struct InsightValueDto {
    #[serde(default)]
    value: Value,
}

/// Error object the Graph API returns alongside a failing status
#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorDto,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    message: String,
}

pub(crate) fn parse_metrics(body: &[u8]) -> Result<VideoMetrics, String> {
    let video: VideoDto = serde_json::from_slice(body)
        .map_err(|error| format!("invalid video insights payload: {error}"))?;

    let mut metrics = VideoMetrics::new(0, 0);
    let insights = video.video_insights.map(|i| i.data).unwrap_or_default();

    for insight in insights {
        let value = insight.values.first().map(|v| &v.value);
        match insight.name.as_str() {
            LIKES_INSIGHT => {
                metrics.likes = match value {
                    None | Some(Value::Null) => Some(0),
                    Some(v) => sum_reactions(v),
                }
            }
            VIEWS_INSIGHT => {
                metrics.views = match value {
                    None | Some(Value::Null) => Some(0),
                    Some(v) => count(v),
                }
            }
            _ => {}
        }
    }

    Ok(metrics)
}

/// Sum of an object of reaction counts; `None` if any count is not an integer
fn sum_reactions(value: &Value) -> Option<i64> {
    value
        .as_object()?
        .values()
        .try_fold(0i64, |total, value| total.checked_add(count(value)?))
}

fn count(value: &Value) -> Option<i64> {
    value.as_i64().filter(|n| *n >= 0)
}

/// Message of a Graph API error body, if it is one
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}
