use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Market a prop row is priced on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropType {
    #[serde(rename = "PTS")]
    Points,
    #[serde(rename = "REB")]
    Rebounds,
    #[serde(rename = "AST")]
    Assists,
    #[serde(rename = "P+R+A")]
    PointsReboundsAssists,
}

/// Player prop row shown on the props page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProp {
    pub id: String,
    pub name: String,
    pub team: String,
    pub team_code: Option<String>,
    pub prop_type: PropType,
    pub line: f64,
    pub projection: f64,
    pub edge: f64,
    pub edge_pct: f64,
    pub usage_boost: bool,
}

/// Prop entry as written by the prediction producer under `games[].props[]`
#[derive(Debug, Clone, Deserialize)]
struct RawProp {
    #[serde(default)]
    id: Option<Value>,
    name: String,
    pts: f64,
    #[serde(default)]
    team_label: Option<String>,
    #[serde(default)]
    trace: Vec<String>,
}

/// Column a prop list is ranked by (always descending)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Edge,
    #[default]
    EdgePct,
}

#[derive(Debug, Clone, Default)]
pub struct PropFilter {
    /// Case-insensitive substring of the player name
    pub search: Option<String>,
    pub prop_type: Option<PropType>,
}

/// Book-style line for a point projection: the nearest half point below it,
/// shaded one extra point for high scorers
pub fn synthesize_line(projection: f64) -> f64 {
    if projection > 25.0 {
        (projection - 1.5).floor() + 0.5
    } else {
        (projection - 0.5).floor() + 0.5
    }
}

fn text_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Build prop rows for every game in a predictions payload.
///
/// Entries that do not carry a name and a numeric `pts` are skipped.
pub fn extract_props(payload: &Value) -> Vec<PlayerProp> {
    let Some(games) = payload.get("games").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut props = Vec::new();
    for game in games {
        let Some(entries) = game.get("props").and_then(Value::as_array) else {
            continue;
        };

        let matchup = text_field(game, "matchup").unwrap_or_default();

        for entry in entries {
            let raw: RawProp = match serde_json::from_value(entry.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::debug!("Skipping prop entry in {}: {}", matchup, e);
                    continue;
                }
            };

            let (side, details) = if raw.team_label.as_deref() == Some("A") {
                ("away", "away_details")
            } else {
                ("home", "home_details")
            };

            let line = synthesize_line(raw.pts);
            let edge = raw.pts - line;

            let id = match &raw.id {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(id)) => id.to_string(),
                _ => format!("{matchup}-{}", raw.name),
            };

            props.push(PlayerProp {
                id,
                team: text_field(game, side).unwrap_or_default().to_string(),
                team_code: game
                    .get(details)
                    .and_then(|d| text_field(d, "code"))
                    .map(str::to_string),
                prop_type: PropType::Points,
                line,
                projection: raw.pts,
                edge,
                edge_pct: edge / line * 100.0,
                usage_boost: raw.trace.iter().any(|t| t.contains("usage")),
                name: raw.name,
            });
        }
    }

    props
}

/// Apply the props page filters, then rank descending by `sort`
pub fn filter_and_sort(
    props: Vec<PlayerProp>,
    filter: &PropFilter,
    sort: SortKey,
) -> Vec<PlayerProp> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut props: Vec<PlayerProp> = props
        .into_iter()
        .filter(|prop| {
            search
                .as_deref()
                .map_or(true, |s| prop.name.to_lowercase().contains(s))
        })
        .filter(|prop| filter.prop_type.map_or(true, |t| prop.prop_type == t))
        .collect();

    let key = |prop: &PlayerProp| match sort {
        SortKey::Edge => prop.edge,
        SortKey::EdgePct => prop.edge_pct,
    };
    props.sort_by(|a, b| key(b).total_cmp(&key(a)));
    props
}
