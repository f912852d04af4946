use crate::figure::Figure;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

pub const DARK_BACKGROUND: &str = "#131722";
pub const LIGHT_BACKGROUND: &str = "#ffffff";
const DARK_GRID: &str = "#2a2e39";
const LIGHT_GRID: &str = "#e0e3eb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Light => f.write_str("light"),
            ThemeMode::Dark => f.write_str("dark"),
        }
    }
}

/// Applies the dashboard palette and the shared title/margin layout.
pub fn apply_theme(
    fig: &mut Figure,
    mode: ThemeMode,
    title: &str,
    x_title: Option<&str>,
    y_title: Option<&str>,
) {
    fig.update_layout(json!({
        "title": { "text": title, "font": { "size": 20 } },
        "margin": { "l": 20, "r": 20, "t": 50, "b": 20 },
        "hovermode": "x unified",
    }));
    if let Some(x) = x_title {
        fig.update_layout(json!({ "xaxis": { "title": { "text": x } } }));
    }
    if let Some(y) = y_title {
        fig.update_layout(json!({ "yaxis": { "title": { "text": y } } }));
    }

    match mode {
        ThemeMode::Dark => {
            let axis = json!({
                "title": { "font": { "color": LIGHT_BACKGROUND } },
                "tickfont": { "color": LIGHT_BACKGROUND },
                "gridcolor": DARK_GRID,
                "showgrid": true,
                "zerolinecolor": DARK_GRID,
            });
            fig.update_layout(json!({
                "template": "plotly_dark",
                "paper_bgcolor": DARK_BACKGROUND,
                "plot_bgcolor": DARK_BACKGROUND,
                "font": { "color": LIGHT_BACKGROUND },
                "title": { "font": { "color": LIGHT_BACKGROUND } },
                "legend": { "font": { "color": LIGHT_BACKGROUND } },
                "xaxis": axis.clone(),
                "yaxis": axis,
            }));
        }
        ThemeMode::Light => {
            let axis = json!({ "gridcolor": LIGHT_GRID, "showgrid": true });
            fig.update_layout(json!({
                "paper_bgcolor": LIGHT_BACKGROUND,
                "plot_bgcolor": LIGHT_BACKGROUND,
                "font": { "color": DARK_BACKGROUND },
                "xaxis": axis.clone(),
                "yaxis": axis,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_theme_keeps_axis_titles() {
        let mut fig = Figure::new();
        apply_theme(&mut fig, ThemeMode::Dark, "Prices", Some("Date"), Some("Price"));

        assert_eq!(fig.layout["paper_bgcolor"], DARK_BACKGROUND);
        assert_eq!(fig.layout["xaxis"]["title"]["text"], "Date");
        assert_eq!(fig.layout["xaxis"]["gridcolor"], DARK_GRID);
        assert_eq!(fig.layout["title"]["text"], "Prices");
        assert_eq!(fig.layout["title"]["font"]["color"], LIGHT_BACKGROUND);
    }

    #[test]
    fn light_theme_has_white_background() {
        let mut fig = Figure::new();
        apply_theme(&mut fig, ThemeMode::Light, "Prices", None, None);
        assert_eq!(fig.layout["plot_bgcolor"], LIGHT_BACKGROUND);
        assert_eq!(fig.layout["yaxis"]["gridcolor"], LIGHT_GRID);
        assert!(fig.layout["xaxis"].get("title").is_none());
    }
}
