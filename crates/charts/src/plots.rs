use crate::figure::Figure;
use crate::theme::{ThemeMode, apply_theme};
use chrono::{DateTime, Utc};
use core_types::PriceTable;
use forecast::Forecast;
use portfolio_backtester::CorrelationMatrix;
use serde_json::json;
use strategies::BacktestResult;

fn axis_dates(dates: &[DateTime<Utc>]) -> Vec<String> {
    dates.iter().map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()).collect()
}

/// Strategy equity against buy and hold. With a forecast, the predicted
/// prices are rescaled onto the buy-and-hold curve and drawn with their band.
pub fn performance_chart(result: &BacktestResult, forecast: Option<&Forecast>, theme: ThemeMode) -> Figure {
    let mut fig = Figure::new();
    let x = axis_dates(&result.dates);

    fig.add_trace(json!({
        "type": "scatter",
        "x": x,
        "y": result.equity_curve,
        "name": format!("{} Strategy", result.strategy),
        "line": { "color": "green", "width": 2 },
    }));
    fig.add_trace(json!({
        "type": "scatter",
        "x": x,
        "y": result.benchmark_curve,
        "name": "Buy & Hold (Asset)",
        "line": { "color": "gray", "width": 2 },
    }));

    let scale = match (result.benchmark_curve.last(), result.closes.last()) {
        (Some(bh), Some(close)) if *close != 0.0 => Some(bh / close),
        _ => None,
    };
    if let (Some(forecast), Some(scale)) = (forecast, scale) {
        let future = axis_dates(&forecast.dates);
        let scaled = |values: &[f64]| values.iter().map(|v| v * scale).collect::<Vec<f64>>();

        fig.add_trace(json!({
            "type": "scatter",
            "x": future,
            "y": scaled(&forecast.mean),
            "name": "ARIMA Forecast (Extrapolated)",
            "line": { "color": "red", "width": 2, "dash": "dash" },
        }));
        fig.add_trace(json!({
            "type": "scatter",
            "x": future,
            "y": scaled(&forecast.upper),
            "mode": "lines",
            "line": { "width": 0 },
            "showlegend": false,
        }));
        fig.add_trace(json!({
            "type": "scatter",
            "x": future,
            "y": scaled(&forecast.lower),
            "mode": "lines",
            "line": { "width": 0 },
            "fill": "tonexty",
            "fillcolor": "rgba(255, 0, 0, 0.1)",
            "name": "Confidence Interval",
        }));
    }

    apply_theme(
        &mut fig,
        theme,
        "Performance & Forecast",
        Some("Date"),
        Some("Cumulative Performance (Base 1.0)"),
    );
    fig
}

/// One close-price line per symbol.
pub fn prices_chart(prices: &PriceTable, theme: ThemeMode) -> Figure {
    let mut fig = Figure::new();
    let x = axis_dates(prices.dates());
    for symbol in prices.symbols() {
        let Some(column) = prices.column(symbol) else {
            continue;
        };
        let closes: Vec<f64> = column.iter().map(|b| b.close).collect();
        fig.add_trace(json!({ "type": "scatter", "mode": "lines", "x": x, "y": closes, "name": symbol }));
    }
    fig.update_layout(json!({ "legend": { "title": { "text": "Assets" } } }));
    apply_theme(&mut fig, theme, "Asset prices", Some("Date"), Some("Price"));
    fig
}

pub fn portfolio_value_chart(dates: &[DateTime<Utc>], values: &[f64], theme: ThemeMode) -> Figure {
    let mut fig = Figure::new();
    fig.add_trace(json!({
        "type": "scatter",
        "mode": "lines",
        "x": axis_dates(dates),
        "y": values,
        "name": "Portfolio",
    }));
    apply_theme(&mut fig, theme, "Portfolio value (base=1)", Some("Date"), Some("Value"));
    fig
}

pub fn drawdown_chart(dates: &[DateTime<Utc>], drawdown: &[f64], theme: ThemeMode) -> Figure {
    let mut fig = Figure::new();
    fig.add_trace(json!({
        "type": "scatter",
        "mode": "lines",
        "x": axis_dates(dates),
        "y": drawdown,
        "name": "Drawdown",
    }));
    apply_theme(&mut fig, theme, "Portfolio drawdown", Some("Date"), Some("Drawdown"));
    fig
}

/// Heatmap on a fixed `[-1, 1]` color scale.
pub fn correlation_heatmap(matrix: &CorrelationMatrix, theme: ThemeMode) -> Figure {
    let mut fig = Figure::new();
    fig.add_trace(json!({
        "type": "heatmap",
        "z": matrix.values,
        "x": matrix.symbols,
        "y": matrix.symbols,
        "zmin": -1,
        "zmax": 1,
        "colorscale": "RdBu",
        "colorbar": { "title": { "text": "Correlation" } },
    }));
    apply_theme(&mut fig, theme, "Correlation matrix", None, None);
    fig
}
