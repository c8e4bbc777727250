#![allow(dead_code)]

use serde_json::{Value, json};
use stock_chart_wasm::domain::market_data::Dataset;
use stock_chart_wasm::infrastructure::http::dto::StockDataResponse;

/// Five bars. Bars 1 and 2 tie on both the high (13) and the low (8).
pub fn sample_json() -> Value {
    json!({
        "main": {
            "x_data": ["2024-03-01", "2024-03-04", "2024-03-05", "2024-03-06", "2024-03-07"],
            "candle_data": [
                [10.0, 11.0, 9.0, 12.0],
                [11.0, 10.0, 8.0, 13.0],
                [10.0, 12.0, 8.0, 13.0],
                [12.0, 12.0, 9.0, 12.5],
                [12.0, 11.0, 10.0, 12.0]
            ],
            "ma5": [null, null, null, null, 11.2],
            "ma10": [null, null, null, null, null],
            "ma20": [null, null, null, null, null]
        },
        "strategies": {
            "rsi": {
                "data": [50.0, 55.0, 60.0, 45.0, 40.0],
                "config": { "name": "RSI", "color": "#8888ff" }
            },
            "macd": {
                "data": {
                    "macd": [0.1, 0.2, 0.3, 0.2, 0.1],
                    "signal": [0.0, 0.1, 0.2, 0.2, 0.2],
                    "histogram": [0.2, 0.2, 0.2, 0.0, -0.2]
                },
                "config": {
                    "chart_group": "macd_analysis",
                    "chart_name": "MACD Analysis",
                    "outputs": {
                        "macd": { "color": "#FF6B6B", "type": "line", "name": "MACD Line", "order": 1 },
                        "signal": { "color": "#FFD700", "type": "line", "name": "Signal Line", "order": 2 },
                        "histogram": {
                            "type": "bar",
                            "name": "MACD Histogram",
                            "order": 0,
                            "use_color_from": "histogram"
                        }
                    }
                }
            },
            "volume": {
                "data": { "volume": [100.0, 200.0, 150.0, 120.0, 180.0] },
                "config": {
                    "chart_name": "Volume Analysis",
                    "outputs": {
                        "volume": {
                            "color": "#FFA07A",
                            "type": "bar",
                            "name": "Volume",
                            "order": 1,
                            "use_color_from": "volume"
                        }
                    }
                }
            },
            "broken": { "error": "not enough history", "data": [] },
            "short": { "data": [1.0, 2.0] }
        }
    })
}

pub fn sample_response() -> StockDataResponse {
    serde_json::from_value(sample_json()).unwrap()
}

pub fn sample_dataset() -> Dataset {
    sample_response().to_dataset().unwrap()
}
