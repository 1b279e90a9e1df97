use std::collections::BTreeSet;

use stock_grapher::config::PipelineConfig;
use stock_grapher::data::classify::{init_classification, is_complete, ColumnType, Edit};
use stock_grapher::data::decoder::decode;
use stock_grapher::data::error::{DecodeError, PipelineError};
use stock_grapher::data::model::CellValue;
use stock_grapher::data::preview::build_preview;
use stock_grapher::data::render::{render, Selection};
use stock_grapher::data::select::{category_options, metric_options};
use stock_grapher::state::{Event, Session, Stage};

const PRICES: &str = "Date,Stock,Price\n\
2020-01-01,A,10\n\
2020-01-01,B,20\n\
2020-01-02,A,11\n";

fn date(s: &str) -> CellValue {
    CellValue::Date(s.to_string())
}

fn classify_all() -> Vec<Edit> {
    vec![
        Edit::set("Date", ColumnType::DateTime),
        Edit::set("Stock", ColumnType::Categorical),
        Edit::set("Price", ColumnType::Numerical),
    ]
}

#[test]
fn test_stage_functions_end_to_end() {
    let table = decode(PRICES.as_bytes(), "prices.csv").expect("decode");

    let classification = init_classification(&table);
    assert!(!is_complete(&classification));
    let classification = classification.apply_edits(&classify_all());
    assert!(is_complete(&classification));

    let preview = build_preview(&table, &classification, "Stock").expect("preview");
    assert_eq!(preview.columns, vec!["Date", "Stock", "Price"]);

    let stocks = category_options(&preview.table, &preview.category_column);
    assert_eq!(stocks, vec![CellValue::from("A"), CellValue::from("B")]);
    assert_eq!(metric_options(&preview.numerical_columns), vec!["Price"]);

    let selection = Selection {
        categories: BTreeSet::from([CellValue::from("A")]),
        metric: Some("Price".to_string()),
    };
    let chart = render(&table, &preview, &selection, "Date").expect("render");

    assert_eq!(chart.series.len(), 1);
    assert_eq!(chart.series[0].name, CellValue::from("A"));
    assert_eq!(
        chart.series[0].points,
        vec![
            (date("2020-01-01"), Some(10.0)),
            (date("2020-01-02"), Some(11.0)),
        ]
    );
    assert_eq!(chart.x, vec![date("2020-01-01"), date("2020-01-02")]);
    assert_eq!(chart.table.row_count(), 2);
    assert_eq!(chart.title(), "Graph of Date vs. Price");
}

#[test]
fn test_session_end_to_end() {
    let session = Session::new(PipelineConfig::default())
        .apply(Event::Upload {
            filename: "prices.csv".into(),
            bytes: PRICES.as_bytes().to_vec(),
        })
        .and_then(|s| s.apply(Event::Proceed))
        .and_then(|s| s.apply(Event::Edit(classify_all())))
        .and_then(|s| s.apply(Event::SelectCategories(vec!["A".into()])))
        .and_then(|s| s.apply(Event::SelectMetric(Some("Price".into()))))
        .expect("workflow");

    assert_eq!(session.stage(), Stage::Classifying);
    assert_eq!(session.revision(), 5);
    assert_eq!(session.category_options().len(), 2);

    let chart = session.chart().expect("chart");
    assert_eq!(chart.series[0].points.len(), 2);
    assert_eq!(chart.table.row_count(), 2);
}

#[test]
fn test_deleted_column_never_reaches_later_stages() {
    let session = Session::default()
        .apply(Event::Upload {
            filename: "prices.csv".into(),
            bytes: b"Date,Stock,Price,Volume\n2020-01-01,A,10,5\n".to_vec(),
        })
        .and_then(|s| s.apply(Event::Proceed))
        .and_then(|s| s.apply(Event::Edit(vec![Edit::delete("Volume")])))
        .and_then(|s| {
            s.apply(Event::Edit(vec![
                Edit::set("Volume", ColumnType::Numerical),
                Edit::set("Date", ColumnType::DateTime),
                Edit::set("Stock", ColumnType::Categorical),
                Edit::set("Price", ColumnType::Numerical),
            ]))
        })
        .and_then(|s| s.apply(Event::SelectCategories(vec!["A".into()])))
        .and_then(|s| s.apply(Event::SelectMetric(Some("Price".into()))))
        .expect("workflow");

    let preview = session.preview().expect("preview");
    assert_eq!(preview.columns, vec!["Date", "Stock", "Price"]);
    assert_eq!(session.metric_options(), vec!["Price"]);
    assert!(!session.chart().expect("chart").table.has_column("Volume"));

    // The deleted column cannot be chosen as the metric either.
    let s = session
        .apply(Event::SelectMetric(Some("Volume".into())))
        .expect("select");
    assert_eq!(s.chart_error(), Some(&PipelineError::EmptySelection));
}

#[test]
fn test_unrecognized_extension_keeps_prior_session() {
    let session = Session::default()
        .apply(Event::Upload {
            filename: "prices.csv".into(),
            bytes: PRICES.as_bytes().to_vec(),
        })
        .expect("upload");

    let err = session
        .apply(Event::Upload {
            filename: "prices.parquet".into(),
            bytes: PRICES.as_bytes().to_vec(),
        })
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::Decode(DecodeError::UnsupportedFileType("prices.parquet".into()))
    );
    assert_eq!(session.upload().expect("upload").filename, "prices.csv");
    assert_eq!(session.revision(), 1);
}

#[test]
fn test_whitespace_upload_flows_through() {
    let text = "Date Stock Price\n2020-01-01 A 10\n2020-01-02 B 12\n";
    let session = Session::default()
        .apply(Event::Upload {
            filename: "prices.tsv".into(),
            bytes: text.as_bytes().to_vec(),
        })
        .and_then(|s| s.apply(Event::Proceed))
        .and_then(|s| s.apply(Event::Edit(classify_all())))
        .expect("workflow");

    assert_eq!(session.category_options().len(), 2);
}
