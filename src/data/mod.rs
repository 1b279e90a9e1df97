/// Data layer: core types and the upload → chart pipeline.
///
/// Architecture:
/// ```text
///  .csv / .xls(x) / .txt / .tsv
///        │
///        ▼
///   ┌──────────┐
///   │ decoder  │  bytes + filename → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify │  user edits → ColumnClassification
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ preview  │  retained columns, numerical columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  select  │  category / metric options
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  render  │  filter rows by category → ChartSpec
///   └──────────┘
/// ```

pub mod classify;
pub mod decoder;
pub mod error;
pub mod model;
pub mod preview;
pub mod render;
pub mod select;
