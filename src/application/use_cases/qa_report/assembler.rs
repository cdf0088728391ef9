use serde_json::Value;

use super::normalizer::{splice_encoded_lists, Item};
use super::steps::StepSegmenter;
use crate::domain::report::{Report, Sheet, SheetKind};

/// Lays the five normalized stage outputs out as report sheets.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    steps: StepSegmenter,
}

impl ReportAssembler {
    pub fn new(steps: StepSegmenter) -> Self {
        Self { steps }
    }

    pub fn assemble(
        &self,
        analysis: Vec<Value>,
        scenarios: Vec<Value>,
        testcases: Vec<Value>,
        edgecases: Vec<Value>,
        automation: Vec<Value>,
    ) -> Report {
        let inputs = [analysis, scenarios, testcases, edgecases, automation];
        let sheets = SheetKind::ALL
            .into_iter()
            .zip(inputs)
            .map(|(kind, items)| self.build_sheet(kind, items))
            .collect();
        Report { sheets }
    }

    pub fn build_sheet(&self, kind: SheetKind, items: Vec<Value>) -> Sheet {
        let items: Vec<Item> = if kind.splices_encoded_lists() {
            splice_encoded_lists(items)
        } else {
            items.into_iter().map(Item::from_value).collect()
        };

        let mut sheet = Sheet::new(kind);
        for item in &items {
            sheet.rows.push(self.row(kind, item));
        }
        sheet
    }

    fn row(&self, kind: SheetKind, item: &Item) -> Vec<String> {
        match item {
            Item::Mapping(map) => kind
                .keys()
                .iter()
                .map(|key| {
                    if *key == "steps" {
                        self.steps
                            .normalize_steps(map.get("steps").unwrap_or(&Value::Null))
                    } else {
                        item.field(key)
                    }
                })
                .collect(),
            Item::Scalar(text) => {
                tracing::warn!(sheet = kind.title(), "record is not an object; emitting degraded row");
                degraded_row(kind, text)
            }
        }
    }
}

/// Empty structured columns with the raw text in the second column.
fn degraded_row(kind: SheetKind, text: &str) -> Vec<String> {
    let mut row = vec![String::new(); kind.headers().len()];
    row[1] = text.to_string();
    row
}
