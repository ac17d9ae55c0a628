use anyhow::Result;
use axum::body::Bytes;
use tracing::info;

use crate::{
    callbacks::{size_histograms, weight_class_options, Selection},
    dataset::BoxerRecord,
    figure::StaticFigures,
    page::{self, PageContent},
    stats::Views,
};

/// Everything the dashboard serves, built once at startup and read-only afterwards.
#[derive(Debug)]
pub struct Dashboard {
    records: Vec<BoxerRecord>,
    page: Bytes,
}

impl Dashboard {
    pub fn build(records: Vec<BoxerRecord>, pretty: bool) -> Result<Dashboard> {
        let views = Views::compute(&records);
        let figures = StaticFigures::build(&views);

        let selection = Selection::default();
        let (height, reach) =
            size_histograms(&records, &selection.sex, selection.weight.as_deref());
        let page = page::render(
            &PageContent {
                figures: &figures,
                distributions: &views.distributions,
                selection: &selection,
                weight_options: &weight_class_options(&selection.sex),
                height: &height,
                reach: &reach,
            },
            pretty,
        )?;
        info!(
            rows = records.len(),
            page_bytes = page.len(),
            "dashboard ready"
        );

        Ok(Dashboard {
            records,
            page: Bytes::from(page),
        })
    }

    pub fn records(&self) -> &[BoxerRecord] {
        &self.records
    }

    /// The rendered page. Clones share one buffer.
    pub fn page(&self) -> Bytes {
        self.page.clone()
    }
}
