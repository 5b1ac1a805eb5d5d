//! FILENAME: tests/common/mod.rs
//! Fixtures for dyngrid-engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dyngrid_engine::{DynamicGrid, GridDefinition, KeyComparer};
use serde::Serialize;

/// One production entry: how many units of a product were made on a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionRecord {
    pub product: String,
    pub day: u32,
    pub count: i64,
}

impl ProductionRecord {
    pub fn new(product: &str, day: u32, count: i64) -> Self {
        ProductionRecord {
            product: product.to_string(),
            day,
            count,
        }
    }
}

pub type ProductionGrid = DynamicGrid<ProductionRecord, String, u32, i64>;

/// Products as rows, days as columns, colliding counts summed. Both axes sorted.
pub fn production_definition() -> GridDefinition<ProductionRecord, String, u32, i64> {
    GridDefinition::builder()
        .row_selector(|r: &ProductionRecord| r.product.clone())
        .column_selector(|r: &ProductionRecord| r.day)
        .aggregator(|rs: &[&ProductionRecord]| rs.iter().map(|r| r.count).sum())
        .row_comparer(KeyComparer::natural())
        .column_comparer(KeyComparer::natural())
        .item_size(100.0, 100.0)
        .build()
        .unwrap()
}

/// Same as `production_definition`, counting aggregator invocations.
pub fn counting_definition(calls: Arc<AtomicUsize>) -> GridDefinition<ProductionRecord, String, u32, i64> {
    GridDefinition::builder()
        .row_selector(|r: &ProductionRecord| r.product.clone())
        .column_selector(|r: &ProductionRecord| r.day)
        .aggregator(move |rs: &[&ProductionRecord]| {
            calls.fetch_add(1, Ordering::SeqCst);
            rs.iter().map(|r| r.count).sum()
        })
        .row_comparer(KeyComparer::natural())
        .column_comparer(KeyComparer::natural())
        .item_size(100.0, 100.0)
        .build()
        .unwrap()
}

/// `products x days` records, one per cell: count = product index * 1000 + day.
pub fn production_data(products: usize, days: u32) -> Vec<ProductionRecord> {
    let mut records = Vec::with_capacity(products * days as usize);
    for p in 0..products {
        for day in 0..days {
            records.push(ProductionRecord::new(&product_name(p), day, (p as i64) * 1000 + day as i64));
        }
    }
    records
}

/// Zero-padded so natural ordering matches index ordering.
pub fn product_name(index: usize) -> String {
    format!("P{:04}", index)
}

/// A grid over `production_data`, idle, with a 300 x 300 viewport.
pub fn idle_grid(products: usize, days: u32) -> ProductionGrid {
    let mut grid = DynamicGrid::with_records(production_definition(), production_data(products, days));
    grid.set_viewport_size(300.0, 300.0);
    grid.wait_idle().unwrap();
    grid
}
