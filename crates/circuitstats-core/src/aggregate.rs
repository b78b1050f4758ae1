// ── Windowed traffic aggregation ──
//
// Reduces an insights series (one optional bps value per bucket) to a
// fixed-length chart series plus byte totals and averages. Buckets the
// API did not return, or returned as null, chart as zero but are left
// out of every total and average.

use serde::Serialize;

use crate::window::{BUCKETS, Window};

/// One bucket of a port's traffic series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortSample {
    /// Bucket start, epoch seconds.
    pub timestamp: i64,
    pub rx_bps: f64,
    pub tx_bps: f64,
}

/// Totals over the buckets that actually carried data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrafficTotals {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub avg_rx_bps: f64,
    pub avg_tx_bps: f64,
    pub peak_rx_bps: f64,
    pub peak_tx_bps: f64,
    /// Buckets with an rx value.
    pub rx_buckets: usize,
    /// Buckets with a tx value.
    pub tx_buckets: usize,
}

/// A window's traffic: `BUCKETS` samples plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowedSummary {
    pub window: Window,
    pub samples: Vec<PortSample>,
    pub totals: TrafficTotals,
}

#[derive(Default)]
struct Accumulator {
    sum_bps: f64,
    peak_bps: f64,
    buckets: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) -> f64 {
        match value.filter(|v| v.is_finite() && *v >= 0.0) {
            Some(v) => {
                self.sum_bps += v;
                self.peak_bps = self.peak_bps.max(v);
                self.buckets += 1;
                v
            }
            None => 0.0,
        }
    }

    fn average(&self) -> f64 {
        if self.buckets == 0 {
            0.0
        } else {
            self.sum_bps / self.buckets as f64
        }
    }

    /// Bytes moved: each bucket's rate held for `interval` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn bytes(&self, interval: u64) -> u64 {
        (self.sum_bps * interval as f64 / 8.0).round() as u64
    }
}

/// Spread `values` over the window's buckets.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn place(window: &Window, times: &[f64], values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut slots = vec![None; BUCKETS];
    if times.is_empty() {
        for (slot, value) in slots.iter_mut().zip(values) {
            *slot = *value;
        }
        return slots;
    }

    let interval = window.interval.max(1) as f64;
    for (time, value) in times.iter().zip(values) {
        let Some(value) = value else { continue };
        let offset = (time - window.start as f64) / interval;
        if !offset.is_finite() || offset < 0.0 {
            continue;
        }
        let index = offset.floor() as usize;
        if let Some(slot) = slots.get_mut(index) {
            slot.get_or_insert(*value);
        }
    }
    slots
}

/// Summarise an rx/tx series over `window`.
///
/// `times` are the bucket start times the API reported alongside the
/// values. When present each value lands in the bucket containing its
/// time and values outside the window are dropped; without them values
/// are taken in order from the window start. The result always has
/// exactly [`BUCKETS`] samples, zero-filled where nothing landed.
pub fn summarize(
    window: &Window,
    times: &[f64],
    rx_bps: &[Option<f64>],
    tx_bps: &[Option<f64>],
) -> WindowedSummary {
    let rx_slots = place(window, times, rx_bps);
    let tx_slots = place(window, times, tx_bps);

    let mut rx = Accumulator::default();
    let mut tx = Accumulator::default();

    let samples = window
        .bucket_starts()
        .into_iter()
        .zip(rx_slots.into_iter().zip(tx_slots))
        .map(|(timestamp, (rx_value, tx_value))| PortSample {
            timestamp,
            rx_bps: rx.push(rx_value),
            tx_bps: tx.push(tx_value),
        })
        .collect::<Vec<_>>();
    debug_assert_eq!(samples.len(), BUCKETS);

    WindowedSummary {
        window: *window,
        samples,
        totals: TrafficTotals {
            rx_bytes: rx.bytes(window.interval),
            tx_bytes: tx.bytes(window.interval),
            avg_rx_bps: rx.average(),
            avg_tx_bps: tx.average(),
            peak_rx_bps: rx.peak_bps,
            peak_tx_bps: tx.peak_bps,
            rx_buckets: rx.buckets,
            tx_buckets: tx.buckets,
        },
    }
}
