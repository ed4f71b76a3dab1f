use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Order, OrderStatus};

/// Inclusive range of creation dates considered by the daily breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl StatsRange {
    /// The `days` days up to and including today.
    pub fn last_days(now: DateTime<Utc>, days: i64) -> Self {
        let to = now.date_naive();
        Self { from: to - Duration::days(days), to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub count: usize,
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStats {
    pub daily: Vec<DailyStat>,
    pub status_breakdown: BTreeMap<OrderStatus, usize>,
    pub total_orders: usize,
    pub revenue_today: Decimal,
}

pub fn compute_stats(orders: &[Order], range: &StatsRange, now: DateTime<Utc>) -> OrderStats {
    let today = now.date_naive();
    let mut daily: BTreeMap<NaiveDate, (usize, Decimal)> = BTreeMap::new();
    let mut status_breakdown = BTreeMap::new();
    let mut revenue_today = Decimal::ZERO;

    for order in orders {
        let created = order.created_at.date_naive();
        if range.contains(created) {
            let day = daily.entry(created).or_insert((0, Decimal::ZERO));
            day.0 += 1;
            day.1 += order.total_amount;
        }
        *status_breakdown.entry(order.status).or_insert(0) += 1;
        if created == today && order.status == OrderStatus::Completed {
            revenue_today += order.total_amount;
        }
    }

    let daily = daily
        .into_iter()
        .map(|(date, (count, total_revenue))| DailyStat {
            date,
            count,
            total_revenue,
            avg_order_value: (total_revenue / Decimal::from(count)).round_dp(2),
        })
        .collect();

    OrderStats {
        daily,
        status_breakdown,
        total_orders: orders.len(),
        revenue_today,
    }
}
